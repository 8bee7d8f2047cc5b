//! Serialized progress output for concurrent workers.
//!
//! Workers never log progress directly; they send [`ProgressEvent`]s through a bounded channel to a
//! single writer thread, so messages from different workers never interleave.

use std::path::PathBuf;
use std::thread::JoinHandle;

use anyhow::Context as _;
use crossbeam_channel::{Receiver, Sender};

use crate::foundation::error::ReelResult;

const CHANNEL_CAPACITY: usize = 64;

/// Something a worker wants to report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProgressEvent {
    WorkerUp {
        worker: usize,
        workspace: PathBuf,
    },
    Started {
        worker: usize,
        task: String,
        remaining: usize,
    },
    Finished {
        worker: usize,
        task: String,
        frames: u64,
    },
    Failed {
        worker: usize,
        task: String,
        error: String,
    },
    WorkerDown {
        worker: usize,
        completed: usize,
    },
}

impl ProgressEvent {
    fn emit(&self) {
        match self {
            Self::WorkerUp { worker, workspace } => {
                tracing::debug!(worker, workspace = %workspace.display(), "worker ready");
            }
            Self::Started {
                worker,
                task,
                remaining,
            } => {
                tracing::info!(worker, remaining, "rendering {task}");
            }
            Self::Finished {
                worker,
                task,
                frames,
            } => {
                tracing::info!(worker, frames, "finished {task}");
            }
            Self::Failed {
                worker,
                task,
                error,
            } => {
                tracing::warn!(worker, "task {task} failed: {error}");
            }
            Self::WorkerDown { worker, completed } => {
                tracing::debug!(worker, completed, "worker drained");
            }
        }
    }
}

/// Cloneable handle used by workers to report progress.
#[derive(Clone, Debug)]
pub struct ProgressSender {
    tx: Sender<ProgressEvent>,
}

impl ProgressSender {
    pub fn send(&self, event: ProgressEvent) {
        // A closed sink only loses log output.
        let _ = self.tx.send(event);
    }
}

/// Owner of the writer thread.
pub struct ProgressLog {
    tx: Sender<ProgressEvent>,
    writer: JoinHandle<Vec<ProgressEvent>>,
}

impl ProgressLog {
    /// Spawn the writer thread.
    pub fn start() -> ReelResult<Self> {
        Self::spawn(false)
    }

    /// Like [`ProgressLog::start`], but [`ProgressLog::finish`] also returns every event written.
    #[cfg(test)]
    pub(crate) fn recording() -> ReelResult<Self> {
        Self::spawn(true)
    }

    fn spawn(record: bool) -> ReelResult<Self> {
        let (tx, rx) = crossbeam_channel::bounded::<ProgressEvent>(CHANNEL_CAPACITY);
        let writer = std::thread::Builder::new()
            .name("svgreel-log".to_string())
            .spawn(move || write_events(rx, record))
            .context("failed to spawn progress writer thread")?;
        Ok(Self { tx, writer })
    }

    pub fn sender(&self) -> ProgressSender {
        ProgressSender {
            tx: self.tx.clone(),
        }
    }

    /// Close the sink and wait until every queued event has been written.
    ///
    /// Blocks until every [`ProgressSender`] has been dropped.
    ///
    /// Returns the written events when the log records them; otherwise the list is empty.
    pub fn finish(self) -> Vec<ProgressEvent> {
        let Self { tx, writer } = self;
        drop(tx);
        writer.join().unwrap_or_default()
    }
}

fn write_events(rx: Receiver<ProgressEvent>, record: bool) -> Vec<ProgressEvent> {
    let mut seen = Vec::new();
    for event in rx {
        event.emit();
        if record {
            seen.push(event);
        }
    }
    seen
}

#[cfg(test)]
#[path = "../../tests/unit/pool/progress.rs"]
mod tests;
