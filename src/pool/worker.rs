use std::path::Path;

use crate::foundation::error::{FailurePolicy, ReelError, ReelResult, Severity};
use crate::pool::progress::{ProgressEvent, ProgressSender};
use crate::pool::queue::{QueueItem, TaskQueue};
use crate::pool::workspace::Workspace;
use crate::render::abort::AbortSignal;
use crate::render::engine::Renderer;

/// Lifecycle of one worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkerState {
    Init,
    Running,
    /// Consumed its stop item and released its workspace.
    Drained,
    /// Left the loop because the run was aborted.
    Halted,
}

/// What one worker did before it exited.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorkerReport {
    pub worker: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub state: WorkerState,
}

/// Everything a worker borrows from the pool.
pub struct Worker<'a> {
    pub id: usize,
    pub queue: &'a TaskQueue,
    pub renderer: &'a Renderer,
    pub assets: &'a Path,
    pub outdir: &'a Path,
    pub policy: FailurePolicy,
    pub abort: &'a AbortSignal,
    pub progress: ProgressSender,
}

impl Worker<'_> {
    /// Run until a stop item is consumed or the run is aborted.
    ///
    /// A fatal task error raises the abort signal and is returned; task-local errors are reported
    /// and counted. The workspace is removed on every exit path.
    pub fn run(self) -> ReelResult<WorkerReport> {
        let mut report = WorkerReport {
            worker: self.id,
            succeeded: 0,
            failed: 0,
            state: WorkerState::Init,
        };

        let workspace = match Workspace::acquire(self.assets) {
            Ok(ws) => ws,
            Err(e) => {
                self.abort.raise();
                return Err(e);
            }
        };
        self.progress.send(ProgressEvent::WorkerUp {
            worker: self.id,
            workspace: workspace.path().to_path_buf(),
        });
        report.state = WorkerState::Running;

        while report.state == WorkerState::Running {
            if self.abort.is_raised() {
                report.state = WorkerState::Halted;
                break;
            }

            let task = match self.queue.pop() {
                QueueItem::Stop => {
                    report.state = WorkerState::Drained;
                    break;
                }
                QueueItem::Task(task) => task.rebase(workspace.path(), self.outdir),
            };

            self.progress.send(ProgressEvent::Started {
                worker: self.id,
                task: task.label.clone(),
                remaining: self.queue.pending_tasks(),
            });

            match self.renderer.render_task(&task, self.abort) {
                Ok(done) => {
                    report.succeeded += 1;
                    self.progress.send(ProgressEvent::Finished {
                        worker: self.id,
                        task: task.label.clone(),
                        frames: done.frames,
                    });
                }
                Err(ReelError::Aborted) => report.state = WorkerState::Halted,
                Err(e) => {
                    self.progress.send(ProgressEvent::Failed {
                        worker: self.id,
                        task: task.label.clone(),
                        error: e.to_string(),
                    });
                    match e.severity(&self.policy) {
                        Severity::Fatal => {
                            self.abort.raise();
                            return Err(e);
                        }
                        Severity::TaskLocal => report.failed += 1,
                    }
                }
            }
        }

        if let Err(e) = workspace.release() {
            tracing::warn!(worker = self.id, "{e}");
        }
        self.progress.send(ProgressEvent::WorkerDown {
            worker: self.id,
            completed: report.succeeded + report.failed,
        });
        Ok(report)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pool/worker.rs"]
mod tests;
