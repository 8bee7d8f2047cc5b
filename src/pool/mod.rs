//! Fixed-size worker pool.
//!
//! Every worker owns a private copy of the template assets and pulls tasks from one shared queue
//! until it receives its stop item. The queue is seeded with exactly one stop item per worker, so
//! each worker drains exactly once. A fatal error in any worker raises a shared abort signal;
//! the others stop before their next frame and the first fatal error is returned from
//! [`WorkerPool::run`].

pub mod progress;
pub mod queue;
pub mod worker;
pub mod workspace;

use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::{FailurePolicy, ReelError, ReelResult};
use crate::pool::progress::ProgressLog;
use crate::pool::queue::TaskQueue;
use crate::pool::worker::{Worker, WorkerReport, WorkerState};
use crate::render::abort::AbortSignal;
use crate::render::engine::Renderer;
use crate::render::task::RenderTask;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolOpts {
    /// Number of worker threads; one per CPU core by default.
    pub workers: usize,
    pub policy: FailurePolicy,
}

impl Default for PoolOpts {
    fn default() -> Self {
        Self {
            workers: num_cpus::get().max(1),
            policy: FailurePolicy::default(),
        }
    }
}

/// Totals of a completed run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub workers: usize,
    /// Workers that consumed their stop item.
    pub drained: usize,
}

impl RunSummary {
    fn add(&mut self, report: &WorkerReport) {
        self.succeeded += report.succeeded;
        self.failed += report.failed;
        if report.state == WorkerState::Drained {
            self.drained += 1;
        }
    }
}

pub struct WorkerPool {
    renderer: Renderer,
    assets_dir: PathBuf,
    outdir: PathBuf,
    opts: PoolOpts,
}

impl WorkerPool {
    /// `assets_dir` is copied into each worker's workspace; outputs land in `outdir`.
    pub fn new(
        renderer: Renderer,
        assets_dir: impl Into<PathBuf>,
        outdir: impl Into<PathBuf>,
        opts: PoolOpts,
    ) -> ReelResult<Self> {
        if opts.workers == 0 {
            return Err(ReelError::config("worker count must be at least 1"));
        }
        Ok(Self {
            renderer,
            assets_dir: assets_dir.into(),
            outdir: outdir.into(),
            opts,
        })
    }

    pub fn workers(&self) -> usize {
        self.opts.workers
    }

    pub fn assets_dir(&self) -> &Path {
        &self.assets_dir
    }

    /// Render every task and wait for all workers to exit.
    pub fn run(&self, tasks: impl IntoIterator<Item = RenderTask>) -> ReelResult<RunSummary> {
        let outdir = std::path::absolute(&self.outdir)
            .with_context(|| format!("failed to resolve '{}'", self.outdir.display()))?;
        std::fs::create_dir_all(&outdir)
            .with_context(|| format!("failed to create '{}'", outdir.display()))?;

        let queue = TaskQueue::new();
        for task in tasks {
            queue.push(task);
        }
        let total = queue.pending_tasks();
        queue.seal(self.opts.workers);
        tracing::info!(
            tasks = total,
            workers = self.opts.workers,
            outdir = %outdir.display(),
            "starting render pool"
        );

        let abort = AbortSignal::new();
        let log = ProgressLog::start()?;

        let outcome = std::thread::scope(|scope| {
            let mut handles = Vec::with_capacity(self.opts.workers);
            let mut spawn_err = None;
            for id in 0..self.opts.workers {
                let worker = Worker {
                    id,
                    queue: &queue,
                    renderer: &self.renderer,
                    assets: &self.assets_dir,
                    outdir: &outdir,
                    policy: self.opts.policy,
                    abort: &abort,
                    progress: log.sender(),
                };
                let spawned = std::thread::Builder::new()
                    .name(format!("worker-{id}"))
                    .spawn_scoped(scope, move || worker.run());
                match spawned {
                    Ok(h) => handles.push(h),
                    Err(e) => {
                        abort.raise();
                        spawn_err = Some(ReelError::from(
                            anyhow::Error::new(e).context("failed to spawn worker thread"),
                        ));
                        break;
                    }
                }
            }

            let mut summary = RunSummary {
                workers: self.opts.workers,
                ..RunSummary::default()
            };
            let mut fatal = spawn_err;
            for (id, h) in handles.into_iter().enumerate() {
                let res = h
                    .join()
                    .unwrap_or_else(|_| Err(anyhow::anyhow!("worker {id} panicked").into()));
                match res {
                    Ok(report) => summary.add(&report),
                    Err(e) => {
                        abort.raise();
                        if fatal.is_none() {
                            fatal = Some(e);
                        }
                    }
                }
            }

            match fatal {
                Some(e) => Err(e),
                None => Ok(summary),
            }
        });

        log.finish();
        let summary = outcome?;
        tracing::info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            "render pool finished"
        );
        Ok(summary)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pool/pool.rs"]
mod tests;
