use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_channel::{Receiver, Sender};

use crate::render::task::RenderTask;

/// Element of the shared work queue.
#[derive(Debug)]
pub enum QueueItem {
    Task(Box<RenderTask>),
    /// No more work for the worker that receives it.
    Stop,
}

/// Multi-producer, multi-consumer task queue with blocking pop.
#[derive(Clone)]
pub struct TaskQueue {
    tx: Sender<QueueItem>,
    rx: Receiver<QueueItem>,
    pending: Arc<AtomicUsize>,
}

impl TaskQueue {
    pub fn new() -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self {
            tx,
            rx,
            pending: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn push(&self, task: RenderTask) {
        self.pending.fetch_add(1, Ordering::SeqCst);
        // The queue owns a receiver, so the channel cannot be disconnected here.
        let _ = self.tx.send(QueueItem::Task(Box::new(task)));
    }

    pub fn push_stop(&self) {
        let _ = self.tx.send(QueueItem::Stop);
    }

    /// Append one stop item per worker.
    pub fn seal(&self, workers: usize) {
        for _ in 0..workers {
            self.push_stop();
        }
    }

    /// Block until an item is available.
    pub fn pop(&self) -> QueueItem {
        match self.rx.recv() {
            Ok(item) => {
                if matches!(item, QueueItem::Task(_)) {
                    self.pending.fetch_sub(1, Ordering::SeqCst);
                }
                item
            }
            Err(_) => QueueItem::Stop,
        }
    }

    /// Tasks pushed but not yet taken by a worker.
    pub fn pending_tasks(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Items of either kind still queued.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pool/queue.rs"]
mod tests;
