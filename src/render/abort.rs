use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared "stop everything" flag raised when a fatal error occurs.
///
/// Render loops check it between frames and workers check it before taking the next task.
#[derive(Clone, Debug, Default)]
pub struct AbortSignal(Arc<AtomicBool>);

impl AbortSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/abort.rs"]
mod tests;
