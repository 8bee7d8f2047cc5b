//! Rendering one task from template to video file.

/// Run-wide abort flag.
pub mod abort;
/// The per-task render pipeline.
pub mod engine;
/// Task descriptions.
pub mod task;
