//! Frame sequences: easing curves, per-frame mutations, and phase storyboards.

/// Easing curves and phase interpolation.
pub mod ease;
/// Mutations, frames and the restartable [`sequence::FrameSequence`] trait.
pub mod sequence;
/// Phase-based sequences loaded from project files.
pub mod storyboard;
