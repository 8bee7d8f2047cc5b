//! Image-sequence encoders.

use std::path::Path;

use crate::foundation::core::Fps;

pub mod ffmpeg;

/// Error output of a failed encode.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct EncodeFailure(pub String);

/// Input description for one encode: numbered images `0000.png`, `0001.png`, ... in `frames_dir`.
#[derive(Clone, Copy, Debug)]
pub struct EncodeJob<'a> {
    pub frames_dir: &'a Path,
    pub frame_count: u64,
    pub fps: Fps,
    pub out_path: &'a Path,
}

/// Turns an ordered directory of frame images into one video file.
pub trait Encoder: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    fn encode(&self, job: &EncodeJob<'_>) -> Result<(), EncodeFailure>;
}
