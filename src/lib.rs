//! svgreel renders animated SVG templates into video files.
//!
//! A template is an SVG document with `$placeholder` tokens and elements addressed by `id`. A
//! [`FrameSequence`] describes, frame by frame, which properties of which elements change. The
//! [`Renderer`] instantiates the template, rasterizes every frame through a [`Rasterizer`] and
//! hands the numbered images to an [`Encoder`]. A [`WorkerPool`] runs many such tasks in parallel,
//! one private asset workspace per worker.
#![forbid(unsafe_code)]

pub mod animation;
pub mod encode;
pub mod foundation;
pub mod pool;
pub mod project;
pub mod raster;
pub mod render;
pub mod schedule;
pub mod template;

pub use crate::animation::ease::Ease;
pub use crate::animation::sequence::{Frame, FrameSequence, Mutation, MutationKind, Parameters};
pub use crate::animation::storyboard::{Curve, Phase, Storyboard, Track};
pub use crate::encode::ffmpeg::{EncodeProfile, FfmpegEncoder};
pub use crate::encode::{EncodeFailure, EncodeJob, Encoder};
pub use crate::foundation::core::{Fps, FrameIndex};
pub use crate::foundation::error::{FailurePolicy, ReelError, ReelResult, Severity};
pub use crate::pool::{PoolOpts, RunSummary, WorkerPool};
pub use crate::project::{Project, ProjectConfig};
pub use crate::raster::{
    CommandRasterizer, RasterFailure, Rasterizer, RasterizerConfig, ResvgRasterizer,
};
pub use crate::render::abort::AbortSignal;
pub use crate::render::engine::{Renderer, TaskReport};
pub use crate::render::task::RenderTask;
pub use crate::schedule::{Event, ScheduleSource, TitleMap};
pub use crate::template::document::SvgDocument;

#[cfg(test)]
#[path = "../tests/unit/support.rs"]
pub(crate) mod test_support;
