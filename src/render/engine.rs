use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;

use crate::encode::ffmpeg::ensure_parent_dir;
use crate::encode::{EncodeJob, Encoder};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{ReelError, ReelResult};
use crate::raster::{Rasterizer, frame_image_path};
use crate::render::abort::AbortSignal;
use crate::render::task::RenderTask;
use crate::template::document::SvgDocument;
use crate::template::substitute::substitute_placeholders;

/// Outcome of a successfully rendered task.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskReport {
    pub frames: u64,
    pub output: PathBuf,
}

/// Executes [`RenderTask`]s: instantiate the template, rasterize every frame, encode the result.
#[derive(Clone)]
pub struct Renderer {
    rasterizer: Arc<dyn Rasterizer>,
    encoder: Arc<dyn Encoder>,
    fps: Fps,
}

impl Renderer {
    pub fn new(rasterizer: Arc<dyn Rasterizer>, encoder: Arc<dyn Encoder>, fps: Fps) -> Self {
        Self {
            rasterizer,
            encoder,
            fps,
        }
    }

    pub fn fps(&self) -> Fps {
        self.fps
    }

    /// Render `task` end to end.
    ///
    /// Frames are rasterized strictly in order through a single scratch file. The first
    /// rasterizer failure stops the task before the encoder runs. The frame directory and the
    /// scratch file are removed on every exit path.
    #[tracing::instrument(skip(self, task, abort), fields(task = %task.label))]
    pub fn render_task(&self, task: &RenderTask, abort: &AbortSignal) -> ReelResult<TaskReport> {
        let frames_dir = task.frames_dir();
        let scratch = task.scratch_path();
        let _cleanup = FrameScratch {
            frames_dir: &frames_dir,
            scratch: &scratch,
        };
        prepare_frames_dir(&frames_dir)?;

        let template_path = task.template_path();
        let text = std::fs::read_to_string(&template_path)
            .with_context(|| format!("failed to read template '{}'", template_path.display()))?;
        let text = substitute_placeholders(&text, &task.parameters);
        let mut doc = SvgDocument::parse(&text, &template_path)?;

        let mut count = 0u64;
        for frame in task.sequence.frames(&task.parameters) {
            if abort.is_raised() {
                return Err(ReelError::Aborted);
            }
            let idx = FrameIndex(count);
            tracing::debug!(frame = idx.0, mutations = %frame, "rendering frame");

            doc.apply_frame(&frame);
            std::fs::write(&scratch, doc.to_xml_string())
                .with_context(|| format!("failed to write '{}'", scratch.display()))?;

            self.rasterizer
                .rasterize(&scratch, &frame_image_path(&frames_dir, idx))
                .map_err(|e| ReelError::raster(task.label.as_str(), idx.0, e.0))?;
            count += 1;
        }

        let output = task.output_path();
        remove_if_exists(&output)?;
        ensure_parent_dir(&output)?;

        tracing::debug!(frames = count, encoder = self.encoder.name(), "encoding");
        self.encoder
            .encode(&EncodeJob {
                frames_dir: &frames_dir,
                frame_count: count,
                fps: self.fps,
                out_path: &output,
            })
            .map_err(|e| ReelError::encode(task.label.as_str(), e.0))?;

        Ok(TaskReport {
            frames: count,
            output,
        })
    }
}

/// Removes a task's frame directory and scratch document when dropped.
struct FrameScratch<'a> {
    frames_dir: &'a Path,
    scratch: &'a Path,
}

impl Drop for FrameScratch<'_> {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(self.frames_dir);
        let _ = std::fs::remove_file(self.scratch);
    }
}

fn prepare_frames_dir(dir: &Path) -> ReelResult<()> {
    // Frames left over from an interrupted run would be picked up by the encoder.
    if dir.exists() {
        std::fs::remove_dir_all(dir)
            .with_context(|| format!("failed to clear '{}'", dir.display()))?;
    }
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create frame directory '{}'", dir.display()))?;
    Ok(())
}

fn remove_if_exists(path: &Path) -> ReelResult<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(anyhow::Error::new(e)
            .context(format!("failed to remove '{}'", path.display()))
            .into()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/engine.rs"]
mod tests;
