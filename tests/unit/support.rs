//! Fakes shared by unit tests that drive the render engine without external tools.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::animation::ease::Ease;
use crate::animation::storyboard::{Phase, Storyboard};
use crate::encode::{EncodeFailure, EncodeJob, Encoder};
use crate::foundation::core::Fps;
use crate::raster::{RasterFailure, Rasterizer};
use crate::render::engine::Renderer;

pub const TEMPLATE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="16" height="9">
  <text id="title">$title</text>
  <rect id="x" width="16" height="9"/>
</svg>
"#;

/// Writes a placeholder image per frame, failing at `fail_at` if set.
#[derive(Default)]
pub struct FakeRasterizer {
    pub fail_at: Option<u64>,
    pub calls: AtomicUsize,
    pub documents: Mutex<Vec<String>>,
    pub keep_documents: bool,
}

impl FakeRasterizer {
    pub fn failing_at(frame: u64) -> Self {
        Self {
            fail_at: Some(frame),
            ..Self::default()
        }
    }

    pub fn recording() -> Self {
        Self {
            keep_documents: true,
            ..Self::default()
        }
    }
}

impl Rasterizer for FakeRasterizer {
    fn name(&self) -> &str {
        "fake"
    }

    fn rasterize(&self, svg_path: &Path, png_path: &Path) -> Result<(), RasterFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let frame: u64 = png_path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| RasterFailure(format!("bad frame path {}", png_path.display())))?;
        if self.fail_at == Some(frame) {
            return Err(RasterFailure("error: unknown element".to_string()));
        }
        if self.keep_documents {
            let doc = std::fs::read_to_string(svg_path).map_err(|e| RasterFailure(e.to_string()))?;
            self.documents.lock().unwrap().push(doc);
        }
        std::fs::write(png_path, b"png").map_err(|e| RasterFailure(e.to_string()))
    }
}

/// Records every encode call and writes the frame count to the output file.
#[derive(Default)]
pub struct FakeEncoder {
    pub fail: bool,
    pub jobs: Mutex<Vec<(u64, PathBuf)>>,
}

impl FakeEncoder {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn job_count(&self) -> usize {
        self.jobs.lock().unwrap().len()
    }
}

impl Encoder for FakeEncoder {
    fn name(&self) -> &str {
        "fake"
    }

    fn encode(&self, job: &EncodeJob<'_>) -> Result<(), EncodeFailure> {
        let images = std::fs::read_dir(job.frames_dir)
            .map_err(|e| EncodeFailure(e.to_string()))?
            .count() as u64;
        self.jobs
            .lock()
            .unwrap()
            .push((images, job.out_path.to_path_buf()));
        if self.fail {
            return Err(EncodeFailure("muxer exploded".to_string()));
        }
        std::fs::write(job.out_path, job.frame_count.to_string())
            .map_err(|e| EncodeFailure(e.to_string()))
    }
}

/// `<tmp>/artwork/intro.svg` holding [`TEMPLATE`].
pub fn artwork() -> (tempfile::TempDir, PathBuf) {
    let tmp = tempfile::tempdir().unwrap();
    let art = tmp.path().join("artwork");
    std::fs::create_dir_all(&art).unwrap();
    std::fs::write(art.join("intro.svg"), TEMPLATE).unwrap();
    (tmp, art)
}

/// One second hidden, one second fading in, at 25 fps.
pub fn fade_in() -> Arc<Storyboard> {
    Arc::new(
        Storyboard::new(
            Fps::default(),
            vec![
                Phase::new(1.0).hold("x", "opacity", 0.0),
                Phase::new(1.0).ease("x", "opacity", Ease::OutCubic, 0.0, 1.0),
            ],
        )
        .unwrap(),
    )
}

pub fn renderer(r: &Arc<FakeRasterizer>, e: &Arc<FakeEncoder>) -> Renderer {
    Renderer::new(r.clone(), e.clone(), Fps::default())
}
