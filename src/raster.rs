//! SVG → PNG rasterizers.
//!
//! The render engine only needs "turn this document file into that image file, or tell me what
//! went wrong". [`ResvgRasterizer`] does it in-process; [`CommandRasterizer`] shells out to an
//! external tool such as Inkscape and treats any error output as a failure.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;

use crate::foundation::core::FrameIndex;

/// Error output of a failed rasterization.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct RasterFailure(pub String);

/// Converts one serialized document into one raster image.
pub trait Rasterizer: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Render `svg_path` into a PNG at `png_path`.
    fn rasterize(&self, svg_path: &Path, png_path: &Path) -> Result<(), RasterFailure>;
}

/// In-process rasterizer backed by `usvg` + `resvg`.
pub struct ResvgRasterizer {
    fontdb: Arc<usvg::fontdb::Database>,
}

impl ResvgRasterizer {
    /// Create a rasterizer with the system fonts loaded.
    pub fn new() -> Self {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        Self::with_fontdb(Arc::new(db))
    }

    pub fn with_fontdb(fontdb: Arc<usvg::fontdb::Database>) -> Self {
        Self { fontdb }
    }
}

impl Default for ResvgRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Rasterizer for ResvgRasterizer {
    fn name(&self) -> &str {
        "resvg"
    }

    fn rasterize(&self, svg_path: &Path, png_path: &Path) -> Result<(), RasterFailure> {
        let data = std::fs::read(svg_path).map_err(|e| {
            RasterFailure(format!("failed to read '{}': {e}", svg_path.display()))
        })?;

        let mut opts = usvg::Options {
            resources_dir: svg_path.parent().map(Path::to_path_buf),
            ..usvg::Options::default()
        };
        opts.fontdb = self.fontdb.clone();

        let tree = usvg::Tree::from_data(&data, &opts)
            .map_err(|e| RasterFailure(format!("failed to parse svg: {e}")))?;

        let (width, height) = raster_size(&tree)?;
        let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
            .ok_or_else(|| RasterFailure("failed to allocate svg pixmap".to_string()))?;
        resvg::render(
            &tree,
            resvg::tiny_skia::Transform::default(),
            &mut pixmap.as_mut(),
        );

        let mut rgba = Vec::with_capacity(pixmap.data().len());
        for px in pixmap.pixels() {
            let c = px.demultiply();
            rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }

        image::save_buffer_with_format(
            png_path,
            &rgba,
            width,
            height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .map_err(|e| RasterFailure(format!("failed to write '{}': {e}", png_path.display())))
    }
}

fn raster_size(tree: &usvg::Tree) -> Result<(u32, u32), RasterFailure> {
    fn to_px(v: f32) -> Result<u32, RasterFailure> {
        if !v.is_finite() || v <= 0.0 {
            return Err(RasterFailure("svg has invalid width/height".to_string()));
        }
        Ok((v.ceil() as u32).max(1))
    }

    const MAX_DIM: u32 = 16_384;
    let w = to_px(tree.size().width())?;
    let h = to_px(tree.size().height())?;
    if w > MAX_DIM || h > MAX_DIM {
        return Err(RasterFailure(format!(
            "svg raster size too large: {w}x{h} (max {MAX_DIM}x{MAX_DIM})"
        )));
    }
    Ok((w, h))
}

/// External rasterizer command.
///
/// `{input}` and `{output}` in `args` are replaced with the document and image paths. The command
/// runs inside the document's directory. Any output on stderr counts as a failure, as does a
/// non-zero exit status.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CommandRasterizer {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandRasterizer {
    /// Inkscape 1.x command line.
    pub fn inkscape() -> Self {
        Self {
            program: "inkscape".to_string(),
            args: vec![
                "--export-type=png".to_string(),
                "--export-filename={output}".to_string(),
                "{input}".to_string(),
            ],
        }
    }

    fn expand_args(&self, svg_path: &Path, png_path: &Path) -> Vec<String> {
        let input = svg_path.to_string_lossy();
        let output = png_path.to_string_lossy();
        self.args
            .iter()
            .map(|a| a.replace("{input}", &input).replace("{output}", &output))
            .collect()
    }
}

impl Rasterizer for CommandRasterizer {
    fn name(&self) -> &str {
        &self.program
    }

    fn rasterize(&self, svg_path: &Path, png_path: &Path) -> Result<(), RasterFailure> {
        // The command runs inside the document's directory, so relative paths would resolve twice.
        let svg_path = &absolute(svg_path)?;
        let png_path = &absolute(png_path)?;

        let mut cmd = Command::new(&self.program);
        cmd.args(self.expand_args(svg_path, png_path))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        if let Some(dir) = svg_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            cmd.current_dir(dir);
        }

        let output = cmd.output().map_err(|e| {
            RasterFailure(format!(
                "failed to spawn '{}' (is it installed and on PATH?): {e}",
                self.program
            ))
        })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();
        if !stderr.is_empty() {
            return Err(RasterFailure(stderr.to_string()));
        }
        if !output.status.success() {
            return Err(RasterFailure(format!(
                "'{}' exited with status {}",
                self.program, output.status
            )));
        }
        Ok(())
    }
}

fn absolute(path: &Path) -> Result<PathBuf, RasterFailure> {
    std::path::absolute(path)
        .map_err(|e| RasterFailure(format!("failed to resolve '{}': {e}", path.display())))
}

/// Rasterizer selection as written in a project file.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RasterizerConfig {
    #[default]
    Resvg,
    Inkscape,
    Command(CommandRasterizer),
}

impl RasterizerConfig {
    pub fn build(&self) -> Arc<dyn Rasterizer> {
        match self {
            Self::Resvg => Arc::new(ResvgRasterizer::new()),
            Self::Inkscape => Arc::new(CommandRasterizer::inkscape()),
            Self::Command(c) => Arc::new(c.clone()),
        }
    }
}

/// Path of the raster image for `frame` inside `frames_dir`.
pub fn frame_image_path(frames_dir: &Path, frame: FrameIndex) -> PathBuf {
    frames_dir.join(frame.image_name("png"))
}

#[cfg(test)]
#[path = "../tests/unit/raster/raster.rs"]
mod tests;
