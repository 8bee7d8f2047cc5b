use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::{ReelError, ReelResult};

/// A worker's private copy of the shared template assets.
///
/// The copy lives in a fresh temporary directory that is deleted when the workspace is dropped,
/// whichever way the worker exits.
#[derive(Debug)]
pub struct Workspace {
    dir: tempfile::TempDir,
    root: PathBuf,
}

impl Workspace {
    /// Copy the asset tree at `assets` into a new temporary directory.
    pub fn acquire(assets: &Path) -> ReelResult<Self> {
        if !assets.is_dir() {
            return Err(ReelError::config(format!(
                "asset directory '{}' does not exist",
                assets.display()
            )));
        }

        let dir = tempfile::Builder::new()
            .prefix("svgreel-")
            .tempdir()
            .context("failed to create worker temp dir")?;
        let name = assets
            .file_name()
            .unwrap_or_else(|| OsStr::new("artwork"));
        let root = dir.path().join(name);
        copy_tree(assets, &root)?;
        Ok(Self { dir, root })
    }

    /// Root of the private asset copy; tasks use it as their working directory.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Temporary directory containing the copy.
    #[cfg(test)]
    pub(crate) fn temp_dir(&self) -> &Path {
        self.dir.path()
    }

    /// Delete the workspace now, reporting failures instead of ignoring them.
    pub fn release(self) -> ReelResult<()> {
        let path = self.dir.path().to_path_buf();
        self.dir
            .close()
            .with_context(|| format!("failed to remove workspace '{}'", path.display()))?;
        Ok(())
    }
}

/// Recursively copy `src` into `dst`, skipping render scratch files.
pub(crate) fn copy_tree(src: &Path, dst: &Path) -> ReelResult<()> {
    std::fs::create_dir_all(dst)
        .with_context(|| format!("failed to create '{}'", dst.display()))?;

    let entries =
        std::fs::read_dir(src).with_context(|| format!("failed to read '{}'", src.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("failed to read '{}'", src.display()))?;
        let name = entry.file_name();
        if name == ".frames" || name == ".gen.svg" {
            continue;
        }

        let from = entry.path();
        let to = dst.join(&name);
        let meta = std::fs::metadata(&from)
            .with_context(|| format!("failed to stat '{}'", from.display()))?;
        if meta.is_dir() {
            copy_tree(&from, &to)?;
        } else {
            std::fs::copy(&from, &to).with_context(|| {
                format!("failed to copy '{}' to '{}'", from.display(), to.display())
            })?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/pool/workspace.rs"]
mod tests;
