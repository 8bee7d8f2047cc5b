use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::animation::sequence::{FrameSequence, Parameters};

/// One template + parameter set rendered into one output file.
///
/// `template` is resolved against `workdir`; a relative `output` too. The frame scratch files
/// (`.gen.svg`, `.frames/`) live in `workdir`, so two tasks must never run concurrently in the
/// same directory.
#[derive(Clone)]
pub struct RenderTask {
    /// Diagnostic name (event id, output name).
    pub label: String,
    pub template: PathBuf,
    pub output: PathBuf,
    pub sequence: Arc<dyn FrameSequence>,
    pub parameters: Parameters,
    pub workdir: PathBuf,
}

impl RenderTask {
    pub fn new(
        template: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        sequence: Arc<dyn FrameSequence>,
    ) -> Self {
        let output = output.into();
        Self {
            label: output.display().to_string(),
            template: template.into(),
            output,
            sequence,
            parameters: Parameters::new(),
            workdir: PathBuf::from("."),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_parameter(mut self, token: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(token.into(), value.into());
        self
    }

    pub fn with_workdir(mut self, workdir: impl Into<PathBuf>) -> Self {
        self.workdir = workdir.into();
        self
    }

    /// Move this task onto a private workspace, writing its result into `outdir`.
    pub fn rebase(mut self, workspace: &Path, outdir: &Path) -> Self {
        self.template = workspace.join(&self.template);
        self.output = outdir.join(&self.output);
        self.workdir = workspace.to_path_buf();
        self
    }

    pub fn template_path(&self) -> PathBuf {
        self.workdir.join(&self.template)
    }

    pub fn output_path(&self) -> PathBuf {
        self.workdir.join(&self.output)
    }

    pub fn frames_dir(&self) -> PathBuf {
        self.workdir.join(".frames")
    }

    pub fn scratch_path(&self) -> PathBuf {
        self.workdir.join(".gen.svg")
    }
}

impl fmt::Debug for RenderTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderTask")
            .field("label", &self.label)
            .field("template", &self.template)
            .field("output", &self.output)
            .field("parameters", &self.parameters)
            .field("workdir", &self.workdir)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/task.rs"]
mod tests;
