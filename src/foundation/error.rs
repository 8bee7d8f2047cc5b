use std::path::PathBuf;

/// Convenience result alias used across the crate.
pub type ReelResult<T> = Result<T, ReelError>;

/// Error type returned by every fallible svgreel operation.
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    /// Invalid configuration or caller input.
    #[error("config error: {0}")]
    Config(String),

    /// The instantiated template could not be parsed as a document.
    #[error("template error in '{path}': {msg}")]
    Template {
        /// Template file the error refers to.
        path: PathBuf,
        /// Parser message.
        msg: String,
    },

    /// The rasterizer reported an error for one frame.
    #[error("rasterizer failed for task '{task}' at frame {frame}: {stderr}")]
    Raster {
        /// Label of the task being rendered.
        task: String,
        /// Frame index that failed.
        frame: u64,
        /// Captured error output of the rasterizer.
        stderr: String,
    },

    /// The encoder failed to produce the output file.
    #[error("encoder failed for task '{task}': {msg}")]
    Encode {
        /// Label of the task being encoded.
        task: String,
        /// Encoder message including captured error output.
        msg: String,
    },

    /// The event schedule could not be fetched or parsed.
    #[error("schedule error: {0}")]
    Schedule(String),

    /// The run was aborted because another worker hit a fatal error.
    #[error("render aborted")]
    Aborted,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReelError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn template(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::Template {
            path: path.into(),
            msg: msg.into(),
        }
    }

    pub fn raster(task: impl Into<String>, frame: u64, stderr: impl Into<String>) -> Self {
        Self::Raster {
            task: task.into(),
            frame,
            stderr: stderr.into(),
        }
    }

    pub fn encode(task: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Encode {
            task: task.into(),
            msg: msg.into(),
        }
    }

    pub fn schedule(msg: impl Into<String>) -> Self {
        Self::Schedule(msg.into())
    }

    /// Classify this error under `policy`.
    ///
    /// Template errors always halt the run: a template that does not parse for one task is broken
    /// for every task. Filesystem and other unexpected errors stay local to the task.
    pub fn severity(&self, policy: &FailurePolicy) -> Severity {
        match self {
            Self::Template { .. } | Self::Config(_) | Self::Aborted => Severity::Fatal,
            Self::Raster { .. } => policy.rasterizer,
            Self::Encode { .. } => policy.encoder,
            Self::Schedule(_) | Self::Other(_) => Severity::TaskLocal,
        }
    }
}

/// How far a failure propagates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Stop every worker and fail the whole run.
    Fatal,
    /// Abandon the current task, report it, and keep going.
    TaskLocal,
}

/// Severity assigned to external tool failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FailurePolicy {
    /// Severity of a rasterizer failure (defaults to fatal).
    #[serde(rename = "on_rasterizer_failure")]
    pub rasterizer: Severity,
    /// Severity of an encoder failure (defaults to task-local).
    #[serde(rename = "on_encoder_failure")]
    pub encoder: Severity,
}

impl Default for FailurePolicy {
    fn default() -> Self {
        Self {
            rasterizer: Severity::Fatal,
            encoder: Severity::TaskLocal,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
