//! Project directories and their configuration.
//!
//! A project is a directory holding `project.json`, an `artwork/` tree with the templates and
//! everything they reference, and (for offline runs) a local `schedule.xml`. Rendered videos are
//! written into the project directory itself.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;

use crate::animation::sequence::Parameters;
use crate::animation::storyboard::{Phase, Storyboard};
use crate::encode::ffmpeg::FfmpegEncoder;
use crate::foundation::core::Fps;
use crate::foundation::error::{FailurePolicy, ReelError, ReelResult};
use crate::pool::PoolOpts;
use crate::raster::RasterizerConfig;
use crate::render::engine::Renderer;
use crate::render::task::RenderTask;
use crate::schedule::{Event, ScheduleSource, TitleMap};

pub const CONFIG_FILE: &str = "project.json";
pub const ARTWORK_DIR: &str = "artwork";
pub const OFFLINE_SCHEDULE: &str = "schedule.xml";

/// Token in an intro output pattern replaced with the event id.
const ID_TOKEN: &str = "{id}";

/// One animated template.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct JobConfig {
    /// Template path relative to the artwork directory.
    pub template: PathBuf,
    /// Output file name relative to the project directory. Intro outputs must contain `{id}`.
    pub output: String,
    pub phases: Vec<Phase>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    pub output: PathBuf,
    pub parameters: Parameters,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from("intro.dv"),
            parameters: Parameters::new(),
        }
    }
}

/// Contents of `project.json`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub schedule_url: Option<String>,
    #[serde(default)]
    pub fps: Fps,
    /// Replacement titles keyed by event id.
    #[serde(default)]
    pub title_map: TitleMap,
    pub intro: JobConfig,
    #[serde(default)]
    pub outro: Option<JobConfig>,
    #[serde(default)]
    pub preview: PreviewConfig,
    #[serde(default)]
    pub rasterizer: RasterizerConfig,
    #[serde(default)]
    pub encoder: FfmpegEncoder,
    #[serde(flatten)]
    pub failures: FailurePolicy,
}

impl ProjectConfig {
    pub fn from_json_str(s: &str) -> ReelResult<Self> {
        serde_json::from_str(s).map_err(|e| ReelError::config(format!("invalid {CONFIG_FILE}: {e}")))
    }

    /// Check everything that does not need the filesystem.
    pub fn validate(&self) -> ReelResult<()> {
        Fps::new(self.fps.num, self.fps.den)?;

        validate_job("intro", &self.intro)?;
        if !self.intro.output.contains(ID_TOKEN) {
            return Err(ReelError::config(format!(
                "intro output '{}' must contain {ID_TOKEN} so every event gets its own file",
                self.intro.output
            )));
        }

        if let Some(outro) = &self.outro {
            validate_job("outro", outro)?;
            if outro.output.contains(ID_TOKEN) {
                return Err(ReelError::config(format!(
                    "outro output '{}' must not contain {ID_TOKEN}",
                    outro.output
                )));
            }
        }

        if let Some(url) = &self.schedule_url
            && !(url.starts_with("http://") || url.starts_with("https://"))
        {
            return Err(ReelError::config(format!(
                "schedule_url '{url}' is not an http(s) url"
            )));
        }
        Ok(())
    }
}

fn validate_job(name: &str, job: &JobConfig) -> ReelResult<()> {
    if job.template.as_os_str().is_empty() || job.template.is_absolute() {
        return Err(ReelError::config(format!(
            "{name} template must be a path relative to the artwork directory"
        )));
    }
    if job.output.trim().is_empty() {
        return Err(ReelError::config(format!("{name} output must be non-empty")));
    }
    if job.phases.is_empty() {
        return Err(ReelError::config(format!("{name} has no phases")));
    }
    Ok(())
}

/// An opened, validated project.
#[derive(Debug)]
pub struct Project {
    dir: PathBuf,
    config: ProjectConfig,
    intro: Arc<Storyboard>,
    outro: Option<Arc<Storyboard>>,
}

impl Project {
    /// Load `<dir>/project.json` and check that the artwork it names exists.
    pub fn open(dir: impl AsRef<Path>) -> ReelResult<Self> {
        let dir = std::path::absolute(dir.as_ref())
            .with_context(|| format!("failed to resolve '{}'", dir.as_ref().display()))?;
        let path = dir.join(CONFIG_FILE);
        let text = std::fs::read_to_string(&path).map_err(|e| {
            ReelError::config(format!("failed to read '{}': {e}", path.display()))
        })?;
        let config = ProjectConfig::from_json_str(&text)?;
        Self::from_config(dir, config)
    }

    pub fn from_config(dir: impl Into<PathBuf>, config: ProjectConfig) -> ReelResult<Self> {
        config.validate()?;
        let dir = dir.into();

        let artwork = dir.join(ARTWORK_DIR);
        if !artwork.is_dir() {
            return Err(ReelError::config(format!(
                "project has no artwork directory at '{}'",
                artwork.display()
            )));
        }
        for job in std::iter::once(&config.intro).chain(config.outro.as_ref()) {
            let template = artwork.join(&job.template);
            if !template.is_file() {
                return Err(ReelError::config(format!(
                    "template '{}' does not exist",
                    template.display()
                )));
            }
        }

        let intro = Arc::new(Storyboard::new(config.fps, config.intro.phases.clone())?);
        let outro = match &config.outro {
            Some(job) => Some(Arc::new(Storyboard::new(config.fps, job.phases.clone())?)),
            None => None,
        };
        Ok(Self {
            dir,
            config,
            intro,
            outro,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    /// Shared template assets, copied into every worker's workspace.
    pub fn assets_dir(&self) -> PathBuf {
        self.dir.join(ARTWORK_DIR)
    }

    /// Directory receiving every rendered file.
    pub fn outdir(&self) -> &Path {
        &self.dir
    }

    pub fn intro(&self) -> &Arc<Storyboard> {
        &self.intro
    }

    /// Where to read the schedule from. An explicit file wins; `offline` picks the project's
    /// local copy; otherwise the configured URL is fetched.
    pub fn schedule_source(
        &self,
        offline: bool,
        file: Option<&Path>,
    ) -> ReelResult<ScheduleSource> {
        if let Some(f) = file {
            return Ok(ScheduleSource::File(f.to_path_buf()));
        }
        if offline {
            return Ok(ScheduleSource::File(self.dir.join(OFFLINE_SCHEDULE)));
        }
        match &self.config.schedule_url {
            Some(url) => Ok(ScheduleSource::Url(url.clone())),
            None => Err(ReelError::config(
                "project has no schedule_url; use --offline or --schedule",
            )),
        }
    }

    pub fn title_map(&self) -> &TitleMap {
        &self.config.title_map
    }

    /// One intro task per event.
    pub fn intro_tasks(&self, events: &[Event]) -> Vec<RenderTask> {
        events
            .iter()
            .map(|event| {
                let output = self
                    .config
                    .intro
                    .output
                    .replace(ID_TOKEN, &event.id.to_string());
                RenderTask::new(&self.config.intro.template, output, self.intro.clone())
                    .with_label(event.id.to_string())
                    .with_parameters(event.parameters())
            })
            .collect()
    }

    /// The parameterless outro task, if the project has one.
    pub fn outro_task(&self) -> Option<RenderTask> {
        let job = self.config.outro.as_ref()?;
        let board = self.outro.clone()?;
        Some(RenderTask::new(&job.template, &job.output, board).with_label("outro"))
    }

    /// Every task of a full run: the intros followed by the outro.
    pub fn tasks(&self, events: &[Event]) -> ReelResult<Vec<RenderTask>> {
        let mut tasks = self.intro_tasks(events);
        tasks.extend(self.outro_task());

        let mut outputs = std::collections::BTreeSet::new();
        for t in &tasks {
            if !outputs.insert(t.output.clone()) {
                return Err(ReelError::config(format!(
                    "two tasks would write '{}'",
                    t.output.display()
                )));
            }
        }
        Ok(tasks)
    }

    /// Intro rendered once with the preview parameters, in place in the artwork directory.
    pub fn preview_task(&self) -> RenderTask {
        RenderTask::new(
            &self.config.intro.template,
            self.dir.join(&self.config.preview.output),
            self.intro.clone(),
        )
        .with_label("preview")
        .with_parameters(self.config.preview.parameters.clone())
        .with_workdir(self.assets_dir())
    }

    pub fn renderer(&self) -> Renderer {
        Renderer::new(
            self.config.rasterizer.build(),
            Arc::new(self.config.encoder.clone()),
            self.config.fps,
        )
    }

    pub fn pool_opts(&self, workers: Option<usize>) -> PoolOpts {
        let defaults = PoolOpts::default();
        PoolOpts {
            workers: workers.unwrap_or(defaults.workers),
            policy: self.config.failures,
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/project/project.rs"]
mod tests;
