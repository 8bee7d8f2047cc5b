use std::path::Path;
use std::process::{Command, Stdio};

use crate::encode::{EncodeFailure, EncodeJob, Encoder};
use crate::foundation::error::ReelResult;

/// Output container/codec preset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodeProfile {
    /// Lossless PAL DV, 16:9 (`-target pal-dv`).
    #[default]
    PalDv,
    /// H.264 + yuv420p MP4.
    Mp4,
}

/// Encoder that invokes the system `ffmpeg` binary on the frame image sequence.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FfmpegEncoder {
    pub program: String,
    pub profile: EncodeProfile,
    /// Mux a silent 48 kHz stereo track alongside the video.
    pub silent_audio: bool,
}

impl Default for FfmpegEncoder {
    fn default() -> Self {
        Self {
            program: "ffmpeg".to_string(),
            profile: EncodeProfile::PalDv,
            silent_audio: true,
        }
    }
}

impl FfmpegEncoder {
    pub fn new(profile: EncodeProfile) -> Self {
        Self {
            profile,
            ..Self::default()
        }
    }

    fn build_args(&self, job: &EncodeJob<'_>) -> Vec<String> {
        let mut args: Vec<String> = ["-y", "-nostdin", "-loglevel", "error"]
            .into_iter()
            .map(str::to_string)
            .collect();

        if self.silent_audio {
            args.extend(
                ["-f", "lavfi", "-i", "anullsrc=r=48000:cl=stereo"]
                    .into_iter()
                    .map(str::to_string),
            );
        }

        args.push("-framerate".to_string());
        args.push(job.fps.ffmpeg_rate());
        args.extend(["-f", "image2", "-i"].into_iter().map(str::to_string));
        args.push(job.frames_dir.join("%04d.png").to_string_lossy().into_owned());

        match self.profile {
            EncodeProfile::PalDv => {
                args.extend(
                    ["-target", "pal-dv", "-aspect", "16:9"]
                        .into_iter()
                        .map(str::to_string),
                );
            }
            EncodeProfile::Mp4 => {
                args.extend(
                    [
                        "-c:v",
                        "libx264",
                        "-pix_fmt",
                        "yuv420p",
                        "-movflags",
                        "+faststart",
                    ]
                    .into_iter()
                    .map(str::to_string),
                );
                if self.silent_audio {
                    args.extend(["-c:a", "aac"].into_iter().map(str::to_string));
                }
            }
        }

        if self.silent_audio {
            args.push("-shortest".to_string());
        }
        args.push(job.out_path.to_string_lossy().into_owned());
        args
    }
}

impl Encoder for FfmpegEncoder {
    fn name(&self) -> &str {
        &self.program
    }

    fn encode(&self, job: &EncodeJob<'_>) -> Result<(), EncodeFailure> {
        if job.frame_count == 0 {
            return Err(EncodeFailure("no frames to encode".to_string()));
        }

        let output = Command::new(&self.program)
            .args(self.build_args(job))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                EncodeFailure(format!(
                    "failed to spawn {} (is it installed and on PATH?): {e}",
                    self.program
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(EncodeFailure(format!(
                "{} exited with status {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}

pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

pub fn ensure_parent_dir(path: &Path) -> ReelResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
