//! Phase-based frame sequences.
//!
//! A [`Storyboard`] is a list of fixed-length [`Phase`]s. Each phase tracks a set of element
//! properties; for every frame of the phase one [`Mutation`] per track is produced, with the
//! value computed by the track's [`Curve`]. Numeric values are formatted with four decimals so
//! the same storyboard always yields byte-identical frames.

use crate::animation::ease::Ease;
use crate::animation::sequence::{
    Frame, FrameSequence, Mutation, MutationKind, Parameters, format_value,
};
use crate::foundation::core::Fps;
use crate::foundation::error::{ReelError, ReelResult};

/// Value of one tracked property over the course of a phase.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "curve", rename_all = "snake_case")]
pub enum Curve {
    /// Constant numeric value.
    Hold { value: f64 },
    /// Eased transition from `from` to `to` across the phase.
    Ease { ease: Ease, from: f64, to: f64 },
    /// Constant verbatim string value.
    Set { value: String },
}

impl Curve {
    fn value_at(&self, elapsed: u64, frames: u64) -> String {
        match self {
            Self::Hold { value } => format_value(*value),
            Self::Ease { ease, from, to } => {
                format_value(ease.interpolate(elapsed, *from, to - from, frames))
            }
            Self::Set { value } => value.clone(),
        }
    }
}

/// One property of one element, driven by a curve.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Track {
    pub id: String,
    #[serde(default = "default_kind")]
    pub kind: MutationKind,
    pub key: String,
    #[serde(flatten)]
    pub curve: Curve,
}

fn default_kind() -> MutationKind {
    MutationKind::Style
}

impl Track {
    pub fn style(id: impl Into<String>, key: impl Into<String>, curve: Curve) -> Self {
        Self {
            id: id.into(),
            kind: MutationKind::Style,
            key: key.into(),
            curve,
        }
    }

    pub fn attr(id: impl Into<String>, key: impl Into<String>, curve: Curve) -> Self {
        Self {
            id: id.into(),
            kind: MutationKind::Attr,
            key: key.into(),
            curve,
        }
    }

    fn mutation_at(&self, elapsed: u64, frames: u64) -> Mutation {
        Mutation {
            element_id: self.id.clone(),
            kind: self.kind,
            key: self.key.clone(),
            value: self.curve.value_at(elapsed, frames),
        }
    }
}

/// A fixed-length section of a storyboard.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Phase {
    pub seconds: f64,
    #[serde(default)]
    pub tracks: Vec<Track>,
}

impl Phase {
    pub fn new(seconds: f64) -> Self {
        Self {
            seconds,
            tracks: Vec::new(),
        }
    }

    pub fn track(mut self, track: Track) -> Self {
        self.tracks.push(track);
        self
    }

    /// Hold a style property at `value` for the whole phase.
    pub fn hold(self, id: impl Into<String>, key: impl Into<String>, value: f64) -> Self {
        self.track(Track::style(id, key, Curve::Hold { value }))
    }

    /// Ease a style property from `from` to `to` across the phase.
    pub fn ease(
        self,
        id: impl Into<String>,
        key: impl Into<String>,
        ease: Ease,
        from: f64,
        to: f64,
    ) -> Self {
        self.track(Track::style(id, key, Curve::Ease { ease, from, to }))
    }
}

/// Ordered phases rendered at a fixed frame rate.
#[derive(Clone, Debug, PartialEq)]
pub struct Storyboard {
    fps: Fps,
    phases: Vec<Phase>,
}

impl Storyboard {
    pub fn new(fps: Fps, phases: Vec<Phase>) -> ReelResult<Self> {
        for (i, p) in phases.iter().enumerate() {
            if !p.seconds.is_finite() || p.seconds < 0.0 {
                return Err(ReelError::config(format!(
                    "storyboard phase {i} has invalid length {}s",
                    p.seconds
                )));
            }
        }
        Ok(Self { fps, phases })
    }

    pub fn fps(&self) -> Fps {
        self.fps
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    /// Frame count of each phase, in order.
    pub fn phase_frames(&self) -> Vec<u64> {
        self.phases
            .iter()
            .map(|p| self.fps.secs_to_frames_round(p.seconds))
            .collect()
    }

    /// Total number of frames across all phases.
    pub fn total_frames(&self) -> u64 {
        self.phase_frames().iter().sum()
    }

    /// Start a fresh lazy iteration over all frames.
    pub fn iter(&self) -> StoryboardFrames<'_> {
        StoryboardFrames {
            board: self,
            phase: 0,
            phase_len: self.phase_len(0),
            elapsed: 0,
        }
    }

    fn phase_len(&self, idx: usize) -> u64 {
        self.phases
            .get(idx)
            .map(|p| self.fps.secs_to_frames_round(p.seconds))
            .unwrap_or(0)
    }
}

impl FrameSequence for Storyboard {
    fn frames<'a>(&'a self, _params: &'a Parameters) -> Box<dyn Iterator<Item = Frame> + 'a> {
        Box::new(self.iter())
    }

    fn frame_count(&self, _params: &Parameters) -> u64 {
        self.total_frames()
    }
}

/// Lazy iterator over the frames of a [`Storyboard`].
pub struct StoryboardFrames<'a> {
    board: &'a Storyboard,
    phase: usize,
    phase_len: u64,
    elapsed: u64,
}

impl Iterator for StoryboardFrames<'_> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        while self.elapsed >= self.phase_len {
            if self.phase >= self.board.phases.len() {
                return None;
            }
            self.phase += 1;
            self.phase_len = self.board.phase_len(self.phase);
            self.elapsed = 0;
        }

        let phase = &self.board.phases[self.phase];
        let frame = Frame::new(
            phase
                .tracks
                .iter()
                .map(|t| t.mutation_at(self.elapsed, self.phase_len))
                .collect(),
        );
        self.elapsed += 1;
        Some(frame)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/storyboard.rs"]
mod tests;
