use std::collections::BTreeMap;
use std::fmt;

/// Placeholder token (e.g. `$title`) to substitution value.
pub type Parameters = BTreeMap<String, String>;

/// How a [`Mutation`] changes its target element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    /// Upsert one property inside the element's inline `style` attribute.
    Style,
    /// Set a plain XML attribute verbatim.
    Attr,
}

/// One change to one property of every element carrying `element_id`, for one frame.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Mutation {
    pub element_id: String,
    pub kind: MutationKind,
    pub key: String,
    pub value: String,
}

impl Mutation {
    pub fn style(
        element_id: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            element_id: element_id.into(),
            kind: MutationKind::Style,
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn attr(
        element_id: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            element_id: element_id.into(),
            kind: MutationKind::Attr,
            key: key.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            MutationKind::Style => "style",
            MutationKind::Attr => "attr",
        };
        write!(
            f,
            "({}, {kind}, {}, {})",
            self.element_id, self.key, self.value
        )
    }
}

/// The set of mutations applied before rendering one output frame.
///
/// Mutations within a frame must not depend on each other's order; frames themselves are applied
/// strictly in sequence order and their effects accumulate on the document.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Frame {
    pub mutations: Vec<Mutation>,
}

impl Frame {
    pub fn new(mutations: Vec<Mutation>) -> Self {
        Self { mutations }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Mutation> {
        self.mutations.iter()
    }

    /// First mutation matching `element_id` and `key`.
    pub fn find(&self, element_id: &str, key: &str) -> Option<&Mutation> {
        self.mutations
            .iter()
            .find(|m| m.element_id == element_id && m.key == key)
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, m) in self.mutations.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{m}")?;
        }
        f.write_str("]")
    }
}

/// Restartable producer of frame descriptions.
///
/// Every call to [`FrameSequence::frames`] starts a fresh lazy iteration from frame 0. Calling it
/// twice with the same parameters must yield identical frames, which is what makes a render
/// reproducible.
pub trait FrameSequence: Send + Sync {
    fn frames<'a>(&'a self, params: &'a Parameters) -> Box<dyn Iterator<Item = Frame> + 'a>;

    /// Number of frames this sequence yields for `params`.
    fn frame_count(&self, params: &Parameters) -> u64 {
        self.frames(params).count() as u64
    }
}

impl<F, I> FrameSequence for F
where
    F: Fn(&Parameters) -> I + Send + Sync,
    I: IntoIterator<Item = Frame>,
    I::IntoIter: 'static,
{
    fn frames<'a>(&'a self, params: &'a Parameters) -> Box<dyn Iterator<Item = Frame> + 'a> {
        Box::new(self(params).into_iter())
    }
}

/// Format a numeric property value with the fixed precision used in every frame description.
pub fn format_value(v: f64) -> String {
    // Tiny negative values would otherwise print as "-0.0000".
    let rounded = (v * 10_000.0).round() / 10_000.0;
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{rounded:.4}")
}

#[cfg(test)]
#[path = "../../tests/unit/animation/sequence.rs"]
mod tests;
