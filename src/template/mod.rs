//! Template instantiation: placeholder substitution, inline styles, and the mutable document tree.

pub mod document;
pub mod style;
pub mod substitute;
