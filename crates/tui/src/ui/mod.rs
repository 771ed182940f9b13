//! Terminal rendering of metadata-driven forms.

pub mod components;
pub mod runtime;
pub mod theme;
