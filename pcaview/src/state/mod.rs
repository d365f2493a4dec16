//! UI-independent application state.

pub mod artifact;
pub mod color_groups;
pub mod payload;
