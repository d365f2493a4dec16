mod artifacts;
mod dataset;
mod grouping;
mod table_view;

pub use artifacts::{ArtifactKind, Artifacts};
pub use dataset::Dataset;
pub use grouping::GroupPanel;
