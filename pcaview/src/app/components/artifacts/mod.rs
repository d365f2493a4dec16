mod logic;
mod ui;

use std::fmt;

use table_io::Table;

use crate::{
    app::DynRequestSender,
    state::{
        artifact::{Artifact, PcaDim, PcaViews},
        payload::{PlotPayload, TopContributors},
    },
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArtifactKind {
    Scree,
    Pca(PcaDim),
    Loadings,
    Contributors,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 5] = [
        ArtifactKind::Scree,
        ArtifactKind::Pca(PcaDim::Two),
        ArtifactKind::Pca(PcaDim::Three),
        ArtifactKind::Loadings,
        ArtifactKind::Contributors,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ArtifactKind::Scree => "Scree Plot",
            ArtifactKind::Pca(PcaDim::Two) => "PCA",
            ArtifactKind::Pca(PcaDim::Three) => "PCA 3D",
            ArtifactKind::Loadings => "Loadings Table",
            ArtifactKind::Contributors => "Top Contributors",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Everything computed by the PCA service for the current dataset.
pub struct Artifacts {
    pub scree: Artifact<PlotPayload>,
    pub pca: PcaViews,
    pub loadings: Artifact<Table>,
    pub contributors: Artifact<TopContributors>,
    projection: Projection,
    last_error: Option<String>,
    request_tx: DynRequestSender,
}

/// Viewing angles of the 3D scatter plot, in radians.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    pub yaw: f64,
    pub pitch: f64,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            yaw: -0.6,
            pitch: 0.4,
        }
    }
}

impl Artifacts {
    pub fn new(request_tx: DynRequestSender) -> Self {
        Self {
            scree: Default::default(),
            pca: Default::default(),
            loadings: Default::default(),
            contributors: Default::default(),
            projection: Default::default(),
            last_error: None,
            request_tx,
        }
    }
}
