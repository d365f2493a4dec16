use std::sync::Arc;

use app_core::{
    backend::{BackendEventLoop, BackendLink},
    string_error::ErrorStringExt,
    BACKEND_HUNG_UP_MSG,
};
use table_io::Table;

use super::{ArtifactKind, Projection};
use crate::{
    app::{components::Dataset, DynRequestSender},
    backend_state::{Gateway, GatewayError},
    state::{
        artifact::{Artifact, Completion, DataRevision, PcaDim, Toggle},
        color_groups::ColorGroups,
    },
    BackendAppState,
};

impl super::Artifacts {
    /// Shows or hides an artifact, fetching it if there is no payload for
    /// the current dataset yet.
    pub fn toggle(
        &mut self,
        kind: ArtifactKind,
        dataset: &Dataset,
        groups: &mut ColorGroups,
        default_color: &str,
    ) -> Toggle {
        let revision = dataset.revision();
        let action = match kind {
            ArtifactKind::Scree => self.scree.toggle(revision),
            ArtifactKind::Pca(dim) => self.pca.toggle(dim, revision),
            ArtifactKind::Loadings => self.loadings.toggle(revision),
            ArtifactKind::Contributors => self.contributors.toggle(revision),
        };
        match action {
            Toggle::Fetch => {
                if let (Some(revision), Some(data)) = (revision, dataset.current()) {
                    self.fetch(kind, revision, data.clone());
                }
            }
            Toggle::ShowCached => {
                if let ArtifactKind::Pca(dim) = kind {
                    if let Some(payload) = self.pca.get_mut(dim).payload_mut() {
                        groups.apply_to(payload, default_color);
                    }
                }
            }
            Toggle::NeedsData => log::warn!("no data loaded, cannot show {}", kind),
            Toggle::Hide | Toggle::Cancel => (),
        }
        action
    }

    fn fetch(&mut self, kind: ArtifactKind, revision: DataRevision, data: Arc<Table>) {
        let tx = &self.request_tx;
        match kind {
            ArtifactKind::Scree => request(&mut self.scree, revision, kind, data, tx, |g, t| {
                g.scree_plot(t)
            }),
            ArtifactKind::Pca(dim) => {
                request(self.pca.get_mut(dim), revision, kind, data, tx, move |g, t| {
                    g.pca(t, dim)
                })
            }
            ArtifactKind::Loadings => {
                request(&mut self.loadings, revision, kind, data, tx, |g, t| {
                    g.loadings_table(t)
                })
            }
            ArtifactKind::Contributors => {
                request(&mut self.contributors, revision, kind, data, tx, |g, t| {
                    g.top_contributors(t)
                })
            }
        }
    }

    /// Polls all pending requests. Returns true if anything changed.
    pub fn try_update(&mut self, groups: &mut ColorGroups) -> bool {
        let mut changed = false;
        changed |= self.record(ArtifactKind::Scree, |a| a.scree.poll());
        changed |= self.record(ArtifactKind::Loadings, |a| a.loadings.poll());
        changed |= self.record(ArtifactKind::Contributors, |a| a.contributors.poll());
        for dim in [PcaDim::Two, PcaDim::Three] {
            let Some(done) = self.pca.get_mut(dim).poll() else {
                continue;
            };
            changed = true;
            match done {
                // Fresh samples start out ungrouped.
                Completion::Stored => {
                    if let Some(payload) = self.pca.get(dim).payload() {
                        groups.reset_for_payload(payload);
                    }
                }
                Completion::Failed => self.note_failure(ArtifactKind::Pca(dim)),
                Completion::Stale => (),
            }
        }
        changed
    }

    pub fn is_loading(&self) -> bool {
        self.scree.is_loading()
            || self.pca.two_d.is_loading()
            || self.pca.three_d.is_loading()
            || self.loadings.is_loading()
            || self.contributors.is_loading()
    }

    pub fn is_visible(&self, kind: ArtifactKind) -> bool {
        match kind {
            ArtifactKind::Scree => self.scree.is_visible(),
            ArtifactKind::Pca(dim) => self.pca.get(dim).is_visible(),
            ArtifactKind::Loadings => self.loadings.is_visible(),
            ArtifactKind::Contributors => self.contributors.is_visible(),
        }
    }

    pub fn is_kind_loading(&self, kind: ArtifactKind) -> bool {
        match kind {
            ArtifactKind::Scree => self.scree.is_loading(),
            ArtifactKind::Pca(dim) => self.pca.get(dim).is_loading(),
            ArtifactKind::Loadings => self.loadings.is_loading(),
            ArtifactKind::Contributors => self.contributors.is_loading(),
        }
    }

    /// Most recent failure of any request.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn record<F>(&mut self, kind: ArtifactKind, poll: F) -> bool
    where
        F: FnOnce(&mut Self) -> Option<Completion>,
    {
        match poll(self) {
            Some(Completion::Failed) => {
                self.note_failure(kind);
                true
            }
            Some(_) => true,
            None => false,
        }
    }

    fn note_failure(&mut self, kind: ArtifactKind) {
        let err = match kind {
            ArtifactKind::Scree => self.scree.last_error(),
            ArtifactKind::Pca(dim) => self.pca.get(dim).last_error(),
            ArtifactKind::Loadings => self.loadings.last_error(),
            ArtifactKind::Contributors => self.contributors.last_error(),
        };
        self.last_error = err.map(str::to_owned);
    }
}

/// Issues a request for `artifact` that runs `call` against the gateway on
/// the backend thread.
fn request<T, F>(
    artifact: &mut Artifact<T>,
    revision: DataRevision,
    kind: ArtifactKind,
    data: Arc<Table>,
    request_tx: &DynRequestSender,
    call: F,
) where
    T: Send + 'static,
    F: Fn(&Gateway, &Table) -> Result<T, GatewayError> + Send + 'static,
{
    let seq = artifact.begin_fetch(revision);
    log::debug!("requesting {} (request {})", kind, seq.get());
    let description = format!("compute {kind}");
    let msg = format!("unable to compute {kind}");
    let (rx, linker) = BackendLink::new(
        &description,
        move |b: &mut BackendEventLoop<BackendAppState>| {
            call(b.state.gateway(), data.as_ref()).err_to_string(&msg)
        },
    );
    request_tx.send(Box::new(linker)).expect(BACKEND_HUNG_UP_MSG);
    artifact.await_answer(seq, rx);
}

impl Projection {
    /// Maps a point onto the screen plane: `yaw` turns around the vertical
    /// z axis, `pitch` tilts the view from the side (0) to the top (π/2).
    pub fn project(&self, [x, y, z]: [f64; 3]) -> [f64; 2] {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        let depth_x = x * cos_yaw - y * sin_yaw;
        let depth_y = x * sin_yaw + y * cos_yaw;
        [depth_x, z * cos_pitch + depth_y * sin_pitch]
    }

    pub fn rotate(&mut self, dyaw: f64, dpitch: f64) {
        use std::f64::consts::{FRAC_PI_2, TAU};
        self.yaw = (self.yaw + dyaw).rem_euclid(TAU);
        self.pitch = (self.pitch + dpitch).clamp(-FRAC_PI_2, FRAC_PI_2);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc::channel;

    use app_core::backend::BackendRequest;

    use super::super::Artifacts;
    use super::*;
    use crate::state::artifact::ArtifactStatus;

    fn approx(a: [f64; 2], b: [f64; 2]) -> bool {
        (a[0] - b[0]).abs() < 1e-9 && (a[1] - b[1]).abs() < 1e-9
    }

    #[test]
    fn test_projection() {
        let side = Projection {
            yaw: 0.0,
            pitch: 0.0,
        };
        assert!(approx(side.project([1.0, 5.0, 2.0]), [1.0, 2.0]));
        let top = Projection {
            yaw: 0.0,
            pitch: std::f64::consts::FRAC_PI_2,
        };
        assert!(approx(top.project([1.0, 5.0, 2.0]), [1.0, 5.0]));

        let mut turned = side;
        turned.rotate(std::f64::consts::FRAC_PI_2, 10.0);
        assert!(approx(turned.project([0.0, 1.0, 0.0]), [-1.0, 0.0]));
        assert_eq!(turned.pitch, std::f64::consts::FRAC_PI_2);
    }

    #[test]
    fn test_toggle_needs_data() {
        let _ = env_logger::builder().is_test(true).try_init();
        let (request_tx, request_rx) = channel();
        let dataset = Dataset::new(request_tx.clone());
        let mut artifacts = Artifacts::new(request_tx);
        let mut groups = ColorGroups::default();

        let action = artifacts.toggle(ArtifactKind::Scree, &dataset, &mut groups, "#272E3F");
        assert_eq!(action, Toggle::NeedsData);
        assert_eq!(artifacts.scree.status(), ArtifactStatus::Hidden);
        assert!(request_rx.try_recv().is_err());
    }

    #[test]
    fn test_toggle_sends_request() {
        let _ = env_logger::builder().is_test(true).try_init();
        let (request_tx, request_rx) = channel();
        let mut dataset = Dataset::new(request_tx.clone());
        dataset.set_table("test".into(), Table::from_csv_str("id,x\nS1,1\n").unwrap());
        let mut artifacts = Artifacts::new(request_tx);
        let mut groups = ColorGroups::default();

        let kind = ArtifactKind::Pca(PcaDim::Three);
        assert_eq!(artifacts.toggle(kind, &dataset, &mut groups, "#272E3F"), Toggle::Fetch);
        assert!(artifacts.is_kind_loading(kind));
        let request = request_rx.try_recv().unwrap();
        assert_eq!(request.describe(), "compute PCA 3D");

        // Clicking again while loading cancels.
        assert_eq!(artifacts.toggle(kind, &dataset, &mut groups, "#272E3F"), Toggle::Cancel);
        assert!(!artifacts.is_loading());
    }
}
