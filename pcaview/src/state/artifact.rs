//! Visibility and fetch state of the artifacts computed by the PCA service.

use std::sync::mpsc::TryRecvError;

use app_core::{backend::LinkReceiver, frontend::RequestSeq};

use super::payload::PlotPayload;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArtifactStatus {
    Hidden,
    Loading,
    Visible,
}

/// What a click on an artifact's toggle button asks the caller to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Toggle {
    Hide,
    ShowCached,
    /// Caller must issue a request and hand it over with `await_answer`.
    Fetch,
    /// No dataset loaded; the user has to be told.
    NeedsData,
    Cancel,
}

/// Identifies the dataset an artifact was computed from. Every newly
/// loaded dataset gets the next revision.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DataRevision(u64);

impl DataRevision {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// Outcome of handing an answer to `Artifact::complete`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Completion {
    Stale,
    Stored,
    Failed,
}

type Answer<T> = Result<T, String>;

#[derive(Debug)]
struct Pending<T> {
    seq: RequestSeq,
    revision: DataRevision,
    rx: Option<LinkReceiver<Answer<T>>>,
}

#[derive(Debug)]
pub struct Artifact<T> {
    status: ArtifactStatus,
    payload: Option<T>,
    payload_revision: Option<DataRevision>,
    issued: RequestSeq,
    pending: Option<Pending<T>>,
    last_error: Option<String>,
}

impl<T> Default for Artifact<T> {
    fn default() -> Self {
        Self {
            status: ArtifactStatus::Hidden,
            payload: None,
            payload_revision: None,
            issued: RequestSeq::default(),
            pending: None,
            last_error: None,
        }
    }
}

impl<T> Artifact<T> {
    /// Flips visibility. `data` is the revision of the loaded dataset, if
    /// any.
    pub fn toggle(&mut self, data: Option<DataRevision>) -> Toggle {
        match self.status {
            ArtifactStatus::Visible => {
                self.status = ArtifactStatus::Hidden;
                Toggle::Hide
            }
            ArtifactStatus::Loading => {
                log::debug!("cancelling request {}", self.issued.get());
                self.pending = None;
                self.status = ArtifactStatus::Hidden;
                Toggle::Cancel
            }
            ArtifactStatus::Hidden => match data {
                None => Toggle::NeedsData,
                Some(rev) if self.is_cached_for(rev) => {
                    self.status = ArtifactStatus::Visible;
                    Toggle::ShowCached
                }
                Some(_) => Toggle::Fetch,
            },
        }
    }

    /// Starts a new request for the dataset `revision`. A request still in
    /// flight is superseded.
    pub fn begin_fetch(&mut self, revision: DataRevision) -> RequestSeq {
        self.issued = self.issued.next();
        if let Some(old) = self.pending.take() {
            log::debug!(
                "request {} superseded by request {}",
                old.seq.get(),
                self.issued.get()
            );
        }
        self.pending = Some(Pending {
            seq: self.issued,
            revision,
            rx: None,
        });
        self.status = ArtifactStatus::Loading;
        self.issued
    }

    /// Attaches the receiver of request `seq`. Receivers of superseded
    /// requests are dropped right away, which cancels them.
    pub fn await_answer(&mut self, seq: RequestSeq, rx: LinkReceiver<Answer<T>>) {
        match self.pending.as_mut() {
            Some(pending) if pending.seq == seq => pending.rx = Some(rx),
            _ => log::debug!("request {} is no longer awaited", seq.get()),
        }
    }

    pub fn complete(&mut self, seq: RequestSeq, answer: Answer<T>) -> Completion {
        let revision = match self.pending.take() {
            Some(pending) if pending.seq == seq && seq == self.issued => pending.revision,
            other => {
                self.pending = other;
                log::debug!(
                    "discarding stale answer to request {} (latest is {})",
                    seq.get(),
                    self.issued.get()
                );
                return Completion::Stale;
            }
        };
        match answer {
            Ok(payload) => {
                self.payload = Some(payload);
                self.payload_revision = Some(revision);
                self.last_error = None;
                self.status = ArtifactStatus::Visible;
                Completion::Stored
            }
            Err(err) => {
                log::error!("{}", err);
                self.last_error = Some(err);
                self.status = ArtifactStatus::Hidden;
                Completion::Failed
            }
        }
    }

    /// Checks whether the pending request was answered.
    pub fn poll(&mut self) -> Option<Completion> {
        let pending = self.pending.as_ref()?;
        let seq = pending.seq;
        let answer = match pending.rx.as_ref()?.try_recv() {
            Ok(answer) => answer,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err("request was dropped by the backend".into()),
        };
        Some(self.complete(seq, answer))
    }

    pub fn hide(&mut self) {
        self.pending = None;
        self.status = ArtifactStatus::Hidden;
    }

    pub fn status(&self) -> ArtifactStatus {
        self.status
    }

    pub fn is_visible(&self) -> bool {
        self.status == ArtifactStatus::Visible
    }

    pub fn is_loading(&self) -> bool {
        self.status == ArtifactStatus::Loading
    }

    /// The payload, but only while the artifact is shown.
    pub fn visible_payload(&self) -> Option<&T> {
        self.payload.as_ref().filter(|_| self.is_visible())
    }

    pub fn visible_payload_mut(&mut self) -> Option<&mut T> {
        if self.is_visible() {
            self.payload.as_mut()
        } else {
            None
        }
    }

    pub fn payload(&self) -> Option<&T> {
        self.payload.as_ref()
    }

    pub fn payload_mut(&mut self) -> Option<&mut T> {
        self.payload.as_mut()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn latest_request(&self) -> RequestSeq {
        self.issued
    }

    fn is_cached_for(&self, revision: DataRevision) -> bool {
        self.payload.is_some() && self.payload_revision == Some(revision)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PcaDim {
    Two,
    Three,
}

impl PcaDim {
    pub fn other(self) -> Self {
        match self {
            PcaDim::Two => PcaDim::Three,
            PcaDim::Three => PcaDim::Two,
        }
    }
}

/// The 2D and 3D PCA plots; at most one of them is shown.
#[derive(Debug, Default)]
pub struct PcaViews {
    pub two_d: Artifact<PlotPayload>,
    pub three_d: Artifact<PlotPayload>,
}

impl PcaViews {
    pub fn get(&self, dim: PcaDim) -> &Artifact<PlotPayload> {
        match dim {
            PcaDim::Two => &self.two_d,
            PcaDim::Three => &self.three_d,
        }
    }

    pub fn get_mut(&mut self, dim: PcaDim) -> &mut Artifact<PlotPayload> {
        match dim {
            PcaDim::Two => &mut self.two_d,
            PcaDim::Three => &mut self.three_d,
        }
    }

    pub fn toggle(&mut self, dim: PcaDim, data: Option<DataRevision>) -> Toggle {
        let action = self.get_mut(dim).toggle(data);
        if matches!(action, Toggle::ShowCached | Toggle::Fetch) {
            self.get_mut(dim.other()).hide();
        }
        action
    }

    /// The PCA view that is currently shown or loading.
    pub fn active(&self) -> Option<PcaDim> {
        [PcaDim::Two, PcaDim::Three]
            .into_iter()
            .find(|dim| self.get(*dim).status() != ArtifactStatus::Hidden)
    }

    /// Payload that recoloring applies to.
    pub fn active_payload_mut(&mut self) -> Option<&mut PlotPayload> {
        if self.two_d.is_visible() {
            self.two_d.visible_payload_mut()
        } else {
            self.three_d.visible_payload_mut()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded(artifact: &mut Artifact<u32>, rev: DataRevision, val: u32) {
        assert_eq!(artifact.toggle(Some(rev)), Toggle::Fetch);
        let seq = artifact.begin_fetch(rev);
        assert!(artifact.is_loading());
        assert_eq!(artifact.complete(seq, Ok(val)), Completion::Stored);
    }

    #[test]
    fn test_double_toggle_reuses_cache() {
        let _ = env_logger::builder().is_test(true).try_init();
        let rev = DataRevision::default().next();
        let mut artifact = Artifact::default();
        loaded(&mut artifact, rev, 3);
        assert!(artifact.is_visible());
        let issued = artifact.latest_request();

        assert_eq!(artifact.toggle(Some(rev)), Toggle::Hide);
        assert_eq!(artifact.status(), ArtifactStatus::Hidden);
        assert_eq!(artifact.toggle(Some(rev)), Toggle::ShowCached);
        assert!(artifact.is_visible());
        assert_eq!(artifact.latest_request(), issued);
        assert_eq!(artifact.visible_payload(), Some(&3));
    }

    #[test]
    fn test_new_data_needs_new_fetch() {
        let rev = DataRevision::default().next();
        let mut artifact = Artifact::default();
        loaded(&mut artifact, rev, 3);
        artifact.toggle(Some(rev));
        assert_eq!(artifact.toggle(Some(rev.next())), Toggle::Fetch);
    }

    #[test]
    fn test_no_data() {
        let mut artifact = Artifact::<u32>::default();
        assert_eq!(artifact.toggle(None), Toggle::NeedsData);
        assert_eq!(artifact.status(), ArtifactStatus::Hidden);
    }

    #[test]
    fn test_stale_answer_is_discarded() {
        let _ = env_logger::builder().is_test(true).try_init();
        let rev = DataRevision::default();
        let mut artifact = Artifact::default();
        let first = artifact.begin_fetch(rev);
        let second = artifact.begin_fetch(rev);

        assert_eq!(artifact.complete(first, Ok(1)), Completion::Stale);
        assert!(artifact.is_loading());
        assert_eq!(artifact.complete(second, Ok(2)), Completion::Stored);
        assert_eq!(artifact.payload(), Some(&2));
        assert_eq!(artifact.complete(first, Ok(1)), Completion::Stale);
        assert_eq!(artifact.payload(), Some(&2));
    }

    #[test]
    fn test_failure_returns_to_hidden() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut artifact = Artifact::<u32>::default();
        let seq = artifact.begin_fetch(DataRevision::default());
        let res = artifact.complete(seq, Err("connection refused".into()));
        assert_eq!(res, Completion::Failed);
        assert_eq!(artifact.status(), ArtifactStatus::Hidden);
        assert_eq!(artifact.last_error(), Some("connection refused"));
        assert_eq!(artifact.payload(), None);
    }

    #[test]
    fn test_cancel_while_loading() {
        let mut artifact = Artifact::<u32>::default();
        let rev = DataRevision::default();
        let seq = artifact.begin_fetch(rev);
        assert_eq!(artifact.toggle(Some(rev)), Toggle::Cancel);
        assert_eq!(artifact.status(), ArtifactStatus::Hidden);
        assert_eq!(artifact.complete(seq, Ok(5)), Completion::Stale);
        assert!(artifact.poll().is_none());
    }

    #[test]
    fn test_pca_views_are_exclusive() {
        let rev = DataRevision::default();
        let mut views = PcaViews::default();
        assert_eq!(views.toggle(PcaDim::Two, Some(rev)), Toggle::Fetch);
        let seq = views.two_d.begin_fetch(rev);
        views.two_d.complete(seq, Ok(PlotPayload::default()));
        assert_eq!(views.active(), Some(PcaDim::Two));
        assert!(views.active_payload_mut().is_some());

        assert_eq!(views.toggle(PcaDim::Three, Some(rev)), Toggle::Fetch);
        views.three_d.begin_fetch(rev);
        assert_eq!(views.two_d.status(), ArtifactStatus::Hidden);
        assert_eq!(views.active(), Some(PcaDim::Three));
        // Still loading, nothing to recolor.
        assert!(views.active_payload_mut().is_none());

        assert_eq!(views.toggle(PcaDim::Two, Some(rev)), Toggle::ShowCached);
        assert_eq!(views.three_d.status(), ArtifactStatus::Hidden);
    }
}
