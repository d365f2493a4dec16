use std::sync::mpsc::TryRecvError;

use log::{debug, warn};

use crate::backend::LinkReceiver;

/// Monotonically increasing number handed out for every request issued on
/// a parameter.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct RequestSeq(u64);

impl RequestSeq {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// A value shown by the UI whose updates are computed on the backend.
///
/// Only the answer to the latest request is ever applied: issuing a new
/// request drops (and thereby cancels) the receiver of the previous one.
#[derive(Debug)]
pub struct UIParameter<T> {
    pending_update_rx: Option<(RequestSeq, LinkReceiver<T>)>,
    value: T,
    issued: RequestSeq,
    applied: RequestSeq,
}

impl<T: Clone> Clone for UIParameter<T> {
    fn clone(&self) -> Self {
        Self {
            pending_update_rx: None,
            value: self.value.clone(),
            issued: self.applied,
            applied: self.applied,
        }
    }
}

impl<T: Default> Default for UIParameter<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> UIParameter<T> {
    pub fn new(val: T) -> Self {
        UIParameter {
            pending_update_rx: None,
            value: val,
            issued: RequestSeq::default(),
            applied: RequestSeq::default(),
        }
    }

    /// Polls the pending request. Returns true if the value changed or the
    /// request was lost.
    pub fn try_update(&mut self) -> bool {
        let Some((seq, rx)) = &self.pending_update_rx else {
            return false;
        };
        let seq = *seq;
        match rx.try_recv() {
            Ok(val) => self.accept(seq, val),
            Err(TryRecvError::Empty) => false,
            Err(TryRecvError::Disconnected) => {
                warn!("Tried to receive message from closed channel.");
                self.pending_update_rx = None;
                true
            }
        }
    }

    /// Applies `val` if it answers the latest issued request.
    pub fn accept(&mut self, seq: RequestSeq, val: T) -> bool {
        if seq != self.issued {
            debug!(
                "discarding stale answer to request {} (latest is {})",
                seq.get(),
                self.issued.get()
            );
            return false;
        }
        self.value = val;
        self.applied = seq;
        self.pending_update_rx = None;
        true
    }

    pub fn is_up_to_date(&self) -> bool {
        self.pending_update_rx.is_none()
    }

    /// Registers the receiver of a new request and returns its number.
    pub fn set_recv(&mut self, rx: LinkReceiver<T>) -> RequestSeq {
        self.issued = self.issued.next();
        if let Some((superseded, _)) = self.pending_update_rx.replace((self.issued, rx)) {
            debug!(
                "request {} superseded by request {}",
                superseded.get(),
                self.issued.get()
            );
        }
        self.issued
    }

    /// Overwrites the value locally, cancelling any pending request.
    pub fn set_value(&mut self, val: T) {
        self.issued = self.issued.next();
        self.applied = self.issued;
        self.pending_update_rx = None;
        self.value = val;
    }

    pub fn latest_request(&self) -> RequestSeq {
        self.issued
    }

    pub fn value_mut(&mut self) -> &mut T {
        &mut self.value
    }

    pub fn value(&self) -> &T {
        &self.value
    }
}
