//! Owner of the viewer's selection criteria.
//!
//! [`SelectionState`] never validates or rejects anything: every update is
//! merged and the full resulting value is broadcast to all observers,
//! however small the change. Observers registering later only see future
//! broadcasts.

use std::sync::{Mutex, MutexGuard};

use tokio::sync::mpsc;
use wildcam_core::selection::{SelectionCriteria, SelectionPatch};

use crate::subscription::Subscription;

struct Inner {
    current: SelectionCriteria,
    observers: Vec<mpsc::UnboundedSender<SelectionCriteria>>,
}

/// Mutable selection plus its observers.
///
/// Designed to be shared via `Arc<SelectionState>` between the UI side
/// and the pipeline.
pub struct SelectionState {
    inner: Mutex<Inner>,
}

impl SelectionState {
    /// Start from the default selection (no deployment, interval 1, frame rate 1).
    pub fn new() -> Self {
        Self::with_criteria(SelectionCriteria::default())
    }

    pub fn with_criteria(criteria: SelectionCriteria) -> Self {
        Self {
            inner: Mutex::new(Inner {
                current: criteria,
                observers: Vec::new(),
            }),
        }
    }

    /// Merge `patch` into the current criteria and broadcast the result.
    ///
    /// Returns the full value that was broadcast.
    pub fn update(&self, patch: SelectionPatch) -> SelectionCriteria {
        let mut inner = self.lock();
        inner.current.apply(patch);
        let snapshot = inner.current.clone();
        inner
            .observers
            .retain(|tx| tx.send(snapshot.clone()).is_ok());

        tracing::trace!(
            observers = inner.observers.len(),
            deployment = ?snapshot.deployment,
            frame_rate = snapshot.frame_rate,
            "Selection updated",
        );
        snapshot
    }

    /// Latest full snapshot.
    pub fn current_value(&self) -> SelectionCriteria {
        self.lock().current.clone()
    }

    /// Observe every future update.
    pub fn subscribe(&self) -> Subscription<SelectionCriteria> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock().observers.push(tx);
        Subscription::from(rx)
    }

    /// Number of registered observers, including ones dropped since the
    /// last update.
    pub fn observer_count(&self) -> usize {
        self.lock().observers.len()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for SelectionState {
    fn default() -> Self {
        Self::new()
    }
}
