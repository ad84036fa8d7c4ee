//! Replayable fan-out channel.
//!
//! [`ReplayChannel`] keeps the most recently published value and hands it
//! to every subscriber at registration time, followed by all later values
//! in publish order. It never completes while any handle is alive.
//!
//! Registration and publishing happen under the same lock, so a subscriber
//! can neither miss a value published concurrently with its registration
//! nor see it twice.
//!
//! [`ReplayView::forward`] feeds several channels into one queue. Values
//! published from a single task then arrive in exactly the order they were
//! published, across channels.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc;

use crate::subscription::Subscription;

/// Delivers one value; returns `false` once the receiving end is gone.
type Sink<T> = Box<dyn Fn(T) -> bool + Send>;

struct Shared<T> {
    latest: Option<T>,
    subscribers: Vec<Sink<T>>,
}

// ---------------------------------------------------------------------------
// ReplayChannel
// ---------------------------------------------------------------------------

/// Publishing handle of a replayable channel.
///
/// Cloning yields another publisher for the same channel; hand consumers a
/// [`ReplayView`] instead.
pub struct ReplayChannel<T> {
    shared: Arc<Mutex<Shared<T>>>,
}

impl<T: Clone + Send + 'static> ReplayChannel<T> {
    /// Create a channel with nothing to replay yet.
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Mutex::new(Shared {
                latest: None,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Store `value` as the latest and deliver it to every live subscriber.
    ///
    /// Subscribers whose receiving end has been dropped are removed.
    pub fn publish(&self, value: T) {
        let mut shared = lock(&self.shared);
        shared
            .subscribers
            .retain(|deliver| deliver(value.clone()));
        shared.latest = Some(value);
    }

    /// Read-only handle for consumers.
    pub fn view(&self) -> ReplayView<T> {
        ReplayView {
            shared: Arc::clone(&self.shared),
        }
    }

    pub fn subscribe(&self) -> Subscription<T> {
        subscribe(&self.shared)
    }

    pub fn latest(&self) -> Option<T> {
        lock(&self.shared).latest.clone()
    }
}

impl<T: Clone + Send + 'static> Default for ReplayChannel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for ReplayChannel<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

// ---------------------------------------------------------------------------
// ReplayView
// ---------------------------------------------------------------------------

/// Consumer-side handle of a replayable channel. Cannot publish.
pub struct ReplayView<T> {
    shared: Arc<Mutex<Shared<T>>>,
}

impl<T: Clone + Send + 'static> ReplayView<T> {
    /// Register a new subscriber.
    ///
    /// The latest value, if any, is queued immediately, ahead of anything
    /// published afterwards.
    pub fn subscribe(&self) -> Subscription<T> {
        subscribe(&self.shared)
    }

    /// Register `tx` as a subscriber, wrapping each value with `wrap`.
    ///
    /// Replays like [`subscribe`](Self::subscribe). The registration is
    /// dropped on the first publish after the receiver of `tx` is gone.
    pub fn forward<U, F>(&self, tx: &mpsc::UnboundedSender<U>, wrap: F)
    where
        U: Send + 'static,
        F: Fn(T) -> U + Send + 'static,
    {
        let tx = tx.clone();
        register(&self.shared, move |value| tx.send(wrap(value)).is_ok());
    }

    /// The most recently published value, if any.
    pub fn latest(&self) -> Option<T> {
        lock(&self.shared).latest.clone()
    }

    /// Number of registered subscribers, including ones dropped since the
    /// last publish.
    pub fn subscriber_count(&self) -> usize {
        lock(&self.shared).subscribers.len()
    }
}

impl<T> Clone for ReplayView<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

// ---- private helpers ----

fn subscribe<T: Clone + Send + 'static>(shared: &Mutex<Shared<T>>) -> Subscription<T> {
    let (tx, rx) = mpsc::unbounded_channel();
    register(shared, move |value| tx.send(value).is_ok());
    Subscription::from(rx)
}

fn register<T, F>(shared: &Mutex<Shared<T>>, deliver: F)
where
    T: Clone,
    F: Fn(T) -> bool + Send + 'static,
{
    let mut shared = lock(shared);
    if let Some(latest) = &shared.latest {
        if !deliver(latest.clone()) {
            return;
        }
    }
    shared.subscribers.push(Box::new(deliver));
}

/// A panic while holding the lock cannot leave `Shared` half-updated, so a
/// poisoned lock is still safe to use.
fn lock<T>(shared: &Mutex<Shared<T>>) -> MutexGuard<'_, Shared<T>> {
    shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
