//! Receiving half of a fan-out channel.

use tokio::sync::mpsc;

/// An independent, ordered feed of values from a channel.
///
/// Each subscription owns an unbounded queue, so a slow consumer never
/// causes values to be dropped for itself or anyone else. Dropping the
/// subscription unregisters it on the next publish.
#[derive(Debug)]
pub struct Subscription<T> {
    rx: mpsc::UnboundedReceiver<T>,
}

impl<T> From<mpsc::UnboundedReceiver<T>> for Subscription<T> {
    fn from(rx: mpsc::UnboundedReceiver<T>) -> Self {
        Self { rx }
    }
}

impl<T> Subscription<T> {
    /// Wait for the next value.
    ///
    /// Returns `None` only once every publisher handle has been dropped.
    pub async fn recv(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    /// Take the next value if one is already queued.
    pub fn try_recv(&mut self) -> Option<T> {
        self.rx.try_recv().ok()
    }

    /// Take every value currently queued, oldest first.
    pub fn drain(&mut self) -> Vec<T> {
        let mut values = Vec::new();
        while let Ok(value) = self.rx.try_recv() {
            values.push(value);
        }
        values
    }
}
