//! Trailing-edge debouncer.
//!
//! Each push replaces the pending timer; a value is emitted only after
//! the window has passed with no newer push.

use std::time::Duration;

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::task::JoinHandle;

/// Emits the most recent pushed value once input has been quiet for `window`.
#[derive(Debug)]
pub struct Debouncer<T> {
    window: Duration,
    tx: UnboundedSender<T>,
    pending: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Creates a debouncer and the receiver its settled values arrive on.
    #[must_use]
    pub fn new(window: Duration) -> (Self, UnboundedReceiver<T>) {
        let (tx, rx) = unbounded_channel();
        let debouncer = Self {
            window,
            tx,
            pending: None,
        };
        (debouncer, rx)
    }

    /// Re-arms the timer with `value`, discarding any value still waiting.
    ///
    /// Must be called from within a tokio runtime.
    pub fn push(&mut self, value: T) {
        self.cancel();
        let tx = self.tx.clone();
        let window = self.window;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(window).await;
            // Receiver gone means the owner is shutting down.
            let _ = tx.send(value);
        }));
    }

    /// Drops the waiting value without emitting it.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    /// Whether a value is waiting for the window to elapse.
    #[cfg(test)]
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}
