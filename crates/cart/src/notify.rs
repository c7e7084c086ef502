//! User-facing notification sinks.
//!
//! Notifications are fire-and-forget: the store never waits for or checks an
//! acknowledgment.

use std::sync::{Arc, Mutex};

/// Reports a message to the shopper.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

impl<T: Notifier + ?Sized> Notifier for Arc<T> {
    fn notify(&self, message: &str) {
        (**self).notify(message);
    }
}

/// Emits notifications as `warn` events on the `rocketshoes::notify` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str) {
        tracing::warn!(target: "rocketshoes::notify", "{message}");
    }
}

/// Keeps every notification for later inspection.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages received so far, oldest first.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .map(|messages| messages.clone())
            .unwrap_or_default()
    }

    /// Drain the recorded messages.
    pub fn take(&self) -> Vec<String> {
        self.messages
            .lock()
            .map(|mut messages| std::mem::take(&mut *messages))
            .unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(message.to_string());
        }
    }
}
