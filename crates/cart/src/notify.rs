//! Transient user notifications.
//!
//! User-visible failures are reported through a non-blocking notification
//! channel and never block the calling flow. The trait keeps state
//! transitions testable without mocking a UI layer; the page layer plugs in
//! its own toast implementation.

use tracing::{error, info, warn};

/// Sink for transient, non-blocking user notifications.
pub trait Notifier: Send + Sync {
    /// An operation completed.
    fn success(&self, message: &str);

    /// Something degraded but the flow completed (e.g., merge failure
    /// after a successful login).
    fn warning(&self, message: &str);

    /// An operation failed.
    fn error(&self, message: &str);
}

/// Default notifier that reports through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn success(&self, message: &str) {
        info!(notification = message, "user notification");
    }

    fn warning(&self, message: &str) {
        warn!(notification = message, "user notification");
    }

    fn error(&self, message: &str) {
        error!(notification = message, "user notification");
    }
}
