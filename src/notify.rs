//! Notification sink seam
//!
//! Fire-and-forget messaging to an external sink (e.g., a chat bot).
//! Delivery failures are the collaborator's concern; callers never wait on
//! or inspect them.

/// Trait for outbound notification sinks
pub trait Notifier: Send + Sync {
    /// Send a message, fire-and-forget
    fn send(&self, message: &str);
}

/// Notifier that writes to the log instead of an external sink
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send(&self, message: &str) {
        tracing::info!(target: "notify", "{message}");
    }
}
