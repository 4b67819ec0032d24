//! Side effects performed when a schedule's timer fires.

/// Fire-and-forget sinks invoked by the timer scheduler.
///
/// Implementations must not block for long: they run on the timer task.
pub trait ActionSink: Send + Sync + 'static {
    /// Open a meeting link in the user's browser.
    fn open_url(&self, url: &str);

    /// Show a user-facing notification.
    fn notify(&self, title: &str, body: &str);
}

/// Sink that only records the actions in the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogActions;

impl ActionSink for LogActions {
    fn open_url(&self, url: &str) {
        tracing::info!("Opening meeting link {}", url);
    }

    fn notify(&self, title: &str, body: &str) {
        tracing::info!("Notification: {} - {}", title, body);
    }
}
