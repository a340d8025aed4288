use crate::error::NotificationError;
use crate::ports::NotificationSink;

/// Reports notifications through `tracing` instead of a toast widget.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNotificationSink;

impl NotificationSink for TracingNotificationSink {
    fn success(&self, title: &str, message: &str) -> Result<(), NotificationError> {
        tracing::info!(%title, "{message}");
        Ok(())
    }

    fn failure(&self, title: &str, message: &str) -> Result<(), NotificationError> {
        tracing::error!(%title, "{message}");
        Ok(())
    }
}
