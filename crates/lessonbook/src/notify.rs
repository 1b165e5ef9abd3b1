//! Notification delivery.

use async_trait::async_trait;
use lessonbook_core::notify::{Notification, Notifier, NotifyError};

/// Records notifications in the log instead of delivering them.
///
/// Stands in for a mail backend in development and in deployments where
/// delivery happens elsewhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        if notification.to.is_empty() {
            return Err(NotifyError::NoRecipients);
        }

        tracing::info!(
            template = %notification.template,
            to = ?notification.to,
            timezone = %notification.timezone,
            context = %notification.context,
            "Sending notification"
        );
        Ok(())
    }
}
