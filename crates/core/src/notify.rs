//! Outgoing notifications.
//!
//! The core only decides who gets which template with what context.
//! Rendering and delivery belong to the [`Notifier`] implementation.

use async_trait::async_trait;
use chrono_tz::Tz;
use serde::Serialize;
use thiserror::Error;

/// A message to hand to the notification sender.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub template: String,
    pub to: Vec<String>,
    /// Timezone dates in the message are rendered in.
    pub timezone: Tz,
    pub context: serde_json::Value,
}

/// Errors raised while sending a notification.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotifyError {
    #[error("Notification has no recipients")]
    NoRecipients,
    #[error("Delivery failed: {0}")]
    Delivery(String),
}

/// Sends notifications to customers.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError>;
}
