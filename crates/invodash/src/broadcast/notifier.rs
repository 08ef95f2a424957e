//! User-facing notification broadcasting.
//!
//! Transport and payload failures never crash the client; they surface as
//! dismissible, auto-expiring notifications the presentation layer renders
//! as toasts.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Default display time before a notification auto-dismisses.
const DEFAULT_DISMISS_MS: u64 = 6_000;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
    /// Milliseconds until auto-dismiss; `None` means sticky.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_dismiss_ms: Option<u64>,
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            auto_dismiss_ms: Some(DEFAULT_DISMISS_MS),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Clone)]
pub struct NotificationBroadcaster {
    sender: Arc<broadcast::Sender<Notification>>,
}

impl NotificationBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn send(&self, notification: Notification) {
        // Ignore errors - no active receivers is fine
        let _ = self.sender.send(notification);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    pub fn info(&self, message: impl Into<String>) {
        self.send(Notification::new(Severity::Info, message));
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.send(Notification::new(Severity::Warning, message));
    }

    pub fn error(&self, message: impl Into<String>) {
        self.send(Notification::new(Severity::Error, message));
    }
}

impl Default for NotificationBroadcaster {
    fn default() -> Self {
        Self::new(100)
    }
}
