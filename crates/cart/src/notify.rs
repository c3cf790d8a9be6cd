//! User-facing notifications for cart outcomes.
//!
//! The store reports failures as values; this module is the piece a
//! presentation layer uses to turn them into transient messages.

use std::sync::Mutex;

use serde::Serialize;

use crate::error::CartError;
use crate::types::Cart;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Error,
}

/// A transient message for the shopper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

impl From<CartError> for Notification {
    fn from(err: CartError) -> Self {
        Notification::error(err.user_message())
    }
}

/// Sink for notifications (toast area, terminal, log...).
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification);
}

/// Emits notifications as log events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: &Notification) {
        match notification.level {
            NotificationLevel::Info => tracing::info!("{}", notification.message),
            NotificationLevel::Error => tracing::warn!("{}", notification.message),
        }
    }
}

/// Keeps every notification in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications
            .lock()
            .map(|n| n.clone())
            .unwrap_or_default()
    }

    /// Drain the recorded notifications.
    pub fn take(&self) -> Vec<Notification> {
        self.notifications
            .lock()
            .map(|mut n| std::mem::take(&mut *n))
            .unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: &Notification) {
        if let Ok(mut notifications) = self.notifications.lock() {
            notifications.push(notification.clone());
        }
    }
}

/// Surface a failed operation through `notifier`; successes pass through.
pub fn notify_outcome<N>(notifier: &N, outcome: Result<Cart, CartError>) -> Option<Cart>
where
    N: Notifier + ?Sized,
{
    match outcome {
        Ok(cart) => Some(cart),
        Err(err) => {
            notifier.notify(&Notification::from(err));
            None
        }
    }
}
