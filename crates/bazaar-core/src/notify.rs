//! User-facing feedback channels.
//!
//! Two kinds exist: transient `Notification`s (toasts) emitted through a
//! `Notifier`, and `InlineAlert`s that a view renders next to the content they
//! concern (insufficient balance, validation failures, throttling banners).

use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::api::ApiError;

/// How long the inline throttling banner stays up.
pub const RATE_LIMIT_BANNER_TTL: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub message: String,
}

impl Notification {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: Level::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: Level::Info,
            message: message.into(),
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the log. Used when no UI is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            Level::Error => error!(message = %notification.message, "Notification"),
            Level::Success | Level::Info => info!(message = %notification.message, "Notification"),
        }
    }
}

/// Forwards notifications to whatever renders them.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        if let Err(e) = self.tx.send(notification) {
            warn!(message = %e.0.message, "Notification dropped - receiver closed");
        }
    }
}

/// Domain-specific failures shown in place rather than as a toast.
#[derive(Debug, Clone, PartialEq)]
pub enum InlineAlert {
    InsufficientBalance { balance: f64, requested: f64 },
    BelowMinimum { minimum: f64 },
    Validation { field: String, message: String },
    PurchaseRequired,
    RateLimited { expires_at: Instant },
}

impl InlineAlert {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        InlineAlert::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn rate_limited() -> Self {
        InlineAlert::RateLimited {
            expires_at: Instant::now() + RATE_LIMIT_BANNER_TTL,
        }
    }

    /// Only the throttling banner expires; the rest stay until replaced.
    pub fn is_expired(&self) -> bool {
        match self {
            InlineAlert::RateLimited { expires_at } => Instant::now() >= *expires_at,
            _ => false,
        }
    }

    pub fn message(&self) -> String {
        match self {
            InlineAlert::InsufficientBalance { balance, requested } => format!(
                "Insufficient balance: you requested {:.2} but only {:.2} is available.",
                requested, balance
            ),
            InlineAlert::BelowMinimum { minimum } => {
                format!("The minimum withdrawal amount is {:.2}.", minimum)
            }
            InlineAlert::Validation { field, message } => format!("{}: {}", field, message),
            InlineAlert::PurchaseRequired => "You need to purchase this item first.".to_string(),
            InlineAlert::RateLimited { .. } => {
                "Too many requests. Showing saved results; try again shortly.".to_string()
            }
        }
    }
}

impl std::fmt::Display for InlineAlert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

/// Failure of a user action: either caught locally and shown inline, or
/// reported by the backend (and already announced by the `Caller`).
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("{0}")]
    Alert(InlineAlert),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("Failed to save file: {0}")]
    Io(#[from] std::io::Error),
}

impl From<InlineAlert> for ActionError {
    fn from(alert: InlineAlert) -> Self {
        ActionError::Alert(alert)
    }
}

impl ActionError {
    pub fn alert(&self) -> Option<&InlineAlert> {
        match self {
            ActionError::Alert(alert) => Some(alert),
            _ => None,
        }
    }

    pub fn api(&self) -> Option<&ApiError> {
        match self {
            ActionError::Api(error) => Some(error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_notifier_delivers_in_order() {
        let (notifier, mut rx) = ChannelNotifier::new();
        notifier.notify(Notification::error("first"));
        notifier.notify(Notification::success("second"));

        assert_eq!(rx.recv().await, Some(Notification::error("first")));
        assert_eq!(rx.recv().await.map(|n| n.message), Some("second".to_string()));
    }

    #[test]
    fn test_closed_channel_does_not_panic() {
        let (notifier, rx) = ChannelNotifier::new();
        drop(rx);
        notifier.notify(Notification::info("nobody listening"));
    }

    #[test]
    fn test_rate_limit_banner_expires() {
        let fresh = InlineAlert::rate_limited();
        assert!(!fresh.is_expired());

        let old = InlineAlert::RateLimited {
            expires_at: Instant::now() - Duration::from_millis(1),
        };
        assert!(old.is_expired());
        assert!(!InlineAlert::PurchaseRequired.is_expired());
    }

    #[test]
    fn test_alert_messages() {
        let alert = InlineAlert::InsufficientBalance {
            balance: 5.0,
            requested: 20.0,
        };
        assert_eq!(
            alert.message(),
            "Insufficient balance: you requested 20.00 but only 5.00 is available."
        );
        assert_eq!(
            InlineAlert::validation("title", "is required").to_string(),
            "title: is required"
        );
    }
}
