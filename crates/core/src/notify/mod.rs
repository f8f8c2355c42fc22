//! Best-effort outbound notifications.
//!
//! Account events (registration, password reset) are pushed to an external
//! workflow-automation service that sends the actual emails. Delivery is
//! never part of the triggering operation: callers hand a notification to
//! [`dispatch_best_effort`] and move on.

mod webhook;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

pub use webhook::WebhookNotifier;

/// An account event worth telling the user about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// A new account was created.
    UserRegistered {
        /// The new user's id.
        uid: Uuid,
        /// Address the welcome email goes to.
        email: String,
        /// Account creation time.
        created_at: DateTime<Utc>,
    },
    /// A password reset was requested.
    PasswordReset {
        /// Address the reset link goes to.
        email: String,
        /// When the reset was requested.
        timestamp: DateTime<Utc>,
        /// Link that completes the reset.
        reset_url: String,
    },
}

impl Notification {
    /// Short name used in logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::UserRegistered { .. } => "user_registered",
            Self::PasswordReset { .. } => "password_reset",
        }
    }

    /// JSON body expected by the automation service.
    #[must_use]
    pub fn payload(&self) -> Value {
        match self {
            Self::UserRegistered {
                uid,
                email,
                created_at,
            } => json!({
                "destinatario": email,
                "uid": uid,
                "createdAt": created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            }),
            Self::PasswordReset {
                email,
                timestamp,
                reset_url,
            } => json!({
                "email": email,
                "timestamp": timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
                "resetUrl": reset_url,
            }),
        }
    }
}

/// What happened to a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The receiver accepted it.
    Sent,
    /// No endpoint is configured for this kind.
    Skipped,
}

/// Errors that can occur while delivering a notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The receiver did not answer within the timeout.
    #[error("notification timed out")]
    Timeout,

    /// Transport failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The receiver answered with a non-success status.
    #[error("receiver returned status {status}: {body}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },
}

/// Something that can deliver notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers one notification.
    async fn notify(&self, notification: &Notification) -> Result<Delivery, NotifyError>;
}

/// Notifier that drops everything. Used when no webhooks are configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify(&self, _notification: &Notification) -> Result<Delivery, NotifyError> {
        Ok(Delivery::Skipped)
    }
}

/// Sends `notification` in the background. Failures are logged, never returned.
pub fn dispatch_best_effort(
    notifier: Arc<dyn Notifier>,
    notification: Notification,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let kind = notification.kind();
        match notifier.notify(&notification).await {
            Ok(Delivery::Sent) => debug!(kind, "Notification delivered"),
            Ok(Delivery::Skipped) => debug!(kind, "Notification skipped, no endpoint configured"),
            Err(e) => warn!(kind, error = %e, "Notification failed (non-critical)"),
        }
    })
}
