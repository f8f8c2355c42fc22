//! Webhook delivery over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use debttracker_shared::config::NotificationConfig;
use tracing::instrument;

use super::{Delivery, Notification, Notifier, NotifyError};

const MAX_ERROR_BODY: usize = 512;

/// Posts notifications as JSON to per-kind webhook URLs.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    registration_url: Option<String>,
    password_reset_url: Option<String>,
}

impl WebhookNotifier {
    /// Creates a notifier from configuration.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError::Http` if the HTTP client cannot be built.
    pub fn new(config: &NotificationConfig) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            registration_url: non_blank(config.registration_webhook_url.as_deref()),
            password_reset_url: non_blank(config.password_reset_webhook_url.as_deref()),
        })
    }

    fn url_for(&self, notification: &Notification) -> Option<&str> {
        match notification {
            Notification::UserRegistered { .. } => self.registration_url.as_deref(),
            Notification::PasswordReset { .. } => self.password_reset_url.as_deref(),
        }
    }
}

fn non_blank(url: Option<&str>) -> Option<String> {
    url.map(str::trim)
        .filter(|u| !u.is_empty())
        .map(ToString::to_string)
}

#[async_trait]
impl Notifier for WebhookNotifier {
    #[instrument(skip(self, notification), fields(kind = notification.kind()))]
    async fn notify(&self, notification: &Notification) -> Result<Delivery, NotifyError> {
        let Some(url) = self.url_for(notification) else {
            return Ok(Delivery::Skipped);
        };

        let response = self
            .client
            .post(url)
            .json(&notification.payload())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    NotifyError::Timeout
                } else {
                    NotifyError::Http(e)
                }
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(Delivery::Sent);
        }

        let mut body = response.text().await.unwrap_or_default();
        if body.len() > MAX_ERROR_BODY {
            let mut cut = MAX_ERROR_BODY;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            body.truncate(cut);
        }
        Err(NotifyError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use uuid::Uuid;

    fn registered() -> Notification {
        Notification::UserRegistered {
            uid: Uuid::new_v4(),
            email: "ana@example.com".into(),
            created_at: Utc::now(),
        }
    }

    fn config(url: Option<String>, timeout_secs: u64) -> NotificationConfig {
        NotificationConfig {
            registration_webhook_url: url,
            password_reset_webhook_url: None,
            timeout_secs,
        }
    }

    /// Serves one canned HTTP response, returning the base URL.
    async fn one_shot_server(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let _ = socket.read(&mut buf).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });
        format!("http://{addr}/hook")
    }

    #[tokio::test]
    async fn test_unconfigured_url_is_skipped() {
        let notifier = WebhookNotifier::new(&config(Some("   ".into()), 10)).unwrap();
        assert_eq!(notifier.notify(&registered()).await.unwrap(), Delivery::Skipped);
    }

    #[tokio::test]
    async fn test_success_status_is_sent() {
        let url =
            one_shot_server("HTTP/1.1 200 OK\r\ncontent-length: 2\r\nconnection: close\r\n\r\nok")
                .await;
        let notifier = WebhookNotifier::new(&config(Some(url), 5)).unwrap();

        assert_eq!(notifier.notify(&registered()).await.unwrap(), Delivery::Sent);
    }

    #[tokio::test]
    async fn test_error_status_is_rejected() {
        let url = one_shot_server(
            "HTTP/1.1 502 Bad Gateway\r\ncontent-length: 4\r\nconnection: close\r\n\r\ndown",
        )
        .await;
        let notifier = WebhookNotifier::new(&config(Some(url), 5)).unwrap();

        let err = notifier.notify(&registered()).await.unwrap_err();
        assert!(matches!(err, NotifyError::Rejected { status: 502, ref body } if body == "down"));
    }

    #[tokio::test]
    async fn test_silent_receiver_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });
        let notifier =
            WebhookNotifier::new(&config(Some(format!("http://{addr}/hook")), 1)).unwrap();

        let err = notifier.notify(&registered()).await.unwrap_err();
        assert!(matches!(err, NotifyError::Timeout));
    }
}
