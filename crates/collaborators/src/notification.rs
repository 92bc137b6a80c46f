//! Notification collaborator.

use async_trait::async_trait;
use tracing::info;

use crate::error::CollaboratorError;

/// Which channel a report should be sent over — lets `email` and `slack`
/// node types route through a single `SendReport` operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyChannel {
    Email,
    Slack,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_report(
        &self,
        channel: NotifyChannel,
        recipient: &str,
        target: &str,
        status: &str,
        report_body: &str,
    ) -> Result<(), CollaboratorError>;
}

/// Real implementation: posts to a Slack incoming-webhook URL, or to a
/// transactional-email HTTP endpoint, configured via environment variables.
#[derive(Debug, Default, Clone)]
pub struct HttpNotifier {
    client: reqwest::Client,
}

impl HttpNotifier {
    pub fn new() -> Self {
        Self { client: reqwest::Client::new() }
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn send_report(
        &self,
        channel: NotifyChannel,
        recipient: &str,
        target: &str,
        status: &str,
        report_body: &str,
    ) -> Result<(), CollaboratorError> {
        if recipient.trim().is_empty() {
            return Err(CollaboratorError::UnknownRecipient(recipient.to_string()));
        }

        match channel {
            NotifyChannel::Slack => {
                let webhook_url = std::env::var("SLACK_WEBHOOK_URL")
                    .map_err(|_| CollaboratorError::Notification("SLACK_WEBHOOK_URL not set".into()))?;

                let payload = serde_json::json!({
                    "channel": recipient,
                    "text": format!("Scan of {target} — status: {status}\n\n{report_body}"),
                });

                let response = self
                    .client
                    .post(&webhook_url)
                    .json(&payload)
                    .send()
                    .await
                    .map_err(|e| CollaboratorError::Notification(e.to_string()))?;

                if !response.status().is_success() {
                    return Err(CollaboratorError::Notification(format!(
                        "slack webhook returned {}",
                        response.status()
                    )));
                }
            }
            NotifyChannel::Email => {
                let api_url = std::env::var("NOTIFICATION_EMAIL_API_URL")
                    .map_err(|_| CollaboratorError::Notification("NOTIFICATION_EMAIL_API_URL not set".into()))?;

                let payload = serde_json::json!({
                    "to": recipient,
                    "subject": format!("Scan report for {target} — {status}"),
                    "body": report_body,
                });

                let response = self
                    .client
                    .post(&api_url)
                    .json(&payload)
                    .send()
                    .await
                    .map_err(|e| CollaboratorError::Notification(e.to_string()))?;

                if !response.status().is_success() {
                    return Err(CollaboratorError::Notification(format!(
                        "email API returned {}",
                        response.status()
                    )));
                }
            }
        }

        info!(recipient, target, status, "report delivered");
        Ok(())
    }
}
