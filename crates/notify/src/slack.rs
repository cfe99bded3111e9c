//! Slack incoming-webhook notifier.

use crate::traits::{Notifier, NotifyError, SlackMessage};

/// Delivers messages to a Slack incoming webhook.
#[derive(Debug)]
pub struct SlackNotifier {
    webhook_url: String,
    client: reqwest::Client,
}

impl SlackNotifier {
    /// Create a notifier for one webhook URL. An empty URL is a
    /// configuration error.
    pub fn new(webhook_url: impl Into<String>) -> Result<Self, NotifyError> {
        let webhook_url = webhook_url.into();
        if webhook_url.is_empty() {
            return Err(NotifyError::Config(
                "Slack webhook URL must not be empty".to_string(),
            ));
        }
        Ok(Self {
            webhook_url,
            client: reqwest::Client::new(),
        })
    }
}

#[async_trait::async_trait]
impl Notifier for SlackNotifier {
    /// POST the message as JSON to the webhook.
    async fn send(&self, message: &SlackMessage) -> Result<(), NotifyError> {
        tracing::debug!(channel = %message.channel, "sending Slack notification");

        let response = self
            .client
            .post(&self.webhook_url)
            .json(message)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::warn!(%status, body = %body, "Slack webhook returned non-2xx status");
            return Err(NotifyError::Delivery(format!(
                "Slack webhook returned {status}: {body}"
            )));
        }

        tracing::info!(channel = %message.channel, "Slack notification sent");
        Ok(())
    }

    fn channel_name(&self) -> &str {
        "slack"
    }
}
