//! Notifier trait definition and shared error types.

/// Errors that can occur during notification delivery.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Delivery failed: {0}")]
    Delivery(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// A rendered chat message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SlackMessage {
    pub text: String,
    pub channel: String,
    pub username: String,
    #[serde(rename = "icon_emoji")]
    pub icon: String,
}

/// Trait for notification channel implementations.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a message through this channel.
    async fn send(&self, message: &SlackMessage) -> Result<(), NotifyError>;

    /// Human-readable name for this channel (e.g., "slack").
    fn channel_name(&self) -> &str;
}
