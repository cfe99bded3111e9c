//! Routes composed alerts to the right channels.

use tracing::info;

use pocketwatch_core::config::SlackConfig;
use pocketwatch_core::types::StalenessRecord;

use crate::compose;
use crate::traits::{Notifier, NotifyError, SlackMessage};

/// Fans newly-stale and failure alerts out to the configured channels.
///
/// In test mode every message is redirected to the test channel so a dry
/// run never pings real subscribers.
pub struct AlertRouter<'a, N: Notifier> {
    notifier: &'a N,
    slack: &'a SlackConfig,
    /// Dataset ids the portal itself maintains; excluded from
    /// publisher-scoped alerts.
    portal_owned_ids: &'a [String],
    test_mode: bool,
}

impl<'a, N: Notifier> AlertRouter<'a, N> {
    pub fn new(
        notifier: &'a N,
        slack: &'a SlackConfig,
        portal_owned_ids: &'a [String],
        test_mode: bool,
    ) -> Self {
        Self {
            notifier,
            slack,
            portal_owned_ids,
            test_mode,
        }
    }

    fn channel_for(&self, wanted: &str) -> String {
        if self.test_mode {
            self.slack.test_channel.clone()
        } else {
            wanted.to_string()
        }
    }

    fn message(&self, text: String, channel: &str) -> SlackMessage {
        SlackMessage {
            text,
            channel: self.channel_for(channel),
            username: self.slack.username.clone(),
            icon: self.slack.icon.clone(),
        }
    }

    /// Send the aggregate newly-stale alert, then publisher-scoped alerts
    /// for each configured publisher channel. No-op when nothing is newly
    /// stale.
    pub async fn announce_newly_stale(
        &self,
        newly: &[&StalenessRecord],
    ) -> Result<(), NotifyError> {
        let Some((_, slack_text)) = compose::newly_stale_messages(newly) else {
            return Ok(());
        };

        self.notifier
            .send(&self.message(slack_text, &self.slack.channel))
            .await?;

        for (publisher, channel) in &self.slack.publisher_channels {
            let theirs: Vec<&StalenessRecord> = newly
                .iter()
                .copied()
                .filter(|r| {
                    r.publisher == *publisher
                        && !self.portal_owned_ids.contains(&r.id)
                })
                .collect();
            if theirs.is_empty() {
                continue;
            }
            info!(publisher = %publisher, count = theirs.len(), "publisher-scoped alert");
            self.notifier
                .send(&self.message(compose::publisher_message(&theirs), channel))
                .await?;
        }

        Ok(())
    }

    /// Deliver a fatal-failure report to the operator-only channel.
    pub async fn report_failure(&self, cause_chain: &str) -> Result<(), NotifyError> {
        let text = compose::failure_report(cause_chain);
        self.notifier
            .send(&self.message(text, &self.slack.operator_channel))
            .await
    }
}
