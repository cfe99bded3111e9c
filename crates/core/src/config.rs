use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub portal: PortalConfig,
    pub snapshot: SnapshotConfig,
    pub slack: SlackConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    pub fn from_env() -> Self {
        Self {
            portal: PortalConfig::from_env(),
            snapshot: SnapshotConfig::from_env(),
            slack: SlackConfig::from_env(),
        }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded:");
        tracing::info!("  portal:    host={}", self.portal.host);
        tracing::info!("  snapshot:  path={}", self.snapshot.path.display());
        tracing::info!(
            "  slack:     channel={}, operator={}, webhook={}",
            self.slack.channel,
            self.slack.operator_channel,
            if self.slack.webhook_url.is_some() { "configured" } else { "(none)" },
        );
    }
}

// ── Portal ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    pub host: String,
    /// Dataset ids the portal itself maintains; excluded from
    /// publisher-scoped alerts.
    pub owned_dataset_ids: Vec<String>,
}

impl PortalConfig {
    fn from_env() -> Self {
        Self {
            host: env_or("POCKETWATCH_HOST", "data.wprdc.org"),
            owned_dataset_ids: env_opt("POCKETWATCH_OWNED_IDS")
                .map(|raw| raw.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_else(|| {
                    vec![
                        "22fe57da-f5b8-4c52-90ea-b10591a66f90".to_string(), // Liens
                        "f2141a79-c0b9-4cf9-b4d2-d591b4aaa8e6".to_string(), // Foreclosures
                    ]
                }),
        }
    }
}

// ── Snapshot ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotConfig {
    pub path: PathBuf,
}

impl SnapshotConfig {
    fn from_env() -> Self {
        Self {
            path: PathBuf::from(env_or("POCKETWATCH_SNAPSHOT_PATH", "last_scan.json")),
        }
    }
}

// ── Slack ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlackConfig {
    pub webhook_url: Option<String>,
    pub channel: String,
    pub username: String,
    pub icon: String,
    /// Operator-only channel for fatal pass failures.
    pub operator_channel: String,
    /// Channel that receives everything in test mode.
    pub test_channel: String,
    /// `Publisher=#channel` pairs for publisher-scoped alerts.
    pub publisher_channels: Vec<(String, String)>,
}

impl SlackConfig {
    fn from_env() -> Self {
        Self {
            webhook_url: env_opt("SLACK_WEBHOOK_URL"),
            channel: env_or("SLACK_CHANNEL", "#stale-datasets"),
            username: env_or("SLACK_USERNAME", "pocket watch"),
            icon: env_or("SLACK_ICON", ":illuminati:"),
            operator_channel: env_or("SLACK_OPERATOR_CHANNEL", "@portal-ops"),
            test_channel: env_or("SLACK_TEST_CHANNEL", "#pocketwatch-testing"),
            publisher_channels: parse_publisher_channels(
                &env_or("SLACK_PUBLISHER_CHANNELS", ""),
            ),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.webhook_url.is_some()
    }
}

/// Parse `Publisher=#channel;Other Publisher=#other` pairs. Malformed
/// segments are dropped.
fn parse_publisher_channels(raw: &str) -> Vec<(String, String)> {
    raw.split(';')
        .filter_map(|segment| {
            let (publisher, channel) = segment.split_once('=')?;
            let publisher = publisher.trim();
            let channel = channel.trim();
            if publisher.is_empty() || channel.is_empty() {
                return None;
            }
            Some((publisher.to_string(), channel.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publisher_channels_parse_pairs() {
        let parsed = parse_publisher_channels(
            "Allegheny County=#county-stale-datasets; City of Pittsburgh=#city-alerts",
        );
        assert_eq!(
            parsed,
            vec![
                (
                    "Allegheny County".to_string(),
                    "#county-stale-datasets".to_string()
                ),
                ("City of Pittsburgh".to_string(), "#city-alerts".to_string()),
            ]
        );
    }

    #[test]
    fn publisher_channels_drop_malformed_segments() {
        let parsed = parse_publisher_channels("no-equals-sign;=#channel;Org=");
        assert!(parsed.is_empty());
    }

    #[test]
    fn publisher_channels_empty_input() {
        assert!(parse_publisher_channels("").is_empty());
    }
}
