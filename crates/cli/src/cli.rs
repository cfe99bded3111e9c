use std::path::PathBuf;

use clap::Parser;

/// Scan the portal catalog for datasets that have missed their declared
/// publishing schedule.
#[derive(Parser, Debug)]
#[command(name = "pocketwatch", version, about)]
pub struct CliArgs {
    /// Suppress newly-stale Slack alerts (operator failure reports still go out)
    #[arg(long, env = "POCKETWATCH_MUTE_ALERTS")]
    pub mute_alerts: bool,

    /// Include private datasets in the pass
    #[arg(long)]
    pub include_private: bool,

    /// Skip the upstream portal health check before fetching
    #[arg(long)]
    pub skip_health_check: bool,

    /// Route every alert to the test channel instead of real subscribers
    #[arg(long)]
    pub test_mode: bool,

    /// Portal host override (default from POCKETWATCH_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Snapshot file override (default from POCKETWATCH_SNAPSHOT_PATH)
    #[arg(long)]
    pub snapshot: Option<PathBuf>,
}
