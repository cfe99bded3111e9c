mod cli;
mod report;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing::{error, warn};

use pocketwatch_catalog::CatalogClient;
use pocketwatch_core::config::{load_dotenv, Config};
use pocketwatch_core::scan::{ScanOptions, StalenessScanner};
use pocketwatch_core::snapshot;
use pocketwatch_notify::{compose, AlertRouter, Notifier, SlackNotifier};

use crate::cli::CliArgs;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    load_dotenv();
    let args = CliArgs::parse();
    let config = Config::from_env();
    config.log_summary();

    if let Err(e) = run(&args, &config).await {
        let chain = cause_chain(&e);
        error!("scan failed: {chain}");
        // Operator failure reports go out even under --mute-alerts; the
        // flag only silences the newly-stale announcements.
        if let Some(webhook_url) = &config.slack.webhook_url {
            match SlackNotifier::new(webhook_url.clone()) {
                Ok(notifier) => report_failure(&notifier, &args, &config, &chain).await,
                Err(build_err) => {
                    error!("cannot build Slack notifier for failure report: {build_err}")
                }
            }
        }
        std::process::exit(1);
    }
}

async fn run(args: &CliArgs, config: &Config) -> Result<()> {
    let host = args.host.as_deref().unwrap_or(&config.portal.host);
    let client = CatalogClient::new(host);

    if args.skip_health_check {
        warn!("skipping portal health check");
    } else {
        client
            .check_health()
            .await
            .context("portal health check failed")?;
    }

    let records = client
        .fetch_packages()
        .await
        .context("unable to get the package list")?;

    let scanner = StalenessScanner::standard(host);
    let now = Utc::now().naive_utc();
    let scan_report = scanner
        .scan(
            &records,
            now,
            ScanOptions {
                include_private: args.include_private,
            },
        )
        .context("staleness scan aborted")?;

    report::print_report(&scan_report);

    let snapshot_path = args
        .snapshot
        .clone()
        .unwrap_or_else(|| config.snapshot.path.clone());
    let previous = snapshot::load(&snapshot_path)
        .with_context(|| format!("failed to load snapshot {}", snapshot_path.display()))?;
    let newly = snapshot::newly_stale(&previous, &scan_report.stale);

    // Persist before announcing: a failed Slack delivery must not replay the
    // same datasets as newly stale on the next pass.
    snapshot::store(&snapshot_path, &snapshot::to_snapshot(&scan_report.stale))
        .with_context(|| format!("failed to persist snapshot {}", snapshot_path.display()))?;

    if let Some((printable, _)) = compose::newly_stale_messages(&newly) {
        println!("{printable}");
        if args.mute_alerts {
            println!("[Slack alerts are muted.]");
        } else if let Some(webhook_url) = &config.slack.webhook_url {
            let notifier = SlackNotifier::new(webhook_url.clone())?;
            let router = AlertRouter::new(
                &notifier,
                &config.slack,
                &config.portal.owned_dataset_ids,
                args.test_mode,
            );
            router
                .announce_newly_stale(&newly)
                .await
                .context("failed to deliver newly-stale alert")?;
        } else {
            warn!("no Slack webhook configured; alerts printed only");
        }
    }

    Ok(())
}

/// Flatten an anyhow error into a "caused by" chain for the operator report.
fn cause_chain(error: &anyhow::Error) -> String {
    let mut chain = String::new();
    for (i, cause) in error.chain().enumerate() {
        if i == 0 {
            chain.push_str(&cause.to_string());
        } else {
            chain.push_str(&format!("\ncaused by: {cause}"));
        }
    }
    chain
}

/// Best-effort delivery of a fatal error to the operator channel. Failures
/// here are logged, never escalated — the pass already failed. Not gated on
/// --mute-alerts: muting covers the newly-stale announcements only.
async fn report_failure<N: Notifier>(notifier: &N, args: &CliArgs, config: &Config, chain: &str) {
    let router = AlertRouter::new(
        notifier,
        &config.slack,
        &config.portal.owned_dataset_ids,
        args.test_mode,
    );
    if let Err(e) = router.report_failure(chain).await {
        error!("failed to deliver failure report: {e}");
    }
}
