//! Notification engine for stale-dataset alerts.
//!
//! This crate provides:
//! - `Notifier` trait for pluggable delivery channels
//! - Slack incoming-webhook notifier implementation
//! - Message composition for newly-stale and operator-failure alerts
//! - Router that fans alerts out to the main, publisher, and operator channels

pub mod compose;
pub mod router;
pub mod slack;
pub mod traits;

pub use router::AlertRouter;
pub use slack::SlackNotifier;
pub use traits::{Notifier, NotifyError, SlackMessage};
