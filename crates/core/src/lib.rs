pub mod calendar;
pub mod classify;
pub mod config;
pub mod error;
pub mod lateness;
pub mod metadata;
pub mod scan;
pub mod schedule;
pub mod snapshot;
pub mod types;

pub use calendar::{GapCalendar, GapRule};
pub use config::Config;
pub use error::*;
pub use lateness::{Extension, ExtensionRegistry, Lateness, LatenessCalculator};
pub use scan::{ScanOptions, ScanReport, StalenessScanner};
pub use schedule::ScheduleCatalog;
pub use types::*;
