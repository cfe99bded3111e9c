//! Schedule catalog — maps publishing-frequency labels to nominal cycle
//! durations.
//!
//! The table is immutable configuration handed in at construction so that
//! per-portal variants can coexist and be tested in isolation. Lookup makes
//! three-way distinctions explicit: a real period, a legitimate "no schedule
//! applies" label, or an unknown label (an error the orchestrator treats as
//! fatal for the pass).

use std::collections::HashMap;

use chrono::Duration;

use crate::error::UnknownFrequency;

/// Labels that legitimately carry no schedule. They must not trip the
/// unknown-frequency error and must not be treated as a zero-length period.
const NON_PERIODS: &[&str] = &["", "As Needed", "Not Updated (Historical Only)"];

pub struct ScheduleCatalog {
    periods: HashMap<String, Duration>,
    non_periods: Vec<String>,
}

impl ScheduleCatalog {
    /// Build a catalog from explicit tables.
    pub fn new(periods: HashMap<String, Duration>, non_periods: Vec<String>) -> Self {
        Self {
            periods,
            non_periods,
        }
    }

    /// The portal's standard frequency table.
    pub fn standard() -> Self {
        let periods = HashMap::from([
            ("Annually".to_string(), Duration::days(366)),
            ("Bi-Annually".to_string(), Duration::days(183)),
            ("Quarterly".to_string(), Duration::days(92)),
            ("Bi-Monthly".to_string(), Duration::days(61)),
            ("Monthly".to_string(), Duration::days(31)),
            ("Bi-Weekly".to_string(), Duration::days(14)),
            ("Weekly".to_string(), Duration::days(7)),
            ("Daily".to_string(), Duration::days(1)),
            ("Hourly".to_string(), Duration::hours(1)),
            ("Multiple Times per Hour".to_string(), Duration::minutes(30)),
        ]);
        let non_periods = NON_PERIODS.iter().map(|s| s.to_string()).collect();
        Self::new(periods, non_periods)
    }

    /// Resolve a frequency label.
    ///
    /// - `Ok(Some(period))` — the label has a nominal cycle duration.
    /// - `Ok(None)` — the label declares that no schedule applies.
    /// - `Err(UnknownFrequency)` — metadata error; the caller decides
    ///   whether to abort the pass.
    pub fn resolve(&self, label: &str) -> Result<Option<Duration>, UnknownFrequency> {
        if let Some(period) = self.periods.get(label) {
            return Ok(Some(*period));
        }
        if self.non_periods.iter().any(|n| n == label) {
            return Ok(None);
        }
        Err(UnknownFrequency(label.to_string()))
    }
}

impl Default for ScheduleCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
