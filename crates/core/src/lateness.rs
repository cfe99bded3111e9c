//! Lateness calculator — the signed-duration core of the staleness check.
//!
//! Lateness is measured from a reference timestamp (metadata-modified for the
//! administrative track, coverage-end + 1 day for the content track) against
//! "now", after the reference has been advanced past any declared gap dates.
//! Positive means overdue.

use chrono::{Duration, NaiveDateTime};
use std::collections::HashMap;

use crate::calendar::{GapCalendar, GapRule};
use crate::types::DatasetId;

/// Per-dataset grace descriptor. Some ETL jobs legitimately run a day behind
/// their source (e.g. an upstream FTP drop that is sometimes skipped), so a
/// tolerance is subtracted from raw lateness before the verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension {
    pub title: Option<String>,
    pub extra_time: Duration,
}

/// Injectable mapping from dataset id to grace extension.
///
/// Metadata-sourced extensions take precedence at the call site; this
/// registry is the static fallback layer.
#[derive(Debug, Clone, Default)]
pub struct ExtensionRegistry {
    entries: HashMap<DatasetId, Extension>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The known datasets whose ETL jobs run a day behind their source.
    pub fn with_static_fallbacks() -> Self {
        let mut registry = Self::new();
        registry.insert(
            "d15ca172-66df-4508-8562-5ec54498cfd4".to_string(),
            Extension {
                title: Some("Allegheny County Jail Daily Census".to_string()),
                extra_time: Duration::days(1),
            },
        );
        registry.insert(
            "046e5b6a-0f90-4f8e-8c16-14057fd8872e".to_string(),
            Extension {
                title: Some("Police Incident Blotter (30 Day)".to_string()),
                extra_time: Duration::days(1),
            },
        );
        registry
    }

    pub fn insert(&mut self, id: DatasetId, extension: Extension) {
        self.entries.insert(id, extension);
    }

    pub fn get(&self, id: &str) -> Option<&Extension> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Outcome of one lateness computation.
#[derive(Debug, Clone)]
pub struct Lateness {
    /// Signed lateness; positive = overdue.
    pub amount: Duration,
    /// Set when the dataset crossed its due date but is still inside its
    /// grace window. Reported in the standard stream, not a stale verdict.
    pub grace_note: Option<String>,
}

impl Lateness {
    pub fn is_overdue(&self) -> bool {
        self.amount > Duration::zero()
    }

    /// Lateness expressed in nominal schedule cycles. Fractional, unclamped.
    pub fn cycles(&self, period: Duration) -> f64 {
        self.amount.num_seconds() as f64 / period.num_seconds() as f64
    }

    pub fn days(&self) -> f64 {
        self.amount.num_seconds() as f64 / 86_400.0
    }
}

/// Computes gap-aware, grace-adjusted lateness for one reference timestamp.
pub struct LatenessCalculator<'a> {
    calendar: &'a GapCalendar,
    extensions: &'a ExtensionRegistry,
}

impl<'a> LatenessCalculator<'a> {
    pub fn new(calendar: &'a GapCalendar, extensions: &'a ExtensionRegistry) -> Self {
        Self {
            calendar,
            extensions,
        }
    }

    /// Compute signed lateness for one track.
    ///
    /// `metadata_extension` is the extension parsed from the dataset's own
    /// metadata; it wins over the registry's static fallback entry.
    pub fn compute(
        &self,
        now: NaiveDateTime,
        reference: NaiveDateTime,
        period: Duration,
        dataset_id: &str,
        title: &str,
        rules: &[GapRule],
        metadata_extension: Option<&Extension>,
    ) -> Lateness {
        let adjusted = self.calendar.advance_past_gaps(reference, rules);
        let mut amount = now - (adjusted + period);

        // "yesterday": updates reflect the prior day's data, so a one-day
        // buffer is always expected once the due date has passed.
        if amount > Duration::zero() && rules.contains(&GapRule::DayLagBuffer) {
            amount = amount - Duration::days(1);
        }

        let mut grace_note = None;
        let extension = metadata_extension.or_else(|| self.extensions.get(dataset_id));
        if let Some(extension) = extension {
            if amount > Duration::zero() && amount < extension.extra_time {
                let display = extension.title.as_deref().unwrap_or(title);
                grace_note = Some(format!(
                    "{} is technically stale ({:.2} cycles late) but gets a pass: \
                     the next run should fill the gap.",
                    display,
                    amount.num_seconds() as f64 / period.num_seconds() as f64,
                ));
            }
            // Subtracted unconditionally for registered datasets: a barely
            // late crossing reads as slightly negative, while a dataset far
            // past even its grace window reads correspondingly more positive.
            amount = amount - extension.extra_time;
        }

        Lateness { amount, grace_note }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn calc_parts() -> (GapCalendar, ExtensionRegistry) {
        (GapCalendar::new(), ExtensionRegistry::new())
    }

    #[test]
    fn on_schedule_dataset_is_not_overdue() {
        let (cal, reg) = calc_parts();
        let calc = LatenessCalculator::new(&cal, &reg);
        let lateness = calc.compute(
            dt("2026-08-25 12:00:00"),
            dt("2026-08-20 12:00:00"),
            Duration::days(7),
            "id",
            "Title",
            &[],
            None,
        );
        assert!(!lateness.is_overdue());
        assert_eq!(lateness.amount, Duration::days(-2));
    }

    #[test]
    fn weekly_dataset_one_cycle_plus_epsilon_late() {
        let (cal, reg) = calc_parts();
        let calc = LatenessCalculator::new(&cal, &reg);
        // Last modified exactly 7 days + 6 hours before now.
        let lateness = calc.compute(
            dt("2026-08-25 12:00:00"),
            dt("2026-08-18 06:00:00"),
            Duration::days(7),
            "id",
            "Title",
            &[],
            None,
        );
        assert!(lateness.is_overdue());
        assert_eq!(lateness.amount, Duration::hours(6));
        let cycles = lateness.cycles(Duration::days(7));
        assert!((cycles - 6.0 / (7.0 * 24.0)).abs() < 1e-9);
    }

    #[test]
    fn weekend_gap_delays_due_date() {
        let (cal, reg) = calc_parts();
        let calc = LatenessCalculator::new(&cal, &reg);
        // Daily dataset whose reference lands on Saturday morning. With the
        // weekend gap the reference rolls to Monday, pushing the due moment
        // to Tuesday morning.
        let rules = ["weekends".parse::<GapRule>().unwrap()];
        let tuesday_early = calc.compute(
            dt("2026-08-25 00:00:00"),
            dt("2026-08-22 06:00:00"),
            Duration::days(1),
            "id",
            "Title",
            &rules,
            None,
        );
        assert!(!tuesday_early.is_overdue());

        // Without the gap rule the same dataset is well overdue.
        let without = calc.compute(
            dt("2026-08-25 00:00:00"),
            dt("2026-08-22 06:00:00"),
            Duration::days(1),
            "id",
            "Title",
            &[],
            None,
        );
        assert!(without.is_overdue());
    }

    #[test]
    fn gap_adjustment_starts_from_reference_date() {
        let (cal, reg) = calc_parts();
        let calc = LatenessCalculator::new(&cal, &reg);
        // Reference lands on a Saturday, rolls to Monday before the period
        // is added.
        let rules = [GapRule::SpecificWeekday(Weekday::Sat), GapRule::SpecificWeekday(Weekday::Sun)];
        let lateness = calc.compute(
            dt("2026-08-31 06:00:00"),
            dt("2026-08-22 06:00:00"),
            Duration::days(7),
            "id",
            "Title",
            &rules,
            None,
        );
        // Adjusted reference = Mon 2026-08-24 06:00, due 08-31 06:00.
        assert_eq!(lateness.amount, Duration::zero());
        assert!(!lateness.is_overdue());
    }

    #[test]
    fn day_lag_buffer_subtracts_one_day_from_positive_lateness() {
        let (cal, reg) = calc_parts();
        let calc = LatenessCalculator::new(&cal, &reg);
        let rules = [GapRule::DayLagBuffer];
        let lateness = calc.compute(
            dt("2026-08-25 12:00:00"),
            dt("2026-08-23 00:00:00"),
            Duration::days(1),
            "id",
            "Title",
            &rules,
            None,
        );
        // Raw lateness 36h, minus the one-day buffer.
        assert_eq!(lateness.amount, Duration::hours(12));
    }

    #[test]
    fn day_lag_buffer_leaves_non_positive_lateness_alone() {
        let (cal, reg) = calc_parts();
        let calc = LatenessCalculator::new(&cal, &reg);
        let rules = [GapRule::DayLagBuffer];
        let lateness = calc.compute(
            dt("2026-08-25 12:00:00"),
            dt("2026-08-25 00:00:00"),
            Duration::days(1),
            "id",
            "Title",
            &rules,
            None,
        );
        assert_eq!(lateness.amount, Duration::hours(-12));
    }

    #[test]
    fn grace_window_reports_note_and_goes_negative() {
        let cal = GapCalendar::new();
        let mut reg = ExtensionRegistry::new();
        reg.insert(
            "jail".to_string(),
            Extension {
                title: Some("Jail Census".to_string()),
                extra_time: Duration::days(1),
            },
        );
        let calc = LatenessCalculator::new(&cal, &reg);
        // Raw lateness 12h, grace 24h: within grace, final reads -12h.
        let lateness = calc.compute(
            dt("2026-08-25 12:00:00"),
            dt("2026-08-24 00:00:00"),
            Duration::days(1),
            "jail",
            "fallback title",
            &[],
            None,
        );
        assert!(!lateness.is_overdue());
        assert_eq!(lateness.amount, Duration::hours(-12));
        assert!(lateness.grace_note.unwrap().contains("Jail Census"));
    }

    #[test]
    fn past_grace_window_stays_positive_without_note() {
        let cal = GapCalendar::new();
        let mut reg = ExtensionRegistry::new();
        reg.insert(
            "jail".to_string(),
            Extension {
                title: None,
                extra_time: Duration::days(1),
            },
        );
        let calc = LatenessCalculator::new(&cal, &reg);
        // Raw lateness 3 days, grace 1 day: still 2 days overdue.
        let lateness = calc.compute(
            dt("2026-08-25 00:00:00"),
            dt("2026-08-21 00:00:00"),
            Duration::days(1),
            "jail",
            "Title",
            &[],
            None,
        );
        assert!(lateness.is_overdue());
        assert_eq!(lateness.amount, Duration::days(2));
        assert!(lateness.grace_note.is_none());
    }

    #[test]
    fn metadata_extension_wins_over_registry() {
        let cal = GapCalendar::new();
        let reg = ExtensionRegistry::with_static_fallbacks();
        let calc = LatenessCalculator::new(&cal, &reg);
        let metadata_ext = Extension {
            title: None,
            extra_time: Duration::days(3),
        };
        // Raw lateness 2 days; registry grace for this id is 1 day but the
        // metadata extension of 3 days applies.
        let lateness = calc.compute(
            dt("2026-08-25 00:00:00"),
            dt("2026-08-22 00:00:00"),
            Duration::days(1),
            "d15ca172-66df-4508-8562-5ec54498cfd4",
            "Jail Census",
            &[],
            Some(&metadata_ext),
        );
        assert_eq!(lateness.amount, Duration::days(-1));
        assert!(lateness.grace_note.is_some());
    }

    #[test]
    fn static_fallbacks_are_seeded() {
        let reg = ExtensionRegistry::with_static_fallbacks();
        assert_eq!(reg.len(), 2);
        assert!(reg.get("d15ca172-66df-4508-8562-5ec54498cfd4").is_some());
    }
}
