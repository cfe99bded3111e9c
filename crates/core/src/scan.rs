//! One batch pass over the catalog: resolve schedules, compute both lateness
//! tracks per dataset, and accumulate the current stale set.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use tracing::{debug, warn};

use crate::calendar::GapCalendar;
use crate::classify::classify;
use crate::error::CoreError;
use crate::lateness::{ExtensionRegistry, LatenessCalculator};
use crate::metadata::{self, DataQualityIssue};
use crate::schedule::ScheduleCatalog;
use crate::types::{DatasetRecord, StalenessRecord};

#[derive(Debug, Clone, Copy, Default)]
pub struct ScanOptions {
    /// Include private datasets in the pass. Their titles carry a marker
    /// so downstream reports can tell.
    pub include_private: bool,
}

/// Everything one pass produced, in catalog order.
#[derive(Debug, Default)]
pub struct ScanReport {
    pub stale: Vec<StalenessRecord>,
    pub total_packages: usize,
    /// Datasets with a resolvable period. Non-period labels are excluded
    /// from both sides of the "stale out of N" ratio.
    pub packages_with_frequencies: usize,
    /// Within-grace call-outs for the standard report stream.
    pub grace_notes: Vec<String>,
    pub data_quality_issues: Vec<DataQualityIssue>,
}

impl ScanReport {
    pub fn stale_count(&self) -> usize {
        self.stale.len()
    }
}

/// Single-threaded scanner over a fetched catalog snapshot.
pub struct StalenessScanner {
    schedules: ScheduleCatalog,
    calendar: GapCalendar,
    extensions: ExtensionRegistry,
    portal_host: String,
}

impl StalenessScanner {
    pub fn new(
        schedules: ScheduleCatalog,
        calendar: GapCalendar,
        extensions: ExtensionRegistry,
        portal_host: impl Into<String>,
    ) -> Self {
        Self {
            schedules,
            calendar,
            extensions,
            portal_host: portal_host.into(),
        }
    }

    /// Scanner with the portal's standard tables.
    pub fn standard(portal_host: impl Into<String>) -> Self {
        Self::new(
            ScheduleCatalog::standard(),
            GapCalendar::new(),
            ExtensionRegistry::with_static_fallbacks(),
            portal_host,
        )
    }

    /// Run one pass. An unrecognized frequency label aborts the whole pass;
    /// that is a metadata error an operator must fix, not a per-dataset
    /// warning.
    pub fn scan(
        &self,
        records: &[DatasetRecord],
        now: NaiveDateTime,
        options: ScanOptions,
    ) -> Result<ScanReport, CoreError> {
        let calculator = LatenessCalculator::new(&self.calendar, &self.extensions);
        let mut report = ScanReport {
            total_packages: records.len(),
            ..ScanReport::default()
        };

        for record in records {
            let Some(frequency) = record.frequency_publishing.as_deref() else {
                continue;
            };
            if record.private && !options.include_private {
                debug!(dataset = %record.id, "skipping private dataset");
                continue;
            }

            let period = self
                .schedules
                .resolve(frequency)
                .map_err(|source| CoreError::Schedule {
                    title: record.title.clone(),
                    source,
                })?;
            let Some(period) = period else {
                // "As Needed" and friends: no schedule applies.
                continue;
            };
            report.packages_with_frequencies += 1;

            let (rules, gap_issue) = metadata::gap_rules(record);
            let (metadata_ext, ext_issue) = metadata::extension(record);
            report.data_quality_issues.extend(gap_issue);
            report.data_quality_issues.extend(ext_issue);

            let administrative = calculator.compute(
                now,
                record.metadata_modified,
                period,
                &record.id,
                &record.title,
                &rules,
                metadata_ext.as_ref(),
            );
            if let Some(note) = &administrative.grace_note {
                report.grace_notes.push(note.clone());
            }

            // Content track: coverage end + 1 day, same gap rules as the
            // administrative track.
            let coverage_end = metadata::temporal_coverage_end(record);
            let content = match coverage_end.as_deref() {
                Some(end) => match NaiveDate::parse_from_str(end, "%Y-%m-%d") {
                    Ok(date) => {
                        let reference =
                            date.and_hms_opt(0, 0, 0).unwrap_or_default() + Duration::days(1);
                        let lateness = calculator.compute(
                            now,
                            reference,
                            period,
                            &record.id,
                            &record.title,
                            &rules,
                            metadata_ext.as_ref(),
                        );
                        if let Some(note) = &lateness.grace_note {
                            report.grace_notes.push(note.clone());
                        }
                        Some((end.to_string(), lateness))
                    }
                    Err(e) => {
                        warn!(dataset = %record.id, end = %end, error = %e,
                            "unparseable temporal coverage end");
                        report.data_quality_issues.push(DataQualityIssue {
                            dataset_id: record.id.clone(),
                            message: format!(
                                "{}: unparseable temporal coverage end {end:?}",
                                record.title
                            ),
                        });
                        None
                    }
                },
                None => None,
            };

            let content_ref = content.as_ref().map(|(end, l)| (end.as_str(), l));
            if let Some(verdict) = classify(
                record,
                frequency,
                period,
                &administrative,
                content_ref,
                &self.portal_host,
            ) {
                debug!(dataset = %record.id, cycles_late = verdict.cycles_late, "stale dataset");
                report.stale.push(verdict);
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn record(id: &str, frequency: Option<&str>, modified: &str) -> DatasetRecord {
        DatasetRecord {
            id: id.to_string(),
            name: format!("{id}-slug"),
            title: format!("Dataset {id}"),
            publisher: "Org".to_string(),
            frequency_publishing: frequency.map(String::from),
            frequency_data_change: String::new(),
            metadata_modified: dt(modified),
            temporal_coverage: None,
            private: false,
            tags: vec![],
            resource_names: vec![],
            extras: vec![],
        }
    }

    fn scanner() -> StalenessScanner {
        StalenessScanner::standard("portal.test")
    }

    const NOW: &str = "2026-08-25 12:00:00";

    #[test]
    fn fresh_catalog_produces_no_stale_records() {
        let records = vec![
            record("a", Some("Weekly"), "2026-08-24 12:00:00"),
            record("b", Some("Monthly"), "2026-08-20 12:00:00"),
        ];
        let report = scanner().scan(&records, dt(NOW), ScanOptions::default()).unwrap();
        assert!(report.stale.is_empty());
        assert_eq!(report.total_packages, 2);
        assert_eq!(report.packages_with_frequencies, 2);
    }

    #[test]
    fn overdue_weekly_dataset_is_flagged() {
        let records = vec![record("a", Some("Weekly"), "2026-08-01 12:00:00")];
        let report = scanner().scan(&records, dt(NOW), ScanOptions::default()).unwrap();
        assert_eq!(report.stale_count(), 1);
        let sp = &report.stale[0];
        assert_eq!(sp.id, "a");
        // 24 days since modification, 7-day cycle: 17 days over.
        assert!((sp.cycles_late - 17.0 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn records_without_frequency_field_are_skipped() {
        let records = vec![record("a", None, "2020-01-01 00:00:00")];
        let report = scanner().scan(&records, dt(NOW), ScanOptions::default()).unwrap();
        assert!(report.stale.is_empty());
        assert_eq!(report.packages_with_frequencies, 0);
        assert_eq!(report.total_packages, 1);
    }

    #[test]
    fn non_period_labels_are_excluded_from_the_ratio() {
        let records = vec![
            record("a", Some("As Needed"), "2020-01-01 00:00:00"),
            record("b", Some(""), "2020-01-01 00:00:00"),
            record("c", Some("Not Updated (Historical Only)"), "2020-01-01 00:00:00"),
            record("d", Some("Daily"), "2026-08-25 06:00:00"),
        ];
        let report = scanner().scan(&records, dt(NOW), ScanOptions::default()).unwrap();
        assert_eq!(report.packages_with_frequencies, 1);
        assert!(report.stale.is_empty());
    }

    #[test]
    fn unknown_frequency_aborts_the_pass() {
        let records = vec![
            record("a", Some("Weekly"), "2026-08-24 12:00:00"),
            record("b", Some("Whenever I feel like it"), "2026-08-24 12:00:00"),
        ];
        let err = scanner()
            .scan(&records, dt(NOW), ScanOptions::default())
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Dataset b"));
        assert!(msg.contains("Whenever I feel like it"));
    }

    #[test]
    fn private_datasets_skipped_unless_included() {
        let mut stale_private = record("p", Some("Weekly"), "2026-08-01 12:00:00");
        stale_private.private = true;
        let records = vec![stale_private];

        let excluded = scanner().scan(&records, dt(NOW), ScanOptions::default()).unwrap();
        assert!(excluded.stale.is_empty());
        assert_eq!(excluded.packages_with_frequencies, 0);

        let included = scanner()
            .scan(
                &records,
                dt(NOW),
                ScanOptions {
                    include_private: true,
                },
            )
            .unwrap();
        assert_eq!(included.stale_count(), 1);
        assert!(included.stale[0].title.starts_with("(private) "));
    }

    #[test]
    fn content_track_flags_double_stale() {
        let mut r = record("a", Some("Daily"), "2026-08-20 12:00:00");
        r.extras.push(("time_field".to_string(), "date".to_string()));
        r.temporal_coverage = Some("2020-01-01/2026-08-20".to_string());
        let report = scanner().scan(&[r], dt(NOW), ScanOptions::default()).unwrap();
        assert_eq!(report.stale_count(), 1);
        let sp = &report.stale[0];
        assert!(sp.cycles_late > 0.0);
        assert!(sp.data_cycles_late.unwrap() > 0.0);
        assert_eq!(sp.temporal_coverage_end.as_deref(), Some("2026-08-20"));
        assert!(sp.explanation.contains("DOUBLE STALE"));
    }

    #[test]
    fn unparseable_coverage_end_degrades_to_admin_track() {
        let mut r = record("a", Some("Daily"), "2026-08-20 12:00:00");
        r.extras.push(("time_field".to_string(), "date".to_string()));
        r.temporal_coverage = Some("2020-01-01/last tuesday".to_string());
        let report = scanner().scan(&[r], dt(NOW), ScanOptions::default()).unwrap();
        assert_eq!(report.stale_count(), 1);
        assert!(report.stale[0].data_cycles_late.is_none());
        assert_eq!(report.data_quality_issues.len(), 1);
    }

    #[test]
    fn malformed_gap_blob_degrades_not_aborts() {
        let mut r = record("a", Some("Weekly"), "2026-08-24 12:00:00");
        r.extras.push(("no_updates_on".to_string(), "{not json".to_string()));
        let report = scanner().scan(&[r], dt(NOW), ScanOptions::default()).unwrap();
        assert!(report.stale.is_empty());
        assert_eq!(report.data_quality_issues.len(), 1);
    }

    #[test]
    fn grace_note_is_collected_and_dataset_not_stale() {
        // Registered fallback dataset with raw lateness inside its one-day
        // grace window.
        let mut r = record(
            "d15ca172-66df-4508-8562-5ec54498cfd4",
            Some("Daily"),
            "2026-08-24 00:00:00",
        );
        r.title = "Allegheny County Jail Daily Census".to_string();
        let report = scanner().scan(&[r], dt(NOW), ScanOptions::default()).unwrap();
        assert!(report.stale.is_empty());
        assert_eq!(report.grace_notes.len(), 1);
        assert!(report.grace_notes[0].contains("Jail"));
    }
}
