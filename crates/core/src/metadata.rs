//! Extraction of auxiliary scheduling rules from free-form dataset metadata.
//!
//! CKAN "extras" are untyped key/value strings, so everything here is
//! defensive: a malformed blob degrades the single dataset to defaults
//! ("no gaps", "no extension") and surfaces a data-quality issue instead of
//! aborting the whole pass.

use chrono::Duration;
use serde::Deserialize;
use tracing::warn;

use crate::calendar::GapRule;
use crate::lateness::Extension;
use crate::types::DatasetRecord;

/// Extras key flagging that the dataset's temporal coverage is maintained
/// automatically and its end date can be monitored.
const TIME_FIELD_KEY: &str = "time_field";
/// Extras key holding the JSON array of gap descriptors.
const GAP_RULES_KEY: &str = "no_updates_on";
/// Extras key holding the JSON grace-extension blob.
const EXTENSION_KEY: &str = "stale_extension";

/// A per-dataset metadata problem that was worked around, not fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataQualityIssue {
    pub dataset_id: String,
    pub message: String,
}

/// Declared end of the dataset's data coverage, as a string.
///
/// Only datasets flagged with a `time_field` extra have a temporal coverage
/// that is refreshed automatically; for everything else the field is
/// decorative and must not feed the content lateness track.
pub fn temporal_coverage_end(record: &DatasetRecord) -> Option<String> {
    record.extra(TIME_FIELD_KEY)?;
    let coverage = record.temporal_coverage.as_deref()?;
    let (_start, end) = coverage.split_once('/')?;
    if end.is_empty() {
        return None;
    }
    Some(end.to_string())
}

/// Parse the dataset's gap descriptors.
///
/// Absent key means no gaps. A malformed array or an unrecognized
/// descriptor degrades the whole list to no gaps and reports the issue.
pub fn gap_rules(record: &DatasetRecord) -> (Vec<GapRule>, Option<DataQualityIssue>) {
    let Some(raw) = record.extra(GAP_RULES_KEY) else {
        return (Vec::new(), None);
    };

    let descriptors: Vec<String> = match serde_json::from_str(raw) {
        Ok(d) => d,
        Err(e) => {
            warn!(dataset = %record.id, error = %e, "malformed no_updates_on blob");
            return (
                Vec::new(),
                Some(issue(record, format!("malformed no_updates_on blob: {e}"))),
            );
        }
    };

    let mut rules = Vec::with_capacity(descriptors.len());
    for descriptor in &descriptors {
        match descriptor.parse::<GapRule>() {
            Ok(rule) => rules.push(rule),
            Err(e) => {
                warn!(dataset = %record.id, descriptor = %descriptor, "unrecognized gap descriptor");
                return (Vec::new(), Some(issue(record, e.to_string())));
            }
        }
    }
    (rules, None)
}

#[derive(Debug, Deserialize)]
struct RawExtension {
    extra_time_seconds: i64,
    title: Option<String>,
}

/// Parse a per-dataset grace extension from metadata.
///
/// Wrong shape is a data-quality condition: the dataset proceeds with no
/// extension and the issue is surfaced.
pub fn extension(record: &DatasetRecord) -> (Option<Extension>, Option<DataQualityIssue>) {
    let Some(raw) = record.extra(EXTENSION_KEY) else {
        return (None, None);
    };

    match serde_json::from_str::<RawExtension>(raw) {
        Ok(ext) if ext.extra_time_seconds > 0 => (
            Some(Extension {
                title: ext.title,
                extra_time: Duration::seconds(ext.extra_time_seconds),
            }),
            None,
        ),
        Ok(ext) => (
            None,
            Some(issue(
                record,
                format!(
                    "stale_extension has non-positive extra_time_seconds ({})",
                    ext.extra_time_seconds
                ),
            )),
        ),
        Err(e) => {
            warn!(dataset = %record.id, error = %e, "malformed stale_extension blob");
            (
                None,
                Some(issue(record, format!("malformed stale_extension blob: {e}"))),
            )
        }
    }
}

fn issue(record: &DatasetRecord, message: String) -> DataQualityIssue {
    DataQualityIssue {
        dataset_id: record.id.clone(),
        message: format!("{}: {}", record.title, message),
    }
}
