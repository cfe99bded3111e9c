//! Staleness classifier — merges the two lateness tracks into one verdict
//! and builds the per-dataset staleness record.

use chrono::Duration;

use crate::lateness::Lateness;
use crate::types::{DatasetRecord, StalenessRecord, UploadMethod};

/// Package-level tag marking automated ETL uploads.
const ETL_TAG: &str = "_etl";
/// Package-level tag marking data harvested from an external source.
const HARVESTED_TAG: &str = "_harvested";
/// Resource name that betrays an external harvester even without the tag.
const HARVESTER_RESOURCE: &str = "Esri Rest API";

/// Guess how data lands in this dataset. Tag evidence wins over resource
/// names; the default assumption is manual upload.
pub fn infer_upload_method(record: &DatasetRecord) -> UploadMethod {
    if record.tags.iter().any(|t| t == ETL_TAG) {
        UploadMethod::Etl
    } else if record.tags.iter().any(|t| t == HARVESTED_TAG) {
        UploadMethod::Harvested
    } else if record.resource_names.iter().any(|n| n == HARVESTER_RESOURCE) {
        UploadMethod::Harvested
    } else {
        UploadMethod::Manual
    }
}

/// Marker prefixed to private dataset titles for downstream reporting.
const PRIVATE_PREFIX: &str = "(private) ";

/// Merge the two lateness tracks into a verdict.
///
/// Returns `None` when neither track is strictly positive. The content
/// track's coverage fields are populated only when that track is positive.
pub fn classify(
    record: &DatasetRecord,
    frequency: &str,
    period: Duration,
    administrative: &Lateness,
    content: Option<(&str, &Lateness)>,
    portal_host: &str,
) -> Option<StalenessRecord> {
    let admin_overdue = administrative.is_overdue();
    let content_overdue = content.map(|(_, l)| l.is_overdue()).unwrap_or(false);
    if !admin_overdue && !content_overdue {
        return None;
    }

    let title = if record.private {
        format!("{PRIVATE_PREFIX}{}", record.title)
    } else {
        record.title.clone()
    };

    let (cycles_late, days_late) = if admin_overdue {
        (administrative.cycles(period), administrative.days())
    } else {
        (0.0, 0.0)
    };

    let (temporal_coverage_end, data_cycles_late) = match content {
        Some((end, lateness)) if lateness.is_overdue() => {
            (Some(end.to_string()), Some(lateness.cycles(period)))
        }
        _ => (None, None),
    };

    let mut explanation = format!("{} updates {}", title, frequency);
    match (admin_overdue, content_overdue) {
        (true, true) => {
            explanation.push_str(&format!(
                " but metadata_modified = {} and temporal_coverage_end = {} making it DOUBLE STALE!",
                record.metadata_modified,
                temporal_coverage_end.as_deref().unwrap_or("?"),
            ));
        }
        (true, false) => {
            explanation.push_str(&format!(
                " but metadata_modified = {} making it STALE!",
                record.metadata_modified,
            ));
        }
        (false, true) => {
            explanation.push_str(&format!(
                " but temporal_coverage_end = {} making it STALE!",
                temporal_coverage_end.as_deref().unwrap_or("?"),
            ));
        }
        (false, false) => unreachable!("classify returns early when neither track is overdue"),
    }

    Some(StalenessRecord {
        id: record.id.clone(),
        title,
        publisher: record.publisher.clone(),
        frequency_publishing: frequency.to_string(),
        data_change_rate: record.frequency_data_change.clone(),
        upload_method: infer_upload_method(record),
        url: record.dataset_url(portal_host),
        last_modified: record.metadata_modified,
        cycles_late,
        days_late,
        temporal_coverage_end,
        data_cycles_late,
        explanation,
    })
}
