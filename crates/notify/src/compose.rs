//! Message composition for stale-dataset alerts.

use pocketwatch_core::types::{StalenessRecord, UploadMethod};

/// Conditionally pluralized noun, without the count.
pub fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}

/// Plain-console form: `Title (url)`.
pub fn display_line(record: &StalenessRecord) -> String {
    format!("{} ({})", record.title, record.url)
}

/// Slack hyperlink form: `<url|Title> (method)`.
pub fn slack_line(record: &StalenessRecord) -> String {
    format!("<{}|{}> ({})", record.url, record.title, record.upload_method)
}

/// The aggregate newly-stale announcement.
///
/// Returns `(printable, slack)` — the same message in console and Slack
/// markup — or `None` when nothing is newly stale.
pub fn newly_stale_messages(newly: &[&StalenessRecord]) -> Option<(String, String)> {
    if newly.is_empty() {
        return None;
    }
    let includes_etl = if newly
        .iter()
        .any(|r| r.upload_method == UploadMethod::Etl)
    {
        " (includes ETL job)"
    } else {
        ""
    };

    let printable_items: Vec<String> = newly.iter().map(|r| display_line(r)).collect();
    let linked_items: Vec<String> = newly.iter().map(|r| slack_line(r)).collect();

    Some((
        format!("NEWLY STALE{includes_etl}: {}", printable_items.join(", ")),
        format!("NEWLY STALE{includes_etl}: {}", linked_items.join(", ")),
    ))
}

/// Publisher-scoped announcement listing that publisher's datasets.
pub fn publisher_message(records: &[&StalenessRecord]) -> String {
    let linked: Vec<String> = records
        .iter()
        .map(|r| format!("<{}|{}>", r.url, r.title))
        .collect();
    format!(
        "Hey there! I just noticed {} newly stale {}: {}",
        records.len(),
        pluralize("dataset", records.len()),
        linked.join(", ")
    )
}

/// Operator-only failure report with the full cause chain, each line marked
/// so it stands out in the channel.
pub fn failure_report(cause_chain: &str) -> String {
    let marked: String = cause_chain
        .lines()
        .map(|line| format!("!! {line}\n"))
        .collect();
    format!("pocketwatch scan failed.\n{marked}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn stale(id: &str, title: &str, method: UploadMethod) -> StalenessRecord {
        StalenessRecord {
            id: id.to_string(),
            title: title.to_string(),
            publisher: "Org".to_string(),
            frequency_publishing: "Weekly".to_string(),
            data_change_rate: String::new(),
            upload_method: method,
            url: format!("https://portal.test/dataset/{id}"),
            last_modified: NaiveDateTime::default(),
            cycles_late: 1.0,
            days_late: 7.0,
            temporal_coverage_end: None,
            data_cycles_late: None,
            explanation: String::new(),
        }
    }

    #[test]
    fn pluralize_counts() {
        assert_eq!(pluralize("dataset", 1), "dataset");
        assert_eq!(pluralize("dataset", 2), "datasets");
        assert_eq!(pluralize("dataset", 0), "datasets");
    }

    #[test]
    fn lines_format() {
        let r = stale("a", "Alpha", UploadMethod::Manual);
        assert_eq!(display_line(&r), "Alpha (https://portal.test/dataset/a)");
        assert_eq!(
            slack_line(&r),
            "<https://portal.test/dataset/a|Alpha> (manual)"
        );
    }

    #[test]
    fn newly_stale_empty_is_none() {
        assert!(newly_stale_messages(&[]).is_none());
    }

    #[test]
    fn newly_stale_marks_etl() {
        let a = stale("a", "Alpha", UploadMethod::Etl);
        let b = stale("b", "Beta", UploadMethod::Manual);
        let (printable, slack) = newly_stale_messages(&[&a, &b]).unwrap();
        assert!(printable.starts_with("NEWLY STALE (includes ETL job): "));
        assert!(printable.contains("Alpha (https://portal.test/dataset/a)"));
        assert!(slack.contains("<https://portal.test/dataset/b|Beta> (manual)"));
    }

    #[test]
    fn newly_stale_without_etl_has_no_marker() {
        let a = stale("a", "Alpha", UploadMethod::Harvested);
        let (printable, _) = newly_stale_messages(&[&a]).unwrap();
        assert!(printable.starts_with("NEWLY STALE: "));
    }

    #[test]
    fn publisher_message_pluralizes() {
        let a = stale("a", "Alpha", UploadMethod::Manual);
        let one = publisher_message(&[&a]);
        assert!(one.contains("1 newly stale dataset:"));

        let b = stale("b", "Beta", UploadMethod::Manual);
        let two = publisher_message(&[&a, &b]);
        assert!(two.contains("2 newly stale datasets:"));
    }

    #[test]
    fn failure_report_marks_every_line() {
        let report = failure_report("top level error\ncaused by: inner");
        assert!(report.contains("!! top level error"));
        assert!(report.contains("!! caused by: inner"));
    }
}
