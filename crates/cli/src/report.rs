//! Console report tables for the scan results.

use std::cmp::Ordering;

use pocketwatch_core::scan::ScanReport;
use pocketwatch_core::types::StalenessRecord;

fn row(record: &StalenessRecord, cycles: f64) -> String {
    format!(
        "{:<40.40}  {:>11.2}  {:<10}  {:<12.12}  {:<23.23}  {:<9.9}",
        record.title,
        cycles,
        record.last_modified.format("%Y-%m-%d"),
        record.frequency_publishing,
        record.publisher,
        record.upload_method.to_string(),
    )
}

fn print_table(rows: &[(&StalenessRecord, f64)]) {
    let header = format!(
        "{:<40}  {:>11}  {:<10}  {:<12}  {:<23}  {:<9}",
        "Title", "Cycles late", "Modified", "Frequency", "Publisher", "Method"
    );
    let border = "=".repeat(header.len());
    println!("{header}");
    println!("{border}");
    for (record, cycles) in rows {
        println!("{}", row(record, *cycles));
    }
    println!("{border}\n");
}

fn sorted_desc<'a>(
    records: &'a [StalenessRecord],
    key: impl Fn(&StalenessRecord) -> f64,
) -> Vec<(&'a StalenessRecord, f64)> {
    let mut rows: Vec<(&StalenessRecord, f64)> =
        records.iter().map(|r| (r, key(r))).collect();
    rows.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    rows
}

/// Print the full console report: three sorted tables, grace notes,
/// data-quality issues, and the coda summary line.
pub fn print_report(report: &ScanReport) {
    println!("\nDatasets by Staleness:");
    print_table(&sorted_desc(&report.stale, |r| r.cycles_late));

    println!("\nStale Datasets by Lateness:");
    print_table(&sorted_desc(&report.stale, |r| r.days_late));

    let by_data: Vec<&StalenessRecord> = report
        .stale
        .iter()
        .filter(|r| r.data_cycles_late.is_some())
        .collect();
    if by_data.is_empty() {
        println!("No datasets are stale by data-lateness.\n");
    } else {
        println!("\nStale Datasets by Data-Lateness:");
        let mut rows: Vec<(&StalenessRecord, f64)> = by_data
            .into_iter()
            .map(|r| (r, r.data_cycles_late.unwrap_or(0.0)))
            .collect();
        rows.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        print_table(&rows);
    }

    for note in &report.grace_notes {
        println!("{note}");
    }
    for issue in &report.data_quality_issues {
        println!("[data quality] {}", issue.message);
    }

    println!(
        "Out of {} packages, only {} have specified publication frequencies. \
         {} are stale (past their refresh-by date).",
        report.total_packages,
        report.packages_with_frequencies,
        report.stale_count(),
    );
}
