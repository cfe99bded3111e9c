//! Scan snapshot — the persisted record of which datasets were stale last
//! pass, and the diff that finds newly stale ones.
//!
//! Newly-stale membership is a function of the id sets only; titles are
//! stored for display and never affect the diff.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CoreError;
use crate::types::StalenessRecord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub id: String,
    pub title: String,
}

/// Load the previous snapshot. An absent file is a legitimate first run and
/// loads as empty; only persisted history establishes a baseline.
pub fn load(path: &Path) -> Result<Vec<SnapshotEntry>, CoreError> {
    if !path.exists() {
        debug!(path = %path.display(), "no snapshot file, starting from empty baseline");
        return Ok(Vec::new());
    }
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Overwrite the snapshot with the current pass's stale set.
pub fn store(path: &Path, entries: &[SnapshotEntry]) -> Result<(), CoreError> {
    let raw = serde_json::to_string_pretty(entries)?;
    fs::write(path, raw)?;
    Ok(())
}

/// The stale records whose ids were not in the previous snapshot.
pub fn newly_stale<'a>(
    previous: &[SnapshotEntry],
    current: &'a [StalenessRecord],
) -> Vec<&'a StalenessRecord> {
    let previous_ids: HashSet<&str> = previous.iter().map(|e| e.id.as_str()).collect();
    current
        .iter()
        .filter(|record| !previous_ids.contains(record.id.as_str()))
        .collect()
}

/// The full current stale set as the next snapshot, independent of whether
/// anything was newly stale this pass.
pub fn to_snapshot(current: &[StalenessRecord]) -> Vec<SnapshotEntry> {
    current
        .iter()
        .map(|record| SnapshotEntry {
            id: record.id.clone(),
            title: record.title.clone(),
        })
        .collect()
}
