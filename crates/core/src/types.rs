use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Unique dataset identifier on the portal (a UUID string in CKAN).
pub type DatasetId = String;

/// One dataset as reported by the portal catalog. Immutable input for a
/// single scan pass; the catalog crate maps the raw CKAN payload into this.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetRecord {
    pub id: DatasetId,
    /// URL slug, used to build the dataset page link.
    pub name: String,
    pub title: String,
    /// Publishing organization title.
    pub publisher: String,
    /// Self-declared publishing schedule label. Absent on datasets that
    /// never filled in the field; those are skipped entirely.
    pub frequency_publishing: Option<String>,
    /// Self-declared data-change-rate label (informational).
    pub frequency_data_change: String,
    pub metadata_modified: NaiveDateTime,
    /// Declared coverage interval, "start/end".
    pub temporal_coverage: Option<String>,
    pub private: bool,
    /// Package-level tag names.
    pub tags: Vec<String>,
    /// Names of the resources inside the package.
    pub resource_names: Vec<String>,
    /// CKAN "extras": free-form key/value pairs attached to the package.
    pub extras: Vec<(String, String)>,
}

impl DatasetRecord {
    /// Look up an extras value by key.
    pub fn extra(&self, key: &str) -> Option<&str> {
        self.extras
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Public dataset page URL on the portal.
    pub fn dataset_url(&self, host: &str) -> String {
        format!("https://{}/dataset/{}", host, self.name)
    }
}

/// How data lands in a dataset. Derived from tags and resource names,
/// informational only — it never affects the staleness verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadMethod {
    Etl,
    Harvested,
    Manual,
}

impl std::fmt::Display for UploadMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            UploadMethod::Etl => "etl",
            UploadMethod::Harvested => "harvested",
            UploadMethod::Manual => "manual",
        };
        f.write_str(s)
    }
}

/// Verdict for one stale dataset, built fresh each pass. At least one of the
/// two lateness tracks is strictly positive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StalenessRecord {
    pub id: DatasetId,
    /// Dataset title; private datasets carry a marker prefix.
    pub title: String,
    pub publisher: String,
    pub frequency_publishing: String,
    pub data_change_rate: String,
    pub upload_method: UploadMethod,
    pub url: String,
    pub last_modified: NaiveDateTime,
    /// Administrative-track lateness in schedule cycles. Fractional, never
    /// clamped; zero when only the content track is late.
    pub cycles_late: f64,
    pub days_late: f64,
    /// Declared coverage end, present only when the content track is late.
    pub temporal_coverage_end: Option<String>,
    /// Content-track lateness in cycles, present only when positive.
    pub data_cycles_late: Option<f64>,
    /// Human-readable evidence line.
    pub explanation: String,
}
