//! Async client for the portal's CKAN action API.

use chrono::NaiveDateTime;
use serde::Deserialize;
use tracing::{debug, info};

use pocketwatch_core::types::DatasetRecord;

/// CKAN timestamps are naive, e.g. `2026-08-20T06:10:03.123456`.
const CKAN_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("catalog response envelope reported failure")]
    Envelope,

    #[error("malformed catalog payload: {0}")]
    Malformed(String),
}

// ── Raw CKAN payload ────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct RawPackage {
    id: String,
    name: String,
    title: String,
    organization: Option<RawOrganization>,
    metadata_modified: String,
    frequency_publishing: Option<String>,
    #[serde(default)]
    frequency_data_change: Option<String>,
    #[serde(default)]
    temporal_coverage: Option<String>,
    #[serde(default)]
    private: bool,
    #[serde(default)]
    tags: Vec<RawTag>,
    #[serde(default)]
    resources: Vec<RawResource>,
    #[serde(default)]
    extras: Vec<RawExtra>,
}

#[derive(Debug, Deserialize)]
struct RawOrganization {
    title: String,
}

#[derive(Debug, Deserialize)]
struct RawTag {
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawResource {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawExtra {
    key: String,
    value: String,
}

fn map_package(raw: RawPackage) -> Result<DatasetRecord, CatalogError> {
    let metadata_modified =
        NaiveDateTime::parse_from_str(&raw.metadata_modified, CKAN_TIMESTAMP_FORMAT).map_err(
            |e| {
                CatalogError::Malformed(format!(
                    "package {}: bad metadata_modified {:?}: {e}",
                    raw.id, raw.metadata_modified
                ))
            },
        )?;

    Ok(DatasetRecord {
        id: raw.id,
        name: raw.name,
        title: raw.title,
        publisher: raw
            .organization
            .map(|o| o.title)
            .unwrap_or_else(|| "(no organization)".to_string()),
        frequency_publishing: raw.frequency_publishing,
        frequency_data_change: raw.frequency_data_change.unwrap_or_default(),
        metadata_modified,
        temporal_coverage: raw.temporal_coverage,
        private: raw.private,
        tags: raw.tags.into_iter().map(|t| t.name).collect(),
        resource_names: raw
            .resources
            .into_iter()
            .map(|r| r.name.unwrap_or_else(|| "Unnamed resource".to_string()))
            .collect(),
        extras: raw.extras.into_iter().map(|e| (e.key, e.value)).collect(),
    })
}

// ── Client ──────────────────────────────────────────────────────────

/// Client for one portal host.
#[derive(Debug)]
pub struct CatalogClient {
    host: String,
    client: reqwest::Client,
}

impl CatalogClient {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            client: reqwest::Client::new(),
        }
    }

    fn action_url(&self, action: &str) -> String {
        format!("https://{}/api/3/action/{}", self.host, action)
    }

    /// Pre-flight check that the portal is reachable and answering.
    pub async fn check_health(&self) -> Result<(), CatalogError> {
        let url = self.action_url("site_read");
        debug!(url = %url, "checking portal health");
        let envelope: Envelope<bool> = self.client.get(&url).send().await?.json().await?;
        if !envelope.success {
            return Err(CatalogError::Envelope);
        }
        Ok(())
    }

    /// Fetch the full package list. Any failure here is fatal for the pass.
    pub async fn fetch_packages(&self) -> Result<Vec<DatasetRecord>, CatalogError> {
        let url = format!(
            "{}?limit=999999",
            self.action_url("current_package_list_with_resources")
        );
        debug!(url = %url, "fetching package list");

        let envelope: Envelope<Vec<RawPackage>> =
            self.client.get(&url).send().await?.json().await?;
        if !envelope.success {
            return Err(CatalogError::Envelope);
        }
        let raw_packages = envelope
            .result
            .ok_or_else(|| CatalogError::Malformed("envelope has no result".to_string()))?;

        let mut records = Vec::with_capacity(raw_packages.len());
        for raw in raw_packages {
            records.push(map_package(raw)?);
        }
        info!(count = records.len(), host = %self.host, "fetched package list");
        Ok(records)
    }
}
