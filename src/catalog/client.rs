//! Blocking HTTP client for the known-exploited-vulnerabilities feed.

use super::snapshot::{CatalogResponse, CatalogSnapshot};
use crate::config::CatalogClientConfig;
use crate::error::{CatalogErrorKind, Result, ThreatContextError};
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;
use std::time::SystemTime;

/// Catalog client: stateless pull of the KEV feed, with an optional disk
/// snapshot cache in front of the network path.
pub struct CatalogClient {
    client: reqwest::blocking::Client,
    config: CatalogClientConfig,
}

impl CatalogClient {
    /// Create a client from configuration.
    pub fn new(config: CatalogClientConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| {
                ThreatContextError::catalog(
                    "building HTTP client",
                    CatalogErrorKind::Unavailable(e.to_string()),
                )
            })?;

        Ok(Self { client, config })
    }

    /// Create with default configuration.
    pub fn with_defaults() -> Result<Self> {
        Self::new(CatalogClientConfig::default())
    }

    fn cache_file_path(&self) -> PathBuf {
        self.config.cache_dir.join("kev_snapshot.json")
    }

    fn is_cache_valid(&self) -> bool {
        if self.config.bypass_cache {
            return false;
        }
        let path = self.cache_file_path();
        let Ok(metadata) = fs::metadata(&path) else {
            return false;
        };
        let Ok(modified) = metadata.modified() else {
            return false;
        };
        SystemTime::now()
            .duration_since(modified)
            .is_ok_and(|age| age < self.config.cache_ttl)
    }

    fn load_from_cache(&self) -> Option<CatalogSnapshot> {
        let content = fs::read_to_string(self.cache_file_path()).ok()?;
        let mut snapshot: CatalogSnapshot = serde_json::from_str(&content).ok()?;
        snapshot.rebuild_index();
        Some(snapshot)
    }

    fn save_to_cache(&self, snapshot: &CatalogSnapshot) -> Result<()> {
        let path = self.cache_file_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ThreatContextError::catalog(
                    "creating cache directory",
                    CatalogErrorKind::Cache(e.to_string()),
                )
            })?;
        }
        let content = serde_json::to_string(snapshot).map_err(|e| {
            ThreatContextError::catalog(
                "serializing snapshot cache",
                CatalogErrorKind::Cache(e.to_string()),
            )
        })?;
        fs::write(&path, content).map_err(|e| {
            ThreatContextError::catalog(
                "writing snapshot cache",
                CatalogErrorKind::Cache(e.to_string()),
            )
        })
    }

    fn fetch_from_feed(&self) -> Result<CatalogSnapshot> {
        let response = self
            .client
            .get(&self.config.feed_url)
            .send()
            .map_err(|e| {
                let kind = if e.is_timeout() {
                    CatalogErrorKind::Timeout(self.config.timeout)
                } else {
                    CatalogErrorKind::Unavailable(e.to_string())
                };
                ThreatContextError::catalog("fetching KEV feed", kind)
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ThreatContextError::catalog(
                "fetching KEV feed",
                CatalogErrorKind::Unavailable(format!("feed returned status {status}")),
            ));
        }

        let feed: CatalogResponse = response.json().map_err(|e| {
            ThreatContextError::catalog(
                "parsing KEV feed",
                CatalogErrorKind::Parse(e.to_string()),
            )
        })?;

        CatalogSnapshot::from_response(feed)
    }

    /// Fetch a point-in-time catalog snapshot, from cache when fresh.
    ///
    /// Cache read failures fall through to the network path; cache write
    /// failures are logged and ignored.
    pub fn fetch_catalog(&self) -> Result<CatalogSnapshot> {
        if self.is_cache_valid() {
            if let Some(snapshot) = self.load_from_cache() {
                tracing::debug!(entries = snapshot.len(), "loaded catalog snapshot from cache");
                return Ok(snapshot);
            }
        }

        let snapshot = self.fetch_from_feed()?;
        tracing::info!(
            entries = snapshot.len(),
            version = %snapshot.version,
            "fetched catalog snapshot"
        );

        if let Err(e) = self.save_to_cache(&snapshot) {
            tracing::warn!(error = %e, "failed to cache catalog snapshot");
        }

        Ok(snapshot)
    }

    /// Fetch only entries added on or after `cutoff`.
    pub fn fetch_since(&self, cutoff: NaiveDate) -> Result<Vec<super::snapshot::CatalogEntry>> {
        let snapshot = self.fetch_catalog()?;
        Ok(snapshot.added_since(cutoff).into_iter().cloned().collect())
    }
}
