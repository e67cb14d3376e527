//! KEV catalog wire types and the in-memory snapshot.
//!
//! Feed format: <https://www.cisa.gov/known-exploited-vulnerabilities-catalog>

use crate::error::{CatalogErrorKind, Result, ThreatContextError};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Raw catalog feed response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogResponse {
    pub title: String,
    #[serde(rename = "catalogVersion")]
    pub catalog_version: String,
    #[serde(rename = "dateReleased")]
    pub date_released: String,
    pub count: usize,
    pub vulnerabilities: Vec<RawCatalogEntry>,
}

/// One raw feed record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawCatalogEntry {
    #[serde(rename = "cveID")]
    pub cve_id: String,
    #[serde(rename = "vendorProject")]
    pub vendor_project: String,
    pub product: String,
    #[serde(rename = "vulnerabilityName")]
    pub vulnerability_name: String,
    #[serde(rename = "dateAdded")]
    pub date_added: String,
    #[serde(rename = "shortDescription")]
    pub short_description: String,
    #[serde(rename = "requiredAction", default)]
    pub required_action: String,
    #[serde(rename = "dueDate", default)]
    pub due_date: String,
    #[serde(rename = "knownRansomwareCampaignUse", default)]
    pub known_ransomware_campaign_use: String,
}

/// A known-exploited-vulnerability record, immutable once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Stable, globally unique CVE identifier
    pub cve_id: String,
    /// Vendor/project name
    pub vendor: String,
    /// Product name
    pub product: String,
    /// Human-readable vulnerability name
    pub title: String,
    /// Date added to the catalog
    pub date_added: NaiveDate,
    /// Remediation due date, absent in some records
    pub due_date: Option<NaiveDate>,
    /// Short description
    pub description: String,
    /// Mandated remediation action
    pub required_action: String,
    /// Known use in ransomware campaigns
    pub ransomware_campaign_use: bool,
}

impl CatalogEntry {
    /// Convert a raw feed record. Missing or unparseable required fields
    /// are a schema failure, not a transient one.
    pub fn from_raw(raw: &RawCatalogEntry) -> Result<Self> {
        if raw.cve_id.trim().is_empty() {
            return Err(ThreatContextError::catalog(
                "converting catalog record",
                CatalogErrorKind::MissingField {
                    field: "cveID".into(),
                },
            ));
        }
        let date_added = parse_feed_date(&raw.date_added).ok_or_else(|| {
            ThreatContextError::catalog(
                format!("converting catalog record {}", raw.cve_id),
                CatalogErrorKind::Parse(format!("bad dateAdded: {:?}", raw.date_added)),
            )
        })?;
        // Due date is optional in practice; an empty string means none.
        let due_date = if raw.due_date.trim().is_empty() {
            None
        } else {
            parse_feed_date(&raw.due_date)
        };

        Ok(Self {
            cve_id: normalize_cve_id(&raw.cve_id),
            vendor: raw.vendor_project.clone(),
            product: raw.product.clone(),
            title: raw.vulnerability_name.clone(),
            date_added,
            due_date,
            description: raw.short_description.clone(),
            required_action: raw.required_action.clone(),
            ransomware_campaign_use: raw.known_ransomware_campaign_use.to_lowercase() == "known",
        })
    }
}

/// Point-in-time catalog snapshot. Preserves feed order and carries a
/// CVE-id index for constant-time membership checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    entries: Vec<CatalogEntry>,
    #[serde(skip)]
    index: HashMap<String, usize>,
    /// Catalog version string from the feed
    pub version: String,
    /// When this snapshot was fetched
    pub fetched_at: DateTime<Utc>,
}

impl CatalogSnapshot {
    /// Empty snapshot.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
            version: String::new(),
            fetched_at: Utc::now(),
        }
    }

    /// Build a snapshot from a feed response. A single malformed record
    /// fails the whole snapshot: re-fetching the same payload will not help,
    /// and silently dropping records would under-report exploited CVEs.
    pub fn from_response(response: CatalogResponse) -> Result<Self> {
        let entries = response
            .vulnerabilities
            .iter()
            .map(CatalogEntry::from_raw)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::from_entries(entries, response.catalog_version))
    }

    /// Build from already-converted entries.
    #[must_use]
    pub fn from_entries(entries: Vec<CatalogEntry>, version: String) -> Self {
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.cve_id.clone(), i))
            .collect();
        Self {
            entries,
            index,
            version,
            fetched_at: Utc::now(),
        }
    }

    /// Rebuild the CVE-id index (needed after deserializing a cached
    /// snapshot, since the index is not persisted).
    pub fn rebuild_index(&mut self) {
        self.index = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.cve_id.clone(), i))
            .collect();
    }

    /// Entries in feed order.
    #[must_use]
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Look up an entry by CVE id (case-insensitive).
    #[must_use]
    pub fn get(&self, cve_id: &str) -> Option<&CatalogEntry> {
        self.index
            .get(&normalize_cve_id(cve_id))
            .map(|&i| &self.entries[i])
    }

    /// Whether a CVE id is present.
    #[must_use]
    pub fn contains(&self, cve_id: &str) -> bool {
        self.index.contains_key(&normalize_cve_id(cve_id))
    }

    /// Entries added on or after the cutoff date.
    #[must_use]
    pub fn added_since(&self, cutoff: NaiveDate) -> Vec<&CatalogEntry> {
        self.entries
            .iter()
            .filter(|e| e.date_added >= cutoff)
            .collect()
    }

    /// Entries whose vendor name contains `vendor`, case-insensitively.
    #[must_use]
    pub fn filter_by_vendor(&self, vendor: &str) -> Vec<&CatalogEntry> {
        let needle = vendor.to_lowercase();
        self.entries
            .iter()
            .filter(|e| e.vendor.to_lowercase().contains(&needle))
            .collect()
    }

    /// Entries whose product name contains `product`, case-insensitively.
    #[must_use]
    pub fn filter_by_product(&self, product: &str) -> Vec<&CatalogEntry> {
        let needle = product.to_lowercase();
        self.entries
            .iter()
            .filter(|e| e.product.to_lowercase().contains(&needle))
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parse the feed's YYYY-MM-DD date format.
fn parse_feed_date(date_str: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").ok()
}

/// Normalize a CVE id for consistent lookup.
pub(crate) fn normalize_cve_id(cve_id: &str) -> String {
    cve_id.trim().to_uppercase()
}
