//! Mapping from NVD wire records to `VulnerabilityDetail`.

use super::response::NvdCve;
use crate::model::VulnerabilityDetail;
use chrono::{DateTime, NaiveDateTime, Utc};

/// Convert a CVE record to the engine's detail type.
///
/// Score preference is CVSS v3.1, then v3.0, then v2; a record with no
/// metrics at all maps to a base score of 0.0, which the severity banding
/// treats as unscored.
#[must_use]
pub fn map_cve_to_detail(cve: &NvdCve) -> VulnerabilityDetail {
    VulnerabilityDetail {
        base_score: preferred_base_score(cve).unwrap_or(0.0),
        cwe_ids: extract_cwe_ids(cve),
        description: english_description(cve),
        references: cve.references.iter().map(|r| r.url.clone()).collect(),
        published: cve.published.as_deref().and_then(parse_nvd_timestamp),
        last_modified: cve.last_modified.as_deref().and_then(parse_nvd_timestamp),
    }
}

fn preferred_base_score(cve: &NvdCve) -> Option<f64> {
    let metrics = &cve.metrics;
    [&metrics.cvss_v31, &metrics.cvss_v30, &metrics.cvss_v2]
        .into_iter()
        .find_map(|list| list.first())
        .map(|metric| metric.cvss_data.base_score)
}

/// Unique CWE ids, sorted for a stable output order.
fn extract_cwe_ids(cve: &NvdCve) -> Vec<String> {
    let mut ids: Vec<String> = cve
        .weaknesses
        .iter()
        .flat_map(|w| &w.description)
        .filter(|d| d.value.starts_with("CWE-"))
        .map(|d| d.value.clone())
        .collect();
    ids.sort();
    ids.dedup();
    ids
}

fn english_description(cve: &NvdCve) -> String {
    cve.descriptions
        .iter()
        .find(|d| d.lang == "en")
        .map(|d| d.value.clone())
        .unwrap_or_default()
}

/// NVD timestamps carry fractional seconds but no timezone; they are UTC.
fn parse_nvd_timestamp(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}
