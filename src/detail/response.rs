//! NVD CVE API 2.0 wire types.
//!
//! Only the fields the mapper consumes are modeled; the API returns far
//! more. See: <https://nvd.nist.gov/developers/vulnerabilities>

use serde::{Deserialize, Serialize};

/// Top-level query response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NvdResponse {
    #[serde(rename = "resultsPerPage", default)]
    pub results_per_page: usize,
    #[serde(rename = "totalResults", default)]
    pub total_results: usize,
    #[serde(default)]
    pub vulnerabilities: Vec<NvdVulnerabilityWrapper>,
}

/// Each result wraps the CVE record in a `cve` key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NvdVulnerabilityWrapper {
    pub cve: NvdCve,
}

/// One CVE record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NvdCve {
    pub id: String,
    #[serde(default)]
    pub published: Option<String>,
    #[serde(rename = "lastModified", default)]
    pub last_modified: Option<String>,
    #[serde(default)]
    pub descriptions: Vec<NvdDescription>,
    #[serde(default)]
    pub metrics: NvdMetrics,
    #[serde(default)]
    pub weaknesses: Vec<NvdWeakness>,
    #[serde(default)]
    pub references: Vec<NvdReference>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NvdDescription {
    pub lang: String,
    pub value: String,
}

/// CVSS metric arrays, one per scoring-system version.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NvdMetrics {
    #[serde(rename = "cvssMetricV31", default)]
    pub cvss_v31: Vec<NvdCvssMetric>,
    #[serde(rename = "cvssMetricV30", default)]
    pub cvss_v30: Vec<NvdCvssMetric>,
    #[serde(rename = "cvssMetricV2", default)]
    pub cvss_v2: Vec<NvdCvssMetric>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NvdCvssMetric {
    #[serde(rename = "cvssData")]
    pub cvss_data: NvdCvssData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NvdCvssData {
    #[serde(rename = "baseScore")]
    pub base_score: f64,
    #[serde(rename = "baseSeverity", default)]
    pub base_severity: Option<String>,
    #[serde(rename = "vectorString", default)]
    pub vector_string: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NvdWeakness {
    #[serde(default)]
    pub description: Vec<NvdDescription>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NvdReference {
    pub url: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}
