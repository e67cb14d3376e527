//! Shared data types: categories, severity bands, findings, and the
//! `ThreatContext` output contract consumed by downstream report assembly.

use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Control domains used to bucket both findings and known control gaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Identity,
    Devices,
    Networks,
    Applications,
    Data,
    Visibility,
}

impl Category {
    /// All categories, in taxonomy order.
    pub const ALL: [Self; 6] = [
        Self::Identity,
        Self::Devices,
        Self::Networks,
        Self::Applications,
        Self::Data,
        Self::Visibility,
    ];

    /// Canonical category name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Identity => "Identity",
            Self::Devices => "Devices",
            Self::Networks => "Networks",
            Self::Applications => "Applications",
            Self::Data => "Data",
            Self::Visibility => "Visibility",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Categorical severity band, derived from a CVSS base score via the fixed
/// NVD thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeverityBand {
    Critical,
    High,
    Medium,
    Low,
    /// No score available (enrichment missing or score of 0.0)
    Unscored,
}

impl SeverityBand {
    /// Band for a CVSS base score.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= 9.0 {
            Self::Critical
        } else if score >= 7.0 {
            Self::High
        } else if score >= 4.0 {
            Self::Medium
        } else if score > 0.0 {
            Self::Low
        } else {
            Self::Unscored
        }
    }
}

/// Enrichment data for one CVE identifier, fetched on demand from the
/// detail source. Absence of this record never blocks the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VulnerabilityDetail {
    /// CVSS base score, 0.0-10.0 (v3.1 preferred, then v3.0, then v2)
    pub base_score: f64,
    /// CWE classification ids, e.g. "CWE-502"
    pub cwe_ids: Vec<String>,
    /// English description
    pub description: String,
    /// Reference URLs (advisories, patches)
    pub references: Vec<String>,
    /// When the CVE was published
    pub published: Option<DateTime<Utc>>,
    /// When the CVE record was last modified
    pub last_modified: Option<DateTime<Utc>>,
}

impl VulnerabilityDetail {
    /// Severity band for this detail record.
    #[must_use]
    pub fn band(&self) -> SeverityBand {
        SeverityBand::from_score(self.base_score)
    }
}

/// One matched catalog entry, optionally enriched, correlated against the
/// caller's control gaps, and finally scored for remediation ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelatedFinding {
    /// Stable vulnerability identifier (CVE id)
    pub cve_id: String,
    /// Vendor/project name from the catalog entry
    pub vendor: String,
    /// Product name from the catalog entry
    pub product: String,
    /// Human-readable vulnerability name
    pub title: String,
    /// Whether the entry sits in the known-exploited catalog
    pub known_exploited: bool,
    /// Independent active-exploitation signal (known ransomware campaign use)
    pub active_exploitation: bool,
    /// Date the entry was added to the catalog
    pub date_added: NaiveDate,
    /// Remediation due date, when the catalog carries one
    pub due_date: Option<NaiveDate>,
    /// Short description from the catalog entry
    pub description: String,
    /// Enrichment from the detail source, when available
    pub detail: Option<VulnerabilityDetail>,
    /// All categories whose keywords match this finding's text
    pub categories: Vec<Category>,
    /// Gap descriptions that overlap one of this finding's categories
    pub matched_gaps: Vec<String>,
    /// True iff at least one known gap shares a category with this finding
    pub compounding_risk: bool,
    /// Computed priority score; attached by `prioritize`
    pub priority: Option<f64>,
}

impl CorrelatedFinding {
    /// CVSS base score, if enrichment succeeded.
    #[must_use]
    pub fn severity_score(&self) -> Option<f64> {
        self.detail.as_ref().map(|d| d.base_score)
    }

    /// Severity band (`Unscored` when enrichment is missing).
    #[must_use]
    pub fn severity_band(&self) -> SeverityBand {
        self.detail
            .as_ref()
            .map_or(SeverityBand::Unscored, VulnerabilityDetail::band)
    }

    /// Whether the remediation due date has passed.
    #[must_use]
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.due_date.is_some_and(|due| today > due)
    }
}

/// Per-category maturity-score adjustment.
///
/// The adjusted score is always clamped to a floor of 1.0 no matter how
/// negative the accumulated delta; the floor is a property of the output,
/// not of the input scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskAdjustment {
    /// Base maturity score supplied by the caller (0.0-5.0)
    pub base: f64,
    /// Signed cumulative delta from all findings in this category
    pub delta: f64,
    /// `max(1.0, base + delta)`
    pub adjusted: f64,
    /// Number of findings that contributed to the delta
    pub findings: usize,
}

impl RiskAdjustment {
    /// Pass-through adjustment for a category with no findings.
    #[must_use]
    pub fn unchanged(base: f64) -> Self {
        Self {
            base,
            delta: 0.0,
            adjusted: base,
            findings: 0,
        }
    }
}

/// Summary counts over a run's findings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreatSummary {
    pub total_findings: usize,
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub unscored: usize,
    pub known_exploited: usize,
    pub compounding: usize,
    /// Findings whose remediation due date has passed as of `today`
    pub overdue: usize,
}

impl ThreatSummary {
    /// Tally a slice of findings. `today` anchors the overdue count.
    #[must_use]
    pub fn from_findings(findings: &[CorrelatedFinding], today: NaiveDate) -> Self {
        let mut summary = Self {
            total_findings: findings.len(),
            ..Self::default()
        };
        for finding in findings {
            match finding.severity_band() {
                SeverityBand::Critical => summary.critical += 1,
                SeverityBand::High => summary.high += 1,
                SeverityBand::Medium => summary.medium += 1,
                SeverityBand::Low => summary.low += 1,
                SeverityBand::Unscored => summary.unscored += 1,
            }
            if finding.known_exploited {
                summary.known_exploited += 1;
            }
            if finding.compounding_risk {
                summary.compounding += 1;
            }
            if finding.is_overdue(today) {
                summary.overdue += 1;
            }
        }
        summary
    }
}

/// Structured output of one engine run, handed to report assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatContext {
    pub summary: ThreatSummary,
    /// Findings in descending priority order
    pub findings: Vec<CorrelatedFinding>,
    /// Per-category score adjustments, in caller's base-score order
    pub adjustments: IndexMap<Category, RiskAdjustment>,
    /// True when some data source failed mid-run and the result is
    /// incomplete; downstream must render an explicit indicator
    pub partial: bool,
}

impl ThreatContext {
    /// Degraded result: no findings, base scores passed through unchanged.
    #[must_use]
    pub fn degraded(base_scores: &IndexMap<Category, f64>) -> Self {
        let adjustments = base_scores
            .iter()
            .map(|(category, base)| (*category, RiskAdjustment::unchanged(*base)))
            .collect();
        Self {
            summary: ThreatSummary::default(),
            findings: Vec::new(),
            adjustments,
            partial: true,
        }
    }

    /// Log a one-line run summary.
    pub fn log_summary(&self) {
        tracing::info!(
            total = self.summary.total_findings,
            critical = self.summary.critical,
            high = self.summary.high,
            known_exploited = self.summary.known_exploited,
            compounding = self.summary.compounding,
            overdue = self.summary.overdue,
            partial = self.partial,
            "threat context assembled"
        );
    }
}

/// Bare finding for unit tests across the crate.
#[cfg(test)]
pub(crate) fn test_finding(cve_id: &str) -> CorrelatedFinding {
    CorrelatedFinding {
        cve_id: cve_id.to_string(),
        vendor: "Vendor".to_string(),
        product: "Product".to_string(),
        title: "Test vulnerability".to_string(),
        known_exploited: false,
        active_exploitation: false,
        date_added: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        due_date: None,
        description: String::new(),
        detail: None,
        categories: Vec::new(),
        matched_gaps: Vec::new(),
        compounding_risk: false,
        priority: None,
    }
}
