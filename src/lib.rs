//! **Threat correlation and risk-adjustment over public vulnerability feeds.**
//!
//! `threat-context` matches extracted technology mentions against the CISA
//! Known Exploited Vulnerabilities catalog, enriches the matches with CVSS
//! and weakness data from the NVD CVE API, correlates them with an
//! organization's known control gaps, adjusts per-category maturity scores,
//! and produces a ranked remediation list: the [`model::ThreatContext`]
//! handed to downstream report assembly.
//!
//! ## Pipeline
//!
//! The [`engine::Engine`] composes five operations in strict order:
//!
//! 1. **match**: [`engine::match_technologies`] pairs technology mentions
//!    with catalog entries using a deterministic token rule.
//! 2. **enrich**: [`engine::enrich`] fetches per-CVE detail; failures leave
//!    the finding unenriched rather than failing the run.
//! 3. **correlate**: [`engine::correlate_with_gaps`] buckets findings and
//!    gaps into control domains and flags compounding risk.
//! 4. **adjust**: [`engine::adjust_scores`] applies summed, floored deltas
//!    to the caller's base maturity scores.
//! 5. **prioritize**: [`engine::prioritize`] ranks findings for
//!    remediation, with a reproducible tie-break.
//!
//! The engine's most important behavioral guarantee is graceful
//! degradation: the caller always receives a structured result, flagged
//! `partial` when a data source could not be consulted, never an unbounded
//! wait or an opaque failure.
//!
//! ## Example
//!
//! ```no_run
//! use indexmap::IndexMap;
//! use threat_context::catalog::CatalogClient;
//! use threat_context::config::{CatalogClientConfig, DetailClientConfig, EngineConfig};
//! use threat_context::detail::DetailClient;
//! use threat_context::engine::Engine;
//! use threat_context::model::Category;
//!
//! fn main() -> threat_context::Result<()> {
//!     let catalog = CatalogClient::new(CatalogClientConfig::default())?;
//!     let detail = DetailClient::new(DetailClientConfig::default())?;
//!     let engine = Engine::new(EngineConfig::default())?;
//!
//!     let mentions = vec!["Microsoft Exchange Server 2019".to_string()];
//!     let gaps = vec!["No MFA implemented".to_string()];
//!     let mut base_scores = IndexMap::new();
//!     base_scores.insert(Category::Applications, 2.0);
//!     base_scores.insert(Category::Identity, 3.0);
//!
//!     let context = engine.run(&catalog, &detail, &mentions, &gaps, &base_scores)?;
//!     for finding in &context.findings {
//!         println!("{} priority {:?}", finding.cve_id, finding.priority);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature flags
//!
//! - `clients` (default): the HTTP clients for the KEV feed and the NVD
//!   API, pulling in `reqwest`. Disable it to use only the pure engine
//!   against your own [`engine::CatalogSource`]/[`engine::DetailLookup`]
//!   implementations.

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
#![allow(
    // Score math mixes usize counts with f64 deltas; all values are bounded
    clippy::cast_precision_loss,
    // # Errors / # Panics doc sections are aspirational here
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod catalog;
pub mod config;
pub mod detail;
pub mod engine;
pub mod error;
pub mod model;
pub mod retry;

// Re-export main types for convenience
#[cfg(feature = "clients")]
pub use catalog::CatalogClient;
pub use catalog::{CatalogEntry, CatalogSnapshot};
pub use config::{CatalogClientConfig, DetailClientConfig, EngineConfig};
#[cfg(feature = "clients")]
pub use detail::DetailClient;
pub use engine::{CatalogSource, DetailLookup, Engine, EnrichStats};
pub use error::{Result, ThreatContextError};
pub use model::{
    Category, CorrelatedFinding, RiskAdjustment, SeverityBand, ThreatContext, ThreatSummary,
    VulnerabilityDetail,
};
pub use retry::RetryPolicy;
