//! Vulnerability detail client (NVD CVE API 2.0).
//!
//! Lazy per-identifier enrichment: CVSS base score, weakness classification,
//! description, and reference links. Enrichment failures never block the
//! pipeline; the catalog entry alone is enough to proceed with degraded
//! detail.

#[cfg(feature = "clients")]
mod client;
pub mod mapper;
pub mod response;

#[cfg(feature = "clients")]
pub use client::DetailClient;
pub use mapper::map_cve_to_detail;
