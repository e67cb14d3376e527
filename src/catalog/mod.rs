//! Vulnerability catalog client (CISA Known Exploited Vulnerabilities feed).
//!
//! Stateless read of a point-in-time catalog snapshot, with optional
//! since-date filtering. Transport failures are retryable; malformed
//! payloads are not.

#[cfg(feature = "clients")]
mod client;
pub mod snapshot;

#[cfg(feature = "clients")]
pub use client::CatalogClient;
pub use snapshot::{CatalogEntry, CatalogResponse, CatalogSnapshot, RawCatalogEntry};
