//! Configuration objects for the clients and the engine.
//!
//! All configuration is passed explicitly at construction time. The library
//! never reads the process environment; callers that want `NVD_API_KEY` from
//! the environment resolve it themselves and hand it in.

use std::path::PathBuf;
use std::time::Duration;

/// Default CISA KEV catalog feed URL.
pub const KEV_CATALOG_URL: &str =
    "https://www.cisa.gov/sites/default/files/feeds/known_exploited_vulnerabilities.json";

/// Default NVD CVE API 2.0 base URL.
pub const NVD_API_BASE: &str = "https://services.nvd.nist.gov/rest/json/cves/2.0";

/// Catalog client configuration.
#[derive(Debug, Clone)]
pub struct CatalogClientConfig {
    /// Catalog feed URL
    pub feed_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Snapshot cache directory
    pub cache_dir: PathBuf,
    /// Snapshot cache time-to-live
    pub cache_ttl: Duration,
    /// Bypass the snapshot cache and always fetch fresh data
    pub bypass_cache: bool,
}

impl Default for CatalogClientConfig {
    fn default() -> Self {
        Self {
            feed_url: KEV_CATALOG_URL.to_string(),
            timeout: Duration::from_secs(30),
            cache_dir: default_cache_dir(),
            cache_ttl: Duration::from_secs(3600),
            bypass_cache: false,
        }
    }
}

/// Platform cache directory for catalog snapshots.
fn default_cache_dir() -> PathBuf {
    #[cfg(feature = "clients")]
    {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from(".cache"))
            .join("threat-context")
            .join("kev")
    }
    #[cfg(not(feature = "clients"))]
    {
        PathBuf::from(".cache/threat-context/kev")
    }
}

/// Detail client configuration.
#[derive(Debug, Clone)]
pub struct DetailClientConfig {
    /// Detail API base URL
    pub api_base: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Optional API key, sent as the `apiKey` header. Opaque to the engine;
    /// the upstream grants higher rate limits when present.
    pub api_key: Option<String>,
}

impl Default for DetailClientConfig {
    fn default() -> Self {
        Self {
            api_base: NVD_API_BASE.to_string(),
            timeout: Duration::from_secs(30),
            api_key: None,
        }
    }
}

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum attempts for transient failures (first try included)
    pub max_attempts: u32,
    /// Base delay of the exponential backoff schedule
    pub backoff_base: Duration,
    /// Cap on any single backoff delay
    pub backoff_cap: Duration,
    /// Whole-run deadline; exceeding it mid-run yields a partial result
    pub run_deadline: Option<Duration>,
    /// Fan detail lookups out across a rayon pool
    pub parallel_enrichment: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base: Duration::from_secs(1),
            backoff_cap: Duration::from_secs(30),
            run_deadline: None,
            parallel_enrichment: true,
        }
    }
}

impl EngineConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.max_attempts == 0 {
            return Err(crate::error::ThreatContextError::config(
                "max_attempts must be at least 1",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_production_feeds() {
        let catalog = CatalogClientConfig::default();
        assert!(catalog.feed_url.contains("cisa.gov"));
        assert!(!catalog.bypass_cache);

        let detail = DetailClientConfig::default();
        assert!(detail.api_base.contains("nvd.nist.gov"));
        assert!(detail.api_key.is_none());
    }

    #[test]
    fn zero_attempts_rejected() {
        let config = EngineConfig {
            max_attempts: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(EngineConfig::default().validate().is_ok());
    }
}
