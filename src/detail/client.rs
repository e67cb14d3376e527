//! Blocking HTTP client for per-CVE detail lookups.

use super::mapper::map_cve_to_detail;
use super::response::NvdResponse;
use crate::config::DetailClientConfig;
use crate::error::{DetailErrorKind, Result, ThreatContextError};
use crate::model::VulnerabilityDetail;

/// Detail client against the NVD CVE API.
///
/// `NotFound` is a normal outcome, surfaced as `Ok(None)`: some catalog
/// identifiers precede detail-database coverage. Rate limiting surfaces as
/// a retryable error so callers can back off or proceed unenriched.
pub struct DetailClient {
    client: reqwest::blocking::Client,
    config: DetailClientConfig,
}

impl DetailClient {
    /// Create a client from configuration.
    pub fn new(config: DetailClientConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| {
                ThreatContextError::detail(
                    "building HTTP client",
                    DetailErrorKind::Network(e.to_string()),
                )
            })?;

        Ok(Self { client, config })
    }

    /// Create with default configuration.
    pub fn with_defaults() -> Result<Self> {
        Self::new(DetailClientConfig::default())
    }

    /// Look up enrichment data for one CVE identifier.
    pub fn fetch_detail(&self, cve_id: &str) -> Result<Option<VulnerabilityDetail>> {
        let mut request = self
            .client
            .get(&self.config.api_base)
            .query(&[("cveId", cve_id)]);

        if let Some(ref key) = self.config.api_key {
            request = request.header("apiKey", key);
        }

        let response = request.send().map_err(|e| {
            let kind = if e.is_timeout() {
                DetailErrorKind::Timeout(self.config.timeout)
            } else {
                DetailErrorKind::Network(e.to_string())
            };
            ThreatContextError::detail(cve_id, kind)
        })?;

        let status = response.status();
        match status.as_u16() {
            404 => return Ok(None),
            403 | 429 => {
                return Err(ThreatContextError::detail(
                    cve_id,
                    DetailErrorKind::RateLimited(format!("status {status}")),
                ));
            }
            s if !status.is_success() => {
                return Err(ThreatContextError::detail(
                    cve_id,
                    DetailErrorKind::Api { status: s },
                ));
            }
            _ => {}
        }

        let body: NvdResponse = response.json().map_err(|e| {
            ThreatContextError::detail(cve_id, DetailErrorKind::Parse(e.to_string()))
        })?;

        Ok(body
            .vulnerabilities
            .first()
            .map(|wrapper| map_cve_to_detail(&wrapper.cve)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_builds_with_and_without_api_key() {
        assert!(DetailClient::with_defaults().is_ok());

        let config = DetailClientConfig {
            api_key: Some("test-key".to_string()),
            ..Default::default()
        };
        assert!(DetailClient::new(config).is_ok());
    }
}
