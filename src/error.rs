//! Unified error types for threat-context.
//!
//! One top-level error with per-subsystem kind enums, so callers can match
//! on the subsystem without string inspection and the retry policy can ask
//! each kind whether another attempt is worthwhile.

use thiserror::Error;

/// Main error type for threat-context operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ThreatContextError {
    /// Errors from the vulnerability catalog client
    #[error("Catalog fetch failed: {context}")]
    Catalog {
        context: String,
        #[source]
        source: CatalogErrorKind,
    },

    /// Errors from the vulnerability detail client
    #[error("Detail lookup failed: {context}")]
    Detail {
        context: String,
        #[source]
        source: DetailErrorKind,
    },

    /// Errors inside the correlation engine
    #[error("Engine operation failed: {context}")]
    Engine {
        context: String,
        #[source]
        source: EngineErrorKind,
    },

    /// Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Catalog client error kinds.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CatalogErrorKind {
    #[error("Catalog source unavailable: {0}")]
    Unavailable(String),

    #[error("Request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Malformed catalog payload: {0}")]
    Parse(String),

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Snapshot cache error: {0}")]
    Cache(String),
}

/// Detail client error kinds.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum DetailErrorKind {
    #[error("Rate limited by detail source: {0}")]
    RateLimited(String),

    #[error("Request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Detail API returned status {status}")]
    Api { status: u16 },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed detail payload: {0}")]
    Parse(String),
}

/// Engine error kinds.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum EngineErrorKind {
    #[error("Base score for '{category}' out of range: {value} (expected 0.0-5.0)")]
    ScoreOutOfRange { category: String, value: f64 },
}

/// Convenient Result type for threat-context operations.
pub type Result<T> = std::result::Result<T, ThreatContextError>;

impl ThreatContextError {
    /// Create a catalog error with context.
    pub fn catalog(context: impl Into<String>, source: CatalogErrorKind) -> Self {
        Self::Catalog {
            context: context.into(),
            source,
        }
    }

    /// Create a detail error with context.
    pub fn detail(context: impl Into<String>, source: DetailErrorKind) -> Self {
        Self::Detail {
            context: context.into(),
            source,
        }
    }

    /// Create an engine error with context.
    pub fn engine(context: impl Into<String>, source: EngineErrorKind) -> Self {
        Self::Engine {
            context: context.into(),
            source,
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Whether retrying the failed operation can possibly succeed.
    ///
    /// Transport-level failures (unreachable source, timeout, rate limit)
    /// are transient; schema and parse failures are not: re-fetching the
    /// same malformed payload cannot help.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Catalog { source, .. } => matches!(
                source,
                CatalogErrorKind::Unavailable(_) | CatalogErrorKind::Timeout(_)
            ),
            Self::Detail { source, .. } => matches!(
                source,
                DetailErrorKind::RateLimited(_)
                    | DetailErrorKind::Timeout(_)
                    | DetailErrorKind::Network(_)
            ),
            Self::Engine { .. } | Self::Config(_) => false,
        }
    }

    /// Whether this error is an upstream rate limit.
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        matches!(
            self,
            Self::Detail {
                source: DetailErrorKind::RateLimited(_),
                ..
            }
        )
    }
}

impl From<serde_json::Error> for ThreatContextError {
    fn from(err: serde_json::Error) -> Self {
        Self::catalog(
            "JSON deserialization",
            CatalogErrorKind::Parse(err.to_string()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn transport_errors_are_retryable() {
        let err = ThreatContextError::catalog(
            "fetching feed",
            CatalogErrorKind::Unavailable("connection refused".into()),
        );
        assert!(err.is_retryable());

        let err = ThreatContextError::detail(
            "CVE-2021-44228",
            DetailErrorKind::RateLimited("429".into()),
        );
        assert!(err.is_retryable());
        assert!(err.is_rate_limited());

        let err = ThreatContextError::detail(
            "CVE-2021-44228",
            DetailErrorKind::Timeout(Duration::from_secs(30)),
        );
        assert!(err.is_retryable());
    }

    #[test]
    fn parse_errors_are_not_retryable() {
        let err = ThreatContextError::catalog(
            "parsing feed",
            CatalogErrorKind::Parse("unexpected EOF".into()),
        );
        assert!(!err.is_retryable());

        let err = ThreatContextError::catalog(
            "parsing feed",
            CatalogErrorKind::MissingField {
                field: "cveID".into(),
            },
        );
        assert!(!err.is_retryable());

        let err = ThreatContextError::detail(
            "CVE-2021-44228",
            DetailErrorKind::Parse("not JSON".into()),
        );
        assert!(!err.is_retryable());
    }

    #[test]
    fn display_carries_context() {
        let err = ThreatContextError::catalog(
            "fetching KEV feed",
            CatalogErrorKind::Unavailable("dns failure".into()),
        );
        assert!(err.to_string().contains("fetching KEV feed"));
    }
}
