//! Correlation & prioritization engine.
//!
//! Composes match → enrich → correlate → adjust → prioritize over a catalog
//! source and a detail source, with the graceful-degradation contract: the
//! caller always receives a structured `ThreatContext`, flagged partial when
//! some data source could not be consulted.

pub mod categories;
pub mod matching;
pub mod prioritize;
pub mod scoring;

pub use categories::{categories_for_text, correlate_with_gaps};
pub use matching::{match_technologies, tokenize};
pub use prioritize::{prioritize, priority_score};
pub use scoring::{adjust_scores, finding_delta, ADJUSTED_SCORE_FLOOR};

use crate::catalog::CatalogSnapshot;
use crate::config::EngineConfig;
use crate::error::{EngineErrorKind, Result, ThreatContextError};
use crate::model::{Category, CorrelatedFinding, ThreatContext, ThreatSummary, VulnerabilityDetail};
use crate::retry::RetryPolicy;
use indexmap::IndexMap;
use rayon::prelude::*;
use std::time::Instant;

/// Source of point-in-time catalog snapshots.
pub trait CatalogSource: Send + Sync {
    fn fetch_catalog(&self) -> Result<CatalogSnapshot>;
}

/// Source of per-identifier enrichment data.
///
/// `Ok(None)` is the normal not-found outcome, not an error.
pub trait DetailLookup: Send + Sync {
    fn fetch_detail(&self, cve_id: &str) -> Result<Option<VulnerabilityDetail>>;
}

#[cfg(feature = "clients")]
impl CatalogSource for crate::catalog::CatalogClient {
    fn fetch_catalog(&self) -> Result<CatalogSnapshot> {
        self.fetch_catalog()
    }
}

#[cfg(feature = "clients")]
impl DetailLookup for crate::detail::DetailClient {
    fn fetch_detail(&self, cve_id: &str) -> Result<Option<VulnerabilityDetail>> {
        self.fetch_detail(cve_id)
    }
}

/// Tally of one enrichment pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EnrichStats {
    /// Findings that received detail data in this pass
    pub enriched: usize,
    /// Findings that already carried detail and were skipped
    pub already_enriched: usize,
    /// Lookups that found no record (normal outcome)
    pub not_found: usize,
    /// Lookups abandoned after rate-limit backoff was exhausted
    pub rate_limited: usize,
    /// Lookups skipped because the run deadline had passed
    pub deadline_skipped: usize,
    /// Lookups that failed hard (API or parse errors)
    pub failed: usize,
}

impl EnrichStats {
    /// Whether any lookup failed in a way that degrades the run to partial.
    #[must_use]
    pub fn degrades_run(&self) -> bool {
        self.failed > 0 || self.deadline_skipped > 0
    }

    fn log_summary(&self) {
        tracing::info!(
            enriched = self.enriched,
            already = self.already_enriched,
            not_found = self.not_found,
            rate_limited = self.rate_limited,
            deadline_skipped = self.deadline_skipped,
            failed = self.failed,
            "enrichment pass complete"
        );
    }
}

enum EnrichOutcome {
    Enriched,
    AlreadyEnriched,
    NotFound,
    RateLimited,
    DeadlineSkipped,
    Failed,
}

fn enrich_one(
    finding: &mut CorrelatedFinding,
    lookup: &dyn DetailLookup,
    policy: &RetryPolicy,
    deadline: Option<Instant>,
) -> EnrichOutcome {
    // Idempotence: re-enriching an already-enriched finding is a no-op.
    if finding.detail.is_some() {
        return EnrichOutcome::AlreadyEnriched;
    }
    if deadline.is_some_and(|d| Instant::now() >= d) {
        return EnrichOutcome::DeadlineSkipped;
    }

    match policy.run(&finding.cve_id, deadline, || {
        lookup.fetch_detail(&finding.cve_id)
    }) {
        Ok(Some(detail)) => {
            finding.detail = Some(detail);
            EnrichOutcome::Enriched
        }
        Ok(None) => EnrichOutcome::NotFound,
        Err(err) if err.is_rate_limited() => {
            tracing::debug!(cve_id = %finding.cve_id, "rate limited, proceeding unenriched");
            EnrichOutcome::RateLimited
        }
        Err(err) => {
            tracing::warn!(cve_id = %finding.cve_id, error = %err, "detail lookup failed");
            EnrichOutcome::Failed
        }
    }
}

/// Attach detail data to findings, one lookup per finding.
///
/// Lookups fan out across a rayon pool when `parallel` is set; each task
/// writes only its own finding slot, so no coordination is needed beyond
/// the pool itself. Rate-limit and not-found outcomes leave the finding
/// unenriched without failing the batch; hard failures are logged, counted,
/// and absorbed.
pub fn enrich(
    findings: &mut [CorrelatedFinding],
    lookup: &dyn DetailLookup,
    policy: &RetryPolicy,
    deadline: Option<Instant>,
    parallel: bool,
) -> EnrichStats {
    let outcomes: Vec<EnrichOutcome> = if parallel {
        findings
            .par_iter_mut()
            .map(|f| enrich_one(f, lookup, policy, deadline))
            .collect()
    } else {
        findings
            .iter_mut()
            .map(|f| enrich_one(f, lookup, policy, deadline))
            .collect()
    };

    let mut stats = EnrichStats::default();
    for outcome in outcomes {
        match outcome {
            EnrichOutcome::Enriched => stats.enriched += 1,
            EnrichOutcome::AlreadyEnriched => stats.already_enriched += 1,
            EnrichOutcome::NotFound => stats.not_found += 1,
            EnrichOutcome::RateLimited => stats.rate_limited += 1,
            EnrichOutcome::DeadlineSkipped => stats.deadline_skipped += 1,
            EnrichOutcome::Failed => stats.failed += 1,
        }
    }
    stats.log_summary();
    stats
}

/// The correlation & prioritization engine.
pub struct Engine {
    config: EngineConfig,
    retry: RetryPolicy,
}

impl Engine {
    /// Create an engine from configuration.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let retry = RetryPolicy::from_config(&config);
        Ok(Self { config, retry })
    }

    /// The retry policy derived from this engine's configuration.
    #[must_use]
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Run the full pipeline: match → enrich → correlate → adjust →
    /// prioritize.
    ///
    /// Degrades gracefully: a catalog failure after retries yields a
    /// `ThreatContext` with zero findings, base scores passed through, and
    /// `partial` set; per-finding enrichment failures never abort the
    /// batch. The only hard error is invalid caller input (a base score
    /// outside 0.0-5.0), which prevents producing meaningful output at all.
    pub fn run(
        &self,
        catalog: &dyn CatalogSource,
        detail: &dyn DetailLookup,
        mentions: &[String],
        gap_descriptions: &[String],
        base_scores: &IndexMap<Category, f64>,
    ) -> Result<ThreatContext> {
        validate_base_scores(base_scores)?;

        let deadline = self.config.run_deadline.map(|d| Instant::now() + d);

        let snapshot = match self
            .retry
            .run("catalog fetch", deadline, || catalog.fetch_catalog())
        {
            Ok(snapshot) => snapshot,
            Err(err) => {
                tracing::warn!(error = %err, "catalog unavailable, returning degraded context");
                let ctx = ThreatContext::degraded(base_scores);
                ctx.log_summary();
                return Ok(ctx);
            }
        };

        let mut findings = match_technologies(mentions, &snapshot);

        let stats = enrich(
            &mut findings,
            detail,
            &self.retry,
            deadline,
            self.config.parallel_enrichment,
        );

        correlate_with_gaps(&mut findings, gap_descriptions);
        let adjustments = adjust_scores(base_scores, &findings);
        prioritize(&mut findings);

        let deadline_hit = deadline.is_some_and(|d| Instant::now() >= d);
        let context = ThreatContext {
            summary: ThreatSummary::from_findings(&findings, chrono::Utc::now().date_naive()),
            findings,
            adjustments,
            partial: stats.degrades_run() || deadline_hit,
        };
        context.log_summary();
        Ok(context)
    }
}

impl Default for Engine {
    fn default() -> Self {
        let config = EngineConfig::default();
        let retry = RetryPolicy::from_config(&config);
        Self { config, retry }
    }
}

fn validate_base_scores(base_scores: &IndexMap<Category, f64>) -> Result<()> {
    for (category, value) in base_scores {
        if !(0.0..=5.0).contains(value) || value.is_nan() {
            return Err(ThreatContextError::engine(
                "validating base scores",
                EngineErrorKind::ScoreOutOfRange {
                    category: category.name().to_string(),
                    value: *value,
                },
            ));
        }
    }
    Ok(())
}
