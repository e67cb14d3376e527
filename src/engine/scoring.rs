//! Per-category maturity-score adjustment.
//!
//! A deterministic, order-independent reduction: each finding contributes
//! one delta to every category it belongs to, deltas sum, and the adjusted
//! score is floored at 1.0.

use crate::model::{Category, CorrelatedFinding, RiskAdjustment};
use indexmap::IndexMap;
use std::collections::HashMap;

/// Floor applied to every adjusted score.
pub const ADJUSTED_SCORE_FLOOR: f64 = 1.0;

/// Delta contributed by one finding.
///
/// Known-exploited entries dominate; otherwise severity decides. Unknown
/// severity is treated like low severity: absence of enrichment must not
/// zero out the risk signal.
#[must_use]
pub fn finding_delta(finding: &CorrelatedFinding) -> f64 {
    if finding.known_exploited {
        -1.0
    } else {
        match finding.severity_score() {
            Some(score) if score >= 9.0 => -0.5,
            Some(score) if score >= 7.0 => -0.3,
            _ => -0.1,
        }
    }
}

/// Adjust base maturity scores for the risk the findings represent.
///
/// Deltas for multiple findings in the same category accumulate by
/// summation: risk compounds. Categories with no findings pass through
/// unchanged; findings in categories the caller supplied no base score for
/// contribute nothing. Output order follows the caller's base-score order.
#[must_use]
pub fn adjust_scores(
    base_scores: &IndexMap<Category, f64>,
    findings: &[CorrelatedFinding],
) -> IndexMap<Category, RiskAdjustment> {
    let mut deltas: HashMap<Category, (f64, usize)> = HashMap::new();
    for finding in findings {
        let delta = finding_delta(finding);
        for category in &finding.categories {
            let slot = deltas.entry(*category).or_insert((0.0, 0));
            slot.0 += delta;
            slot.1 += 1;
        }
    }

    base_scores
        .iter()
        .map(|(category, base)| {
            let (delta, count) = deltas.get(category).copied().unwrap_or((0.0, 0));
            let adjustment = if count == 0 {
                RiskAdjustment::unchanged(*base)
            } else {
                RiskAdjustment {
                    base: *base,
                    delta,
                    adjusted: (base + delta).max(ADJUSTED_SCORE_FLOOR),
                    findings: count,
                }
            };
            (*category, adjustment)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{test_finding, VulnerabilityDetail};

    fn detail(score: f64) -> VulnerabilityDetail {
        VulnerabilityDetail {
            base_score: score,
            cwe_ids: vec![],
            description: String::new(),
            references: vec![],
            published: None,
            last_modified: None,
        }
    }

    fn finding_in(cve_id: &str, category: Category) -> crate::model::CorrelatedFinding {
        let mut f = test_finding(cve_id);
        f.categories = vec![category];
        f
    }

    #[test]
    fn delta_tiers() {
        let mut kev = test_finding("CVE-1");
        kev.known_exploited = true;
        kev.detail = Some(detail(5.0)); // catalog membership dominates severity
        assert_eq!(finding_delta(&kev), -1.0);

        let mut critical = test_finding("CVE-2");
        critical.detail = Some(detail(9.8));
        assert_eq!(finding_delta(&critical), -0.5);

        let mut high = test_finding("CVE-3");
        high.detail = Some(detail(7.5));
        assert_eq!(finding_delta(&high), -0.3);

        let mut medium = test_finding("CVE-4");
        medium.detail = Some(detail(5.5));
        assert_eq!(finding_delta(&medium), -0.1);

        let unknown = test_finding("CVE-5");
        assert_eq!(finding_delta(&unknown), -0.1);
    }

    #[test]
    fn deltas_sum_within_a_category() {
        let mut bases = IndexMap::new();
        bases.insert(Category::Identity, 3.0);

        let mut a = finding_in("CVE-1", Category::Identity);
        a.detail = Some(detail(9.8));
        let mut b = finding_in("CVE-2", Category::Identity);
        b.detail = Some(detail(7.5));

        let adjustments = adjust_scores(&bases, &[a, b]);
        let identity = &adjustments[&Category::Identity];
        assert!((identity.delta - (-0.8)).abs() < 1e-9);
        assert!((identity.adjusted - 2.2).abs() < 1e-9);
        assert_eq!(identity.findings, 2);
    }

    #[test]
    fn adjusted_score_floors_at_one() {
        let mut bases = IndexMap::new();
        bases.insert(Category::Applications, 1.0);

        let mut a = finding_in("CVE-1", Category::Applications);
        a.known_exploited = true;
        let mut b = finding_in("CVE-2", Category::Applications);
        b.known_exploited = true;

        let adjustments = adjust_scores(&bases, &[a, b]);
        let apps = &adjustments[&Category::Applications];
        assert!((apps.delta - (-2.0)).abs() < 1e-9);
        assert_eq!(apps.adjusted, 1.0);
    }

    #[test]
    fn categories_without_findings_pass_through() {
        let mut bases = IndexMap::new();
        bases.insert(Category::Identity, 3.0);
        bases.insert(Category::Data, 0.5);

        let finding = finding_in("CVE-1", Category::Identity);
        let adjustments = adjust_scores(&bases, &[finding]);

        let data = &adjustments[&Category::Data];
        assert_eq!(data.adjusted, 0.5); // untouched, not floored
        assert_eq!(data.delta, 0.0);
        assert_eq!(data.findings, 0);
    }

    #[test]
    fn multi_category_finding_adjusts_each_category() {
        let mut bases = IndexMap::new();
        bases.insert(Category::Identity, 4.0);
        bases.insert(Category::Networks, 4.0);

        let mut f = test_finding("CVE-1");
        f.known_exploited = true;
        f.categories = vec![Category::Identity, Category::Networks];

        let adjustments = adjust_scores(&bases, &[f]);
        assert!((adjustments[&Category::Identity].adjusted - 3.0).abs() < 1e-9);
        assert!((adjustments[&Category::Networks].adjusted - 3.0).abs() < 1e-9);
    }

    #[test]
    fn reduction_is_order_independent() {
        let mut bases = IndexMap::new();
        bases.insert(Category::Identity, 3.0);

        let mut a = finding_in("CVE-1", Category::Identity);
        a.known_exploited = true;
        let mut b = finding_in("CVE-2", Category::Identity);
        b.detail = Some(detail(9.1));
        let c = finding_in("CVE-3", Category::Identity);

        let forward = adjust_scores(&bases, &[a.clone(), b.clone(), c.clone()]);
        let reverse = adjust_scores(&bases, &[c, b, a]);
        assert_eq!(forward, reverse);
    }
}
