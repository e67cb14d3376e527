//! Remediation ranking.

use crate::model::CorrelatedFinding;

/// Priority score for one finding.
///
/// Known-exploited membership is worth more than any severity score alone
/// (100 vs a 0-100 severity term), active exploitation and compounding risk
/// stack on top.
#[must_use]
pub fn priority_score(finding: &CorrelatedFinding) -> f64 {
    let mut score = 0.0;
    if finding.known_exploited {
        score += 100.0;
    }
    score += 10.0 * finding.severity_score().unwrap_or(0.0);
    if finding.active_exploitation {
        score += 50.0;
    }
    if finding.compounding_risk {
        score += 25.0;
    }
    score
}

/// Attach priority scores and sort into the remediation ranking:
/// descending priority, ties broken by CVE id ascending so the order is
/// reproducible regardless of enrichment arrival order.
pub fn prioritize(findings: &mut Vec<CorrelatedFinding>) {
    for finding in findings.iter_mut() {
        finding.priority = Some(priority_score(finding));
    }
    findings.sort_by(|a, b| {
        let pa = a.priority.unwrap_or(0.0);
        let pb = b.priority.unwrap_or(0.0);
        pb.total_cmp(&pa)
            .then_with(|| a.cve_id.cmp(&b.cve_id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{test_finding, VulnerabilityDetail};

    fn with_score(cve_id: &str, score: f64) -> CorrelatedFinding {
        let mut f = test_finding(cve_id);
        f.detail = Some(VulnerabilityDetail {
            base_score: score,
            cwe_ids: vec![],
            description: String::new(),
            references: vec![],
            published: None,
            last_modified: None,
        });
        f
    }

    #[test]
    fn score_terms_stack() {
        let mut f = with_score("CVE-1", 9.8);
        f.known_exploited = true;
        f.active_exploitation = true;
        f.compounding_risk = true;
        assert!((priority_score(&f) - 273.0).abs() < 1e-9);
    }

    #[test]
    fn missing_severity_contributes_zero() {
        let mut f = test_finding("CVE-1");
        f.known_exploited = true;
        assert!((priority_score(&f) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn known_exploited_outranks_bare_critical_severity() {
        let mut kev = test_finding("CVE-2024-0002");
        kev.known_exploited = true;
        let critical = with_score("CVE-2024-0001", 9.9);

        let mut findings = vec![critical, kev];
        prioritize(&mut findings);
        assert_eq!(findings[0].cve_id, "CVE-2024-0002");
    }

    #[test]
    fn ties_break_by_identifier_ascending() {
        let b = with_score("CVE-2024-0002", 8.0);
        let a = with_score("CVE-2024-0001", 8.0);

        let mut findings = vec![b, a];
        prioritize(&mut findings);
        assert_eq!(findings[0].cve_id, "CVE-2024-0001");
        assert_eq!(findings[1].cve_id, "CVE-2024-0002");
    }

    #[test]
    fn priority_is_attached_to_every_finding() {
        let mut findings = vec![with_score("CVE-1", 5.0), test_finding("CVE-2")];
        prioritize(&mut findings);
        assert!(findings.iter().all(|f| f.priority.is_some()));
    }
}
