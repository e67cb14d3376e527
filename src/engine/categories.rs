//! Category assignment and control-gap correlation.
//!
//! A fixed keyword-to-category table buckets both finding text and gap
//! descriptions into the control-domain taxonomy. Pure string logic, kept
//! separate from the engine's control flow so the matching policy can be
//! refined without touching it.

use crate::model::{Category, CorrelatedFinding};

/// Keyword table, taxonomy order. A text may hit several buckets; policy is
/// to attach all of them, never just the first, so compounding-risk
/// detection cannot under-count.
const KEYWORD_TABLE: &[(Category, &[&str])] = &[
    (
        Category::Identity,
        &[
            "identity",
            "authentication",
            "authorization",
            "credential",
            "password",
            "privilege",
            "mfa",
            "single sign-on",
            "sso",
        ],
    ),
    (
        Category::Devices,
        &["device", "firmware", "driver", "endpoint", "bios", "iot"],
    ),
    (
        Category::Networks,
        &[
            "network",
            "vpn",
            "router",
            "firewall",
            "gateway",
            "dns",
            "segmentation",
        ],
    ),
    (
        Category::Applications,
        &[
            "application",
            "remote code execution",
            "rce",
            "injection",
            "deserialization",
            "cross-site scripting",
            "buffer overflow",
            "arbitrary code",
            "web shell",
        ],
    ),
    (
        Category::Data,
        &[
            "data",
            "encryption",
            "cryptograph",
            "database",
            "information disclosure",
            "exfiltration",
            "plaintext",
        ],
    ),
    (
        Category::Visibility,
        &["visibility", "logging", "monitoring", "audit", "telemetry", "siem"],
    ),
];

/// All categories whose keywords appear in `text`, case-insensitively.
/// Each category's own name doubles as a keyword, so "Identity gaps" maps
/// to Identity without a table entry repeating the name.
#[must_use]
pub fn categories_for_text(text: &str) -> Vec<Category> {
    let haystack = text.to_lowercase();
    KEYWORD_TABLE
        .iter()
        .filter(|(category, keywords)| {
            haystack.contains(&category.name().to_lowercase())
                || keywords.iter().any(|k| haystack.contains(k))
        })
        .map(|(category, _)| *category)
        .collect()
}

/// Assign categories and correlate findings against known control gaps.
///
/// A finding's category set is derived from its title, catalog description,
/// and enriched detail description combined. `matched_gaps` collects the
/// gap descriptions sharing at least one category with the finding, and
/// `compounding_risk` is true iff that set is non-empty.
pub fn correlate_with_gaps(findings: &mut [CorrelatedFinding], gap_descriptions: &[String]) {
    let gap_categories: Vec<(String, Vec<Category>)> = gap_descriptions
        .iter()
        .map(|gap| (gap.clone(), categories_for_text(gap)))
        .collect();

    for finding in findings.iter_mut() {
        let text = finding_text(finding);
        finding.categories = categories_for_text(&text);

        finding.matched_gaps = gap_categories
            .iter()
            .filter(|(_, cats)| cats.iter().any(|c| finding.categories.contains(c)))
            .map(|(gap, _)| gap.clone())
            .collect();
        finding.compounding_risk = !finding.matched_gaps.is_empty();
    }
}

fn finding_text(finding: &CorrelatedFinding) -> String {
    let detail_text = finding
        .detail
        .as_ref()
        .map(|d| d.description.as_str())
        .unwrap_or_default();
    format!("{} {} {}", finding.title, finding.description, detail_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::test_finding;

    #[test]
    fn single_keyword_maps_to_one_category() {
        assert_eq!(
            categories_for_text("improper authentication in the admin console"),
            vec![Category::Identity]
        );
        assert_eq!(
            categories_for_text("remote code execution via crafted request"),
            vec![Category::Applications]
        );
    }

    #[test]
    fn category_name_itself_is_a_keyword() {
        assert_eq!(categories_for_text("Identity weaknesses"), vec![Category::Identity]);
        assert_eq!(categories_for_text("no VISIBILITY at all"), vec![Category::Visibility]);
    }

    #[test]
    fn multi_bucket_text_attaches_all_categories() {
        let cats = categories_for_text(
            "VPN gateway allows remote code execution and credential theft",
        );
        assert!(cats.contains(&Category::Identity));
        assert!(cats.contains(&Category::Networks));
        assert!(cats.contains(&Category::Applications));
    }

    #[test]
    fn unrelated_text_maps_to_no_category() {
        assert!(categories_for_text("a pleasant walk in the park").is_empty());
    }

    #[test]
    fn mfa_gap_compounds_identity_finding() {
        let mut finding = test_finding("CVE-2024-0001");
        finding.description = "authentication bypass".to_string();
        let mut findings = vec![finding];

        correlate_with_gaps(&mut findings, &["No MFA implemented".to_string()]);

        assert_eq!(findings[0].categories, vec![Category::Identity]);
        assert!(findings[0].compounding_risk);
        assert_eq!(findings[0].matched_gaps, vec!["No MFA implemented".to_string()]);
    }

    #[test]
    fn empty_gap_list_never_compounds() {
        let mut finding = test_finding("CVE-2024-0001");
        finding.description = "remote code execution".to_string();
        let mut findings = vec![finding];

        correlate_with_gaps(&mut findings, &[]);

        assert!(!findings[0].compounding_risk);
        assert!(findings[0].matched_gaps.is_empty());
    }

    #[test]
    fn gap_in_different_category_does_not_compound() {
        let mut finding = test_finding("CVE-2024-0001");
        finding.description = "remote code execution".to_string();
        let mut findings = vec![finding];

        correlate_with_gaps(&mut findings, &["No MFA implemented".to_string()]);

        assert_eq!(findings[0].categories, vec![Category::Applications]);
        assert!(!findings[0].compounding_risk);
    }

    #[test]
    fn enriched_description_feeds_categorization() {
        use crate::model::VulnerabilityDetail;

        let mut finding = test_finding("CVE-2024-0001");
        finding.detail = Some(VulnerabilityDetail {
            base_score: 8.0,
            cwe_ids: vec![],
            description: "cleartext password storage".to_string(),
            references: vec![],
            published: None,
            last_modified: None,
        });
        let mut findings = vec![finding];

        correlate_with_gaps(&mut findings, &[]);
        assert!(findings[0].categories.contains(&Category::Identity));
    }
}
