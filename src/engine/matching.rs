//! Technology-mention matching against catalog entries.
//!
//! Matching rule (deterministic, documented): both sides are lowercased and
//! split on non-alphanumeric runs. An entry matches a mention iff every
//! non-numeric token of the entry's product field appears in the mention's
//! token set. Vendor tokens are not required, so "Exchange Server" matches
//! without naming Microsoft; numeric product tokens are ignored so
//! version-bearing products still match version-less mentions.

use crate::catalog::{CatalogEntry, CatalogSnapshot};
use crate::model::CorrelatedFinding;
use std::collections::HashSet;

/// Lowercase alphanumeric tokens of a free-text string.
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Product tokens that discriminate: non-empty and not purely numeric.
fn product_tokens(entry: &CatalogEntry) -> Vec<String> {
    tokenize(&entry.product)
        .into_iter()
        .filter(|t| !t.chars().all(|c| c.is_ascii_digit()))
        .collect()
}

fn entry_matches(entry_tokens: &[String], mention_tokens: &HashSet<String>) -> bool {
    !entry_tokens.is_empty() && entry_tokens.iter().all(|t| mention_tokens.contains(t))
}

/// Match extracted technology mentions against a catalog snapshot.
///
/// Each catalog entry matching at least one mention yields exactly one
/// finding; duplicate matches against the same entry are deduplicated by
/// CVE id. Zero matches for a mention is not an error: the mention is
/// silently dropped. Output follows catalog order.
#[must_use]
pub fn match_technologies(
    mentions: &[String],
    snapshot: &CatalogSnapshot,
) -> Vec<CorrelatedFinding> {
    let mention_token_sets: Vec<HashSet<String>> = mentions
        .iter()
        .map(|m| tokenize(m).into_iter().collect())
        .collect();

    let mut seen: HashSet<String> = HashSet::new();
    let mut findings = Vec::new();

    for entry in snapshot.entries() {
        if seen.contains(&entry.cve_id) {
            continue;
        }
        let entry_tokens = product_tokens(entry);
        if mention_token_sets
            .iter()
            .any(|mention| entry_matches(&entry_tokens, mention))
        {
            seen.insert(entry.cve_id.clone());
            findings.push(finding_from_entry(entry));
        }
    }

    tracing::debug!(
        mentions = mentions.len(),
        matched = findings.len(),
        "technology matching complete"
    );
    findings
}

/// Build an uncorrelated finding from a catalog entry. Everything from the
/// catalog is known-exploited by definition; the active-exploitation flag
/// carries the feed's independent ransomware-campaign signal.
fn finding_from_entry(entry: &CatalogEntry) -> CorrelatedFinding {
    CorrelatedFinding {
        cve_id: entry.cve_id.clone(),
        vendor: entry.vendor.clone(),
        product: entry.product.clone(),
        title: entry.title.clone(),
        known_exploited: true,
        active_exploitation: entry.ransomware_campaign_use,
        date_added: entry.date_added,
        due_date: entry.due_date,
        description: entry.description.clone(),
        detail: None,
        categories: Vec::new(),
        matched_gaps: Vec::new(),
        compounding_risk: false,
        priority: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn entry(cve_id: &str, vendor: &str, product: &str) -> CatalogEntry {
        CatalogEntry {
            cve_id: cve_id.to_string(),
            vendor: vendor.to_string(),
            product: product.to_string(),
            title: format!("{product} flaw"),
            date_added: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            due_date: None,
            description: String::new(),
            required_action: String::new(),
            ransomware_campaign_use: false,
        }
    }

    fn snapshot(entries: Vec<CatalogEntry>) -> CatalogSnapshot {
        CatalogSnapshot::from_entries(entries, String::new())
    }

    #[test]
    fn tokenize_lowercases_and_splits_on_non_alphanumeric() {
        assert_eq!(
            tokenize("Microsoft Exchange Server 2019"),
            vec!["microsoft", "exchange", "server", "2019"]
        );
        assert_eq!(tokenize("IOS-XE (17.3)"), vec!["ios", "xe", "17", "3"]);
        assert_eq!(tokenize(""), Vec::<String>::new());
    }

    #[test]
    fn versioned_mention_matches_versionless_product() {
        let snap = snapshot(vec![entry("CVE-2024-00001", "Microsoft", "Exchange Server")]);
        let findings = match_technologies(
            &["Microsoft Exchange Server 2019".to_string()],
            &snap,
        );
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].cve_id, "CVE-2024-00001");
        assert!(findings[0].known_exploited);
    }

    #[test]
    fn numeric_product_tokens_are_ignored() {
        // Product "Windows Server 2012" should match a mention without "2012".
        let snap = snapshot(vec![entry("CVE-2024-0002", "Microsoft", "Windows Server 2012")]);
        let findings = match_technologies(&["Windows Server cluster".to_string()], &snap);
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn partial_product_token_overlap_does_not_match() {
        let snap = snapshot(vec![entry("CVE-2024-0003", "Microsoft", "Exchange Server")]);
        // "exchange" alone lacks the "server" token.
        let findings = match_technologies(&["Exchange".to_string()], &snap);
        assert!(findings.is_empty());
    }

    #[test]
    fn one_entry_yields_one_finding_across_duplicate_mentions() {
        let snap = snapshot(vec![entry("CVE-2024-0004", "Atlassian", "Confluence")]);
        let findings = match_technologies(
            &[
                "Atlassian Confluence".to_string(),
                "confluence wiki".to_string(),
            ],
            &snap,
        );
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn one_mention_can_match_multiple_entries() {
        let snap = snapshot(vec![
            entry("CVE-2024-0005", "Microsoft", "Exchange Server"),
            entry("CVE-2024-0006", "Microsoft", "Exchange Server"),
        ]);
        let findings = match_technologies(&["Microsoft Exchange Server".to_string()], &snap);
        assert_eq!(findings.len(), 2);
    }

    #[test]
    fn empty_mentions_produce_no_findings() {
        let snap = snapshot(vec![entry("CVE-2024-0007", "V", "P")]);
        assert!(match_technologies(&[], &snap).is_empty());
    }

    #[test]
    fn matching_is_case_insensitive() {
        let snap = snapshot(vec![entry("CVE-2024-0008", "citrix", "NETSCALER ADC")]);
        let findings = match_technologies(&["NetScaler adc appliance".to_string()], &snap);
        assert_eq!(findings.len(), 1);
    }
}
