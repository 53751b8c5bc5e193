//! Location-intent re-ranking
//!
//! "Where is X located" questions often resolve to several candidate
//! documents. A candidate whose text actually mentions a corporate office
//! is more likely the one the user means, so it gets a fixed confidence
//! boost. The boost value is a tunable heuristic, not a calibrated
//! probability.

use crate::config::ResolverConfig;
use crate::index::DocumentDirectory;
use crate::query::contains_word;
use crate::resolver::CandidateMatch;

const LOCATION_INTENT_TERMS: &[&str] = &[
    "where",
    "located",
    "location",
    "address",
    "office",
    "offices",
    "headquarters",
    "headquartered",
];

const OFFICE_PHRASES: &[&str] = &[
    "corporate office",
    "principal office",
    "principal place of business",
    "registered office",
    "head office",
    "headquarters",
];

/// Whether the question is asking about a place
pub fn has_location_intent(text: &str) -> bool {
    let lower = text.to_lowercase();
    LOCATION_INTENT_TERMS
        .iter()
        .any(|term| contains_word(&lower, term))
}

/// Boost candidates whose indexed text mentions a corporate office, then
/// re-sort. Only runs when more than one candidate survives the floor; a
/// single survivor needs no disambiguation. Lookup failures mean no boost
/// for that candidate, never a request failure.
pub(crate) async fn apply_boost(
    config: &ResolverConfig,
    candidates: &mut [CandidateMatch],
    directory: &dyn DocumentDirectory,
) {
    let surviving = candidates
        .iter()
        .filter(|c| c.confidence >= config.confidence_floor)
        .count();
    if surviving < 2 {
        return;
    }

    let scan_count = surviving.min(config.location_candidate_cap);
    for candidate in candidates.iter_mut().take(scan_count) {
        let window = match directory
            .text_window(&candidate.document_id, config.location_scan_chars)
            .await
        {
            Ok(Some(text)) => text,
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!(
                    document_id = %candidate.document_id,
                    "location scan failed, candidate not boosted: {}",
                    e
                );
                continue;
            }
        };

        let lower = window.to_lowercase();
        if OFFICE_PHRASES.iter().any(|phrase| lower.contains(phrase)) {
            candidate.confidence = (candidate.confidence + config.location_boost).min(1.0);
            tracing::debug!(
                document_id = %candidate.document_id,
                confidence = candidate.confidence,
                "office mention found, candidate boosted"
            );
        }
    }

    // Stable re-sort so unboosted ties keep their order
    candidates.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{BackendError, FilenameRecord, PartyRecord};
    use crate::resolver::MatchKind;
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct FakeDirectory {
        texts: HashMap<String, String>,
    }

    #[async_trait]
    impl DocumentDirectory for FakeDirectory {
        async fn party_records(&self) -> Result<Vec<PartyRecord>, BackendError> {
            Ok(Vec::new())
        }

        async fn filenames(&self) -> Result<Vec<FilenameRecord>, BackendError> {
            Ok(Vec::new())
        }

        async fn text_window(
            &self,
            document_id: &str,
            max_chars: usize,
        ) -> Result<Option<String>, BackendError> {
            Ok(self
                .texts
                .get(document_id)
                .map(|t| t.chars().take(max_chars).collect()))
        }
    }

    fn candidate(doc: &str, confidence: f32) -> CandidateMatch {
        CandidateMatch {
            document_id: doc.to_string(),
            matched_value: format!("{doc} name"),
            match_kind: MatchKind::PartyName,
            confidence,
        }
    }

    #[test]
    fn test_location_intent_detection() {
        assert!(has_location_intent("where is Acme located"));
        assert!(has_location_intent("what is the address of Acme"));
        assert!(!has_location_intent("what is the governing law"));
    }

    #[tokio::test]
    async fn test_office_mention_reorders_candidates() {
        let directory = FakeDirectory {
            texts: HashMap::from([
                ("doc-1".to_string(), "standard confidentiality terms".to_string()),
                (
                    "doc-2".to_string(),
                    "with its corporate office at 100 Main Street".to_string(),
                ),
            ]),
        };
        let config = ResolverConfig::default();
        let mut candidates = vec![candidate("doc-1", 0.8), candidate("doc-2", 0.75)];

        apply_boost(&config, &mut candidates, &directory).await;

        assert_eq!(candidates[0].document_id, "doc-2");
        assert!(candidates[0].confidence > 0.8);
    }

    #[tokio::test]
    async fn test_single_survivor_untouched() {
        let directory = FakeDirectory {
            texts: HashMap::from([(
                "doc-1".to_string(),
                "corporate office of the disclosing party".to_string(),
            )]),
        };
        let config = ResolverConfig::default();
        let mut candidates = vec![candidate("doc-1", 0.9), candidate("doc-2", 0.1)];

        apply_boost(&config, &mut candidates, &directory).await;

        assert_eq!(candidates[0].confidence, 0.9);
    }

    #[tokio::test]
    async fn test_boost_capped_at_one() {
        let directory = FakeDirectory {
            texts: HashMap::from([
                ("doc-1".to_string(), "registered office: Dover, Delaware".to_string()),
                ("doc-2".to_string(), "registered office: Austin, Texas".to_string()),
            ]),
        };
        let config = ResolverConfig::default();
        let mut candidates = vec![candidate("doc-1", 0.95), candidate("doc-2", 0.4)];

        apply_boost(&config, &mut candidates, &directory).await;

        assert!(candidates.iter().all(|c| c.confidence <= 1.0));
    }
}
