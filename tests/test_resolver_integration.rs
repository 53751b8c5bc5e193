//! Integration tests for fuzzy entity resolution

use async_trait::async_trait;
use docket::config::ResolverConfig;
use docket::index::{BackendError, DocumentDirectory, FilenameRecord, PartyRecord};
use docket::resolver::{has_location_intent, EntityResolver, MatchKind};
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

fn party(doc: &str, name: &str) -> PartyRecord {
    PartyRecord {
        document_id: doc.to_string(),
        name: name.to_string(),
    }
}

#[test]
fn test_vallen_fragment_resolves_with_first_word_confidence() {
    let resolver = EntityResolver::new(ResolverConfig::default()).unwrap();

    let raw = "What is the governing state of Vallen?";
    let fragment = resolver.extract_fragment(raw).unwrap();
    assert_eq!(fragment, "Vallen");

    let parties = vec![
        party("doc-vallen", "Vallen Distribution, Inc."),
        party("doc-other", "Meridian Labs LLC"),
    ];
    let candidates = resolver.resolve(&fragment, &parties, &[]);

    let best = resolver.best_match(&candidates).unwrap();
    assert_eq!(best.document_id, "doc-vallen");
    assert_eq!(best.match_kind, MatchKind::PartyName);
    assert!(best.confidence >= 0.7, "got {}", best.confidence);
}

#[test]
fn test_no_fragment_means_no_document_filter() {
    let resolver = EntityResolver::new(ResolverConfig::default()).unwrap();
    assert!(resolver.extract_fragment("what is the effective date?").is_none());
}

#[test]
fn test_low_confidence_candidates_never_filter() {
    let resolver = EntityResolver::new(ResolverConfig::default()).unwrap();
    let parties = vec![party("doc-1", "Meridian Labs LLC")];

    let candidates = resolver.resolve("Quortex", &parties, &[]);

    // The ranking stays inspectable even when nothing clears the floor
    assert_eq!(candidates.len(), 1);
    assert!(resolver.best_match(&candidates).is_none());
}

#[test]
fn test_filename_fallback_when_no_party_matches() {
    let resolver = EntityResolver::new(ResolverConfig::default()).unwrap();
    let parties = vec![party("doc-1", "Globex Industrial Group")];
    let files = vec![FilenameRecord {
        document_id: "doc-2".to_string(),
        filename: "vallen_distribution_nda.pdf".to_string(),
    }];

    let candidates = resolver.resolve("Vallen", &parties, &files);
    let best = resolver.best_match(&candidates).unwrap();

    assert_eq!(best.document_id, "doc-2");
    assert_eq!(best.match_kind, MatchKind::Filename);
}

#[tokio::test]
async fn test_location_query_prefers_document_with_office_mention() {
    let resolver = EntityResolver::new(ResolverConfig::default()).unwrap();
    let parties = vec![
        party("doc-a", "Acme Corporation"),
        party("doc-b", "Acme Corp Holdings"),
    ];

    let raw = "Where is Acme located?";
    assert!(has_location_intent(raw));

    let fragment = resolver.extract_fragment(raw).unwrap();
    let mut candidates = resolver.resolve(&fragment, &parties, &[]);
    assert!(candidates.len() >= 2);

    let directory = FakeDirectory {
        texts: HashMap::from([
            ("doc-a".to_string(), "whereas the parties agree as follows".to_string()),
            (
                "doc-b".to_string(),
                "Acme Corp Holdings, with its principal place of business in Austin".to_string(),
            ),
        ]),
    };

    resolver.apply_location_boost(&mut candidates, &directory).await;

    assert_eq!(candidates[0].document_id, "doc-b");
}
