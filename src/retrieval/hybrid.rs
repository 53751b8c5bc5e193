//! Fusion retriever: concurrent lexical + vector search with rank fusion
//!
//! Both backend calls are issued before either response is awaited and
//! share one timeout budget. A slow or failing backend degrades the
//! outcome to partial results; it never blocks the request. Dropping the
//! returned future (caller cancellation) abandons both in-flight calls.

use crate::config::RetrievalConfig;
use crate::index::{LexicalIndex, RankedHit, SearchFilters, VectorIndex};
use crate::query::{Query, StructuredField};
use crate::retrieval::{reciprocal_rank_fusion, FusedHit, FusionConfig, FusionError};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

/// Domain synonyms injected for the lexical backend only; dense retrieval
/// does not depend on exact tokens
const LEXICAL_SYNONYMS: &[(StructuredField, &[&str])] = &[
    (
        StructuredField::GoverningLaw,
        &["governing law", "jurisdiction", "governed by"],
    ),
    (StructuredField::TermLength, &["term", "duration"]),
];

/// Outcome of one fused retrieval pass
#[derive(Debug, Clone)]
pub struct RetrievalOutcome {
    pub hits: Vec<FusedHit>,

    /// Whether each backend answered within the budget
    pub lexical_ok: bool,
    pub vector_ok: bool,
}

impl RetrievalOutcome {
    /// Exactly one backend contributed
    pub fn is_partial(&self) -> bool {
        self.lexical_ok != self.vector_ok
    }

    /// Neither backend contributed; the caller should render "no evidence
    /// found" rather than treat this as a crash
    pub fn is_failed(&self) -> bool {
        !self.lexical_ok && !self.vector_ok
    }
}

/// Hybrid retriever merging two backend rankings with RRF
pub struct FusionRetriever {
    lexical: Arc<dyn LexicalIndex>,
    vector: Arc<dyn VectorIndex>,
    fusion: FusionConfig,
    config: RetrievalConfig,
}

impl FusionRetriever {
    /// Weights are validated here once; retrieval itself never fails on
    /// configuration
    pub fn new(
        lexical: Arc<dyn LexicalIndex>,
        vector: Arc<dyn VectorIndex>,
        config: RetrievalConfig,
    ) -> Result<Self, FusionError> {
        let fusion = FusionConfig::new(config.rrf_k, config.lexical_weight, config.vector_weight)?;
        Ok(Self {
            lexical,
            vector,
            fusion,
            config,
        })
    }

    /// Run both backends concurrently and fuse their rankings
    pub async fn retrieve(
        &self,
        query: &Query,
        filters: &SearchFilters,
        k: usize,
    ) -> RetrievalOutcome {
        let lexical_query = self.expand_for_lexical(query);
        let vector_query = query.reformulated_text.as_str();
        let fetch = k * self.config.candidate_multiplier;
        let budget = Duration::from_millis(self.config.backend_timeout_ms);

        // Issue both calls before awaiting either
        let lexical_fut = timeout(budget, self.lexical.search(&lexical_query, filters, fetch));
        let vector_fut = timeout(budget, self.vector.search(vector_query, filters, fetch));
        let (lexical_res, vector_res) = tokio::join!(lexical_fut, vector_fut);

        let (lexical_hits, lexical_ok) = flatten("lexical", query, lexical_res);
        let (vector_hits, vector_ok) = flatten("vector", query, vector_res);

        let mut hits = reciprocal_rank_fusion(&lexical_hits, &vector_hits, &self.fusion);
        hits.truncate(k);

        tracing::debug!(
            query = %query.id,
            lexical = lexical_hits.len(),
            vector = vector_hits.len(),
            fused = hits.len(),
            "retrieval complete"
        );

        RetrievalOutcome {
            hits,
            lexical_ok,
            vector_ok,
        }
    }

    /// Append domain synonyms the text does not already carry
    fn expand_for_lexical(&self, query: &Query) -> String {
        let mut text = query.reformulated_text.clone();
        let lower = text.to_lowercase();

        if let Some(field) = query.type_params.field {
            for (rule_field, synonyms) in LEXICAL_SYNONYMS {
                if *rule_field != field {
                    continue;
                }
                for synonym in *synonyms {
                    if !lower.contains(synonym) {
                        text.push(' ');
                        text.push_str(synonym);
                    }
                }
            }
        }

        text
    }
}

/// Collapse a timed-out or failed backend response into an empty ranking
fn flatten(
    backend: &str,
    query: &Query,
    result: Result<Result<Vec<RankedHit>, crate::index::BackendError>, tokio::time::error::Elapsed>,
) -> (Vec<RankedHit>, bool) {
    match result {
        Ok(Ok(hits)) => (hits, true),
        Ok(Err(e)) => {
            tracing::warn!(query = %query.id, backend, "backend failed: {}", e);
            (Vec::new(), false)
        }
        Err(_) => {
            tracing::warn!(query = %query.id, backend, "backend exceeded timeout budget");
            (Vec::new(), false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::BackendError;
    use crate::query::{QuestionType, TypeParams};
    use async_trait::async_trait;
    use uuid::Uuid;

    struct CannedBackend {
        hits: Vec<RankedHit>,
        delay: Duration,
    }

    #[async_trait]
    impl LexicalIndex for CannedBackend {
        async fn search(
            &self,
            _query: &str,
            _filters: &SearchFilters,
            k: usize,
        ) -> Result<Vec<RankedHit>, BackendError> {
            tokio::time::sleep(self.delay).await;
            Ok(self.hits.iter().take(k).cloned().collect())
        }
    }

    #[async_trait]
    impl VectorIndex for CannedBackend {
        async fn search(
            &self,
            _query: &str,
            _filters: &SearchFilters,
            k: usize,
        ) -> Result<Vec<RankedHit>, BackendError> {
            tokio::time::sleep(self.delay).await;
            Ok(self.hits.iter().take(k).cloned().collect())
        }
    }

    fn hit(chunk_id: &str, rank: usize) -> RankedHit {
        RankedHit {
            chunk_id: chunk_id.to_string(),
            document_id: "doc-1".to_string(),
            backend_rank: rank,
            backend_score: 1.0,
            section_type: None,
            clause_number: None,
            page_num: None,
            span_start: 0,
            span_end: 5,
            source_uri: String::new(),
            text: chunk_id.to_string(),
        }
    }

    fn query(field: Option<StructuredField>) -> Query {
        Query {
            id: Uuid::new_v4(),
            raw_text: "q".to_string(),
            normalized_text: "q".to_string(),
            reformulated_text: "what is the governing state".to_string(),
            question_type: QuestionType::General,
            type_params: TypeParams {
                field,
                clause_name: None,
                date_range: None,
            },
            document_filter: None,
            date_range: None,
        }
    }

    fn retriever(
        lexical: CannedBackend,
        vector: CannedBackend,
        timeout_ms: u64,
    ) -> FusionRetriever {
        let config = RetrievalConfig {
            backend_timeout_ms: timeout_ms,
            ..RetrievalConfig::default()
        };
        FusionRetriever::new(Arc::new(lexical), Arc::new(vector), config).unwrap()
    }

    #[tokio::test]
    async fn test_both_backends_fused() {
        let lexical = CannedBackend {
            hits: vec![hit("C1", 1), hit("C2", 2)],
            delay: Duration::ZERO,
        };
        let vector = CannedBackend {
            hits: vec![hit("C2", 1), hit("C3", 2)],
            delay: Duration::ZERO,
        };

        let outcome = retriever(lexical, vector, 1000)
            .retrieve(&query(None), &SearchFilters::none(), 10)
            .await;

        assert!(!outcome.is_partial());
        assert!(!outcome.is_failed());
        assert_eq!(outcome.hits[0].chunk_id, "C2");
        assert_eq!(outcome.hits.len(), 3);
    }

    #[tokio::test]
    async fn test_slow_backend_degrades_to_partial() {
        let lexical = CannedBackend {
            hits: vec![hit("C1", 1)],
            delay: Duration::ZERO,
        };
        let vector = CannedBackend {
            hits: vec![hit("C9", 1)],
            delay: Duration::from_millis(300),
        };

        let outcome = retriever(lexical, vector, 40)
            .retrieve(&query(None), &SearchFilters::none(), 10)
            .await;

        assert!(outcome.is_partial());
        assert!(!outcome.is_failed());
        assert_eq!(outcome.hits.len(), 1);
        assert_eq!(outcome.hits[0].chunk_id, "C1");
    }

    #[tokio::test]
    async fn test_both_timing_out_is_failure_not_panic() {
        let lexical = CannedBackend {
            hits: vec![hit("C1", 1)],
            delay: Duration::from_millis(300),
        };
        let vector = CannedBackend {
            hits: vec![hit("C2", 1)],
            delay: Duration::from_millis(300),
        };

        let outcome = retriever(lexical, vector, 40)
            .retrieve(&query(None), &SearchFilters::none(), 10)
            .await;

        assert!(outcome.is_failed());
        assert!(outcome.hits.is_empty());
    }

    #[tokio::test]
    async fn test_lexical_query_gets_synonyms() {
        let lexical = CannedBackend {
            hits: Vec::new(),
            delay: Duration::ZERO,
        };
        let vector = CannedBackend {
            hits: Vec::new(),
            delay: Duration::ZERO,
        };
        let r = retriever(lexical, vector, 1000);

        let expanded = r.expand_for_lexical(&query(Some(StructuredField::GoverningLaw)));
        assert!(expanded.contains("governing law"));
        assert!(expanded.contains("jurisdiction"));

        // Vector text stays untouched; no-field queries stay untouched
        let plain = r.expand_for_lexical(&query(None));
        assert_eq!(plain, "what is the governing state");
    }

    #[tokio::test]
    async fn test_results_truncated_to_k() {
        let many: Vec<RankedHit> = (1..=20).map(|i| hit(&format!("C{i:02}"), i)).collect();
        let lexical = CannedBackend {
            hits: many.clone(),
            delay: Duration::ZERO,
        };
        let vector = CannedBackend {
            hits: many,
            delay: Duration::ZERO,
        };

        let outcome = retriever(lexical, vector, 1000)
            .retrieve(&query(None), &SearchFilters::none(), 5)
            .await;

        assert_eq!(outcome.hits.len(), 5);
    }
}
