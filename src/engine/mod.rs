//! Request orchestration
//!
//! One request, one task: normalize, classify, resolve, then either the
//! metadata shortcut or fused retrieval, and finally citation assembly.
//! Every per-request object is owned by this task and dropped at response
//! time; nothing is shared across requests.

use crate::config::{Config, ConfigValidator};
use crate::error::{DocketError, Result};
use crate::index::{
    DocumentDirectory, LexicalIndex, MetadataStore, SearchFilters, VectorIndex,
};
use crate::query::{Classifier, Normalizer, Query, QuestionType};
use crate::resolver::{has_location_intent, CandidateMatch, EntityResolver};
use crate::retrieval::{
    assemble_citations, metadata_citation, Citation, FusionRetriever,
};
use crate::shortcut::MetadataShortcut;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// How much the downstream generator should trust the evidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceHint {
    /// Answered from structured metadata: high trust, single citation
    Structured,
    /// Answered from fused retrieval: variable trust, multiple citations
    Fused,
}

/// Whether retrieval ran with full, partial, or no backend coverage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalStatus {
    Complete,
    /// One backend timed out or failed; results come from the other
    Partial,
    /// Both backends unavailable; render "no evidence found", don't crash
    Failed,
}

/// The upward interface toward the answer-generation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryOutcome {
    /// The fully understood query, for diagnostics and echo
    pub query: Query,

    /// Ordered, deduplicated evidence
    pub citations: Vec<Citation>,

    pub question_type: QuestionType,
    pub confidence: ConfidenceHint,
    pub status: RetrievalStatus,

    /// Full candidate ranking from entity resolution, for inspection;
    /// entries below the confidence floor are included
    pub candidates: Vec<CandidateMatch>,
}

/// The query-understanding and retrieval engine
pub struct QueryEngine {
    config: Config,
    normalizer: Normalizer,
    classifier: Classifier,
    resolver: EntityResolver,
    retriever: FusionRetriever,
    shortcut: MetadataShortcut,
    directory: Arc<dyn DocumentDirectory>,
}

impl QueryEngine {
    /// Wire the engine against its collaborators
    ///
    /// Configuration is validated here, once; an invalid weight or timeout
    /// fails construction rather than surfacing per-request.
    pub fn new(
        config: Config,
        lexical: Arc<dyn LexicalIndex>,
        vector: Arc<dyn VectorIndex>,
        store: Arc<dyn MetadataStore>,
        directory: Arc<dyn DocumentDirectory>,
    ) -> Result<Self> {
        ConfigValidator::validate(&config)?;

        let retriever = FusionRetriever::new(lexical, vector, config.retrieval.clone())
            .map_err(|e| DocketError::Config(e.to_string()))?;

        Ok(Self {
            normalizer: Normalizer::new()?,
            classifier: Classifier::new()?,
            resolver: EntityResolver::new(config.resolver.clone())?,
            retriever,
            shortcut: MetadataShortcut::new(store),
            directory,
            config,
        })
    }

    /// Answer a free-text question with ranked, citation-backed evidence
    ///
    /// Never returns an error: malformed input classifies as `General`,
    /// failed collaborators degrade the outcome, and both retrieval
    /// backends failing is reported as [`RetrievalStatus::Failed`].
    pub async fn answer(&self, raw: &str) -> QueryOutcome {
        let id = Uuid::new_v4();

        // Understand the question
        let normalized_text = self.normalizer.normalize(raw);
        let reformulated_text = self.normalizer.reformulate(&normalized_text);
        let date_range = self.normalizer.extract_date_range(&reformulated_text);
        let (question_type, type_params) =
            self.classifier.classify(&reformulated_text, date_range.as_ref());

        tracing::debug!(
            query = %id,
            ?question_type,
            field = ?type_params.field,
            "query classified"
        );

        // Resolve a document filter from any company-name fragment
        let candidates = self.resolve_candidates(id, raw, &normalized_text).await;
        let document_filter = self
            .resolver
            .best_match(&candidates)
            .map(|c| c.document_id.clone());

        let query = Query {
            id,
            raw_text: raw.to_string(),
            normalized_text,
            reformulated_text,
            question_type,
            type_params,
            document_filter: document_filter.clone(),
            date_range,
        };

        // Structured questions with a resolved document skip retrieval when
        // the store already holds the answer
        if query.question_type == QuestionType::Structured {
            if let (Some(field), Some(doc)) = (query.type_params.field, &document_filter) {
                match self.shortcut.answer(doc, field).await {
                    Ok(Some(answer)) => {
                        tracing::info!(query = %id, field = %field, "answered from metadata");
                        return QueryOutcome {
                            citations: vec![metadata_citation(&answer, &self.config.citation)],
                            question_type,
                            confidence: ConfidenceHint::Structured,
                            status: RetrievalStatus::Complete,
                            candidates,
                            query,
                        };
                    }
                    Ok(None) => {}
                    Err(e) => {
                        tracing::warn!(query = %id, "metadata store unavailable, falling back to retrieval: {}", e);
                    }
                }
            }
        }

        // Fused retrieval
        let filters = SearchFilters {
            document_id: document_filter,
            date_range: query.date_range,
        };
        let outcome = self
            .retriever
            .retrieve(&query, &filters, self.config.retrieval.top_k)
            .await;

        let status = if outcome.is_failed() {
            tracing::warn!(query = %id, "both retrieval backends unavailable");
            RetrievalStatus::Failed
        } else if outcome.is_partial() {
            RetrievalStatus::Partial
        } else {
            RetrievalStatus::Complete
        };

        let citations = assemble_citations(&outcome.hits, &self.config.citation);

        QueryOutcome {
            query,
            citations,
            question_type,
            confidence: ConfidenceHint::Fused,
            status,
            candidates,
        }
    }

    /// Run entity resolution; directory failures degrade to "no filter"
    async fn resolve_candidates(
        &self,
        id: Uuid,
        raw: &str,
        normalized: &str,
    ) -> Vec<CandidateMatch> {
        let Some(fragment) = self.resolver.extract_fragment(raw) else {
            return Vec::new();
        };

        let parties = match self.directory.party_records().await {
            Ok(parties) => parties,
            Err(e) => {
                tracing::warn!(query = %id, "party directory unavailable: {}", e);
                Vec::new()
            }
        };
        let filenames = match self.directory.filenames().await {
            Ok(filenames) => filenames,
            Err(e) => {
                tracing::warn!(query = %id, "filename directory unavailable: {}", e);
                Vec::new()
            }
        };

        let mut candidates = self.resolver.resolve(&fragment, &parties, &filenames);
        tracing::debug!(
            query = %id,
            fragment = %fragment,
            candidates = candidates.len(),
            "entity resolution complete"
        );

        if has_location_intent(normalized) {
            self.resolver
                .apply_location_boost(&mut candidates, &*self.directory)
                .await;
        }

        candidates
    }
}
