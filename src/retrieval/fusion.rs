//! Reciprocal Rank Fusion for combining the two backend rankings

use crate::index::RankedHit;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FusionError {
    #[error("Invalid weight configuration: weights must be positive")]
    InvalidWeights,
}

/// Configuration for the fusion algorithm
#[derive(Debug, Clone)]
pub struct FusionConfig {
    /// RRF K constant (typically 60)
    pub rrf_k: f64,

    /// Weight for lexical results
    pub lexical_weight: f64,

    /// Weight for vector results
    pub vector_weight: f64,
}

impl FusionConfig {
    pub fn new(rrf_k: f64, lexical_weight: f64, vector_weight: f64) -> Result<Self, FusionError> {
        if rrf_k <= 0.0 || lexical_weight <= 0.0 || vector_weight <= 0.0 {
            return Err(FusionError::InvalidWeights);
        }

        Ok(Self {
            rrf_k,
            lexical_weight,
            vector_weight,
        })
    }
}

/// A passage after rank fusion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusedHit {
    pub chunk_id: String,
    pub document_id: String,

    /// Summed RRF contributions across the backends this hit appeared in
    pub rrf_score: f64,

    /// Which backends returned this hit
    pub in_lexical: bool,
    pub in_vector: bool,

    /// Best (minimum) rank across contributing backends
    pub best_rank: usize,

    pub section_type: Option<String>,
    pub clause_number: Option<String>,
    pub page_num: Option<u32>,
    pub span_start: usize,
    pub span_end: usize,
    pub source_uri: String,
    pub text: String,
}

impl FusedHit {
    pub fn contributing_backends(&self) -> u8 {
        self.in_lexical as u8 + self.in_vector as u8
    }

    fn from_hit(hit: &RankedHit) -> Self {
        Self {
            chunk_id: hit.chunk_id.clone(),
            document_id: hit.document_id.clone(),
            rrf_score: 0.0,
            in_lexical: false,
            in_vector: false,
            best_rank: usize::MAX,
            section_type: hit.section_type.clone(),
            clause_number: hit.clause_number.clone(),
            page_num: hit.page_num,
            span_start: hit.span_start,
            span_end: hit.span_end,
            source_uri: hit.source_uri.clone(),
            text: hit.text.clone(),
        }
    }

    /// Keep whichever backend carried the richer passage text
    fn absorb_fields(&mut self, hit: &RankedHit) {
        if hit.text.len() > self.text.len() {
            self.section_type = hit.section_type.clone();
            self.clause_number = hit.clause_number.clone();
            self.page_num = hit.page_num;
            self.span_start = hit.span_start;
            self.span_end = hit.span_end;
            self.source_uri = hit.source_uri.clone();
            self.text = hit.text.clone();
        }
    }
}

/// Apply Reciprocal Rank Fusion to combine two ranked lists
///
/// Each appearance at rank `r` contributes `weight / (k + r)`; a hit's
/// score is the sum over the backends that returned it. Rank is the
/// 1-based position in the backend's list; backend-native scores are
/// ignored. Ties are broken deterministically: both-backends presence,
/// then lower best rank, then chunk id.
pub fn reciprocal_rank_fusion(
    lexical_results: &[RankedHit],
    vector_results: &[RankedHit],
    config: &FusionConfig,
) -> Vec<FusedHit> {
    let mut fused: Vec<FusedHit> = Vec::new();
    let mut by_chunk: AHashMap<String, usize> = AHashMap::new();

    let mut accumulate = |hits: &[RankedHit], weight: f64, lexical: bool| {
        for (position, hit) in hits.iter().enumerate() {
            let rank = position + 1;
            let contribution = weight / (config.rrf_k + rank as f64);

            let idx = *by_chunk.entry(hit.chunk_id.clone()).or_insert_with(|| {
                fused.push(FusedHit::from_hit(hit));
                fused.len() - 1
            });

            let entry = &mut fused[idx];
            entry.rrf_score += contribution;
            entry.best_rank = entry.best_rank.min(rank);
            if lexical {
                entry.in_lexical = true;
            } else {
                entry.in_vector = true;
            }
            entry.absorb_fields(hit);
        }
    };

    accumulate(lexical_results, config.lexical_weight, true);
    accumulate(vector_results, config.vector_weight, false);

    fused.sort_by(|a, b| {
        b.rrf_score
            .partial_cmp(&a.rrf_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.contributing_backends().cmp(&a.contributing_backends()))
            .then_with(|| a.best_rank.cmp(&b.best_rank))
            .then_with(|| a.chunk_id.cmp(&b.chunk_id))
    });

    fused
}
