//! Fuzzy document/entity resolution
//!
//! Maps a company-name fragment from the question onto known party names
//! and filenames, producing ranked candidate documents. Finding nothing is
//! not an error: the caller runs unfiltered retrieval instead.

mod extract;
mod location;
mod scoring;

pub use extract::FragmentExtractor;
pub use location::has_location_intent;
pub use scoring::fuzzy_score;

use crate::config::ResolverConfig;
use crate::error::Result;
use crate::index::{DocumentDirectory, FilenameRecord, PartyRecord};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// What a candidate was matched against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    PartyName,
    Filename,
}

/// A candidate document produced by fuzzy resolution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateMatch {
    pub document_id: String,
    /// The party name or filename the fragment matched
    pub matched_value: String,
    pub match_kind: MatchKind,
    /// In [0, 1]; 1.0 only for exact matches
    pub confidence: f32,
}

/// Fuzzy entity resolver
pub struct EntityResolver {
    config: ResolverConfig,
    extractor: FragmentExtractor,
}

impl EntityResolver {
    pub fn new(config: ResolverConfig) -> Result<Self> {
        Ok(Self {
            config,
            extractor: FragmentExtractor::new()?,
        })
    }

    /// Extract a company-name fragment from the raw question
    pub fn extract_fragment(&self, raw: &str) -> Option<String> {
        self.extractor.extract(raw)
    }

    /// Score the fragment against every known party name and filename
    ///
    /// Returns the full candidate list (one entry per document, best score
    /// wins), sorted by confidence descending with stable ties. The
    /// confidence floor is applied by [`EntityResolver::best_match`], not
    /// here, so callers can always inspect the raw ranking.
    pub fn resolve(
        &self,
        fragment: &str,
        parties: &[PartyRecord],
        filenames: &[FilenameRecord],
    ) -> Vec<CandidateMatch> {
        let mut candidates: Vec<CandidateMatch> = Vec::new();
        let mut best_by_doc: AHashMap<String, usize> = AHashMap::new();

        let mut consider = |document_id: &str, value: &str, kind: MatchKind, confidence: f32| {
            match best_by_doc.get(document_id) {
                Some(&idx) => {
                    if confidence > candidates[idx].confidence {
                        candidates[idx] = CandidateMatch {
                            document_id: document_id.to_string(),
                            matched_value: value.to_string(),
                            match_kind: kind,
                            confidence,
                        };
                    }
                }
                None => {
                    best_by_doc.insert(document_id.to_string(), candidates.len());
                    candidates.push(CandidateMatch {
                        document_id: document_id.to_string(),
                        matched_value: value.to_string(),
                        match_kind: kind,
                        confidence,
                    });
                }
            }
        };

        for party in parties {
            let confidence = fuzzy_score(fragment, &party.name);
            consider(&party.document_id, &party.name, MatchKind::PartyName, confidence);
        }

        for file in filenames {
            let confidence = fuzzy_score(fragment, &file_stem(&file.filename));
            consider(&file.document_id, &file.filename, MatchKind::Filename, confidence);
        }

        // Stable: ties keep discovery order
        candidates.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        candidates
    }

    /// The best candidate above the confidence floor, if any
    pub fn best_match<'a>(&self, candidates: &'a [CandidateMatch]) -> Option<&'a CandidateMatch> {
        candidates
            .iter()
            .find(|c| c.confidence >= self.config.confidence_floor)
    }

    /// Candidates surviving the confidence floor
    pub fn surviving<'a>(&self, candidates: &'a [CandidateMatch]) -> Vec<&'a CandidateMatch> {
        candidates
            .iter()
            .filter(|c| c.confidence >= self.config.confidence_floor)
            .collect()
    }

    /// Re-rank candidates for location-intent questions
    ///
    /// Scans a bounded window of each surviving candidate's indexed text for
    /// corporate-office phrases and adds a fixed confidence boost.
    /// Deterministic re-ranking over already-resolved candidates, never a
    /// new retrieval.
    pub async fn apply_location_boost(
        &self,
        candidates: &mut [CandidateMatch],
        directory: &dyn DocumentDirectory,
    ) {
        location::apply_boost(&self.config, candidates, directory).await;
    }
}

/// Filename without extension, separators softened for fuzzy comparison
fn file_stem(filename: &str) -> String {
    let stem = filename.rsplit_once('.').map_or(filename, |(stem, _)| stem);
    stem.replace(['_', '-'], " ")
}
