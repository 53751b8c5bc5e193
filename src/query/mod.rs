//! Query understanding: normalization, reformulation, and classification
//!
//! Turns irregular free-text questions into a typed, immutable [`Query`]
//! before any retrieval work happens.

mod classifier;
mod dates;
mod normalizer;

pub use classifier::{Classifier, TypeParams};
pub use dates::{DateExtractor, DateRange};
pub use normalizer::Normalizer;

pub(crate) use normalizer::contains_word;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Question type assigned by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    /// Answerable from structured metadata fields
    Structured,
    /// Asks about a specific clause
    Clause,
    /// Scoped to a calendar date range
    DateRange,
    /// Compares or aggregates across documents
    CrossDocument,
    /// Catch-all: free-text retrieval
    General,
}

/// Structured metadata field a question targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructuredField {
    EffectiveDate,
    ExpirationDate,
    GoverningLaw,
    TermLength,
    Mutuality,
    Parties,
}

impl StructuredField {
    pub fn as_str(&self) -> &'static str {
        match self {
            StructuredField::EffectiveDate => "effective_date",
            StructuredField::ExpirationDate => "expiration_date",
            StructuredField::GoverningLaw => "governing_law",
            StructuredField::TermLength => "term_length",
            StructuredField::Mutuality => "mutuality",
            StructuredField::Parties => "parties",
        }
    }
}

impl std::fmt::Display for StructuredField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully understood query
///
/// Built once per request and immutable afterwards; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    /// Request-scoped identifier, used for log correlation
    pub id: Uuid,

    /// Text exactly as the user typed it
    pub raw_text: String,

    /// After misspelling correction and whitespace cleanup
    pub normalized_text: String,

    /// After filler stripping and canonical rewrites
    pub reformulated_text: String,

    /// Classification result
    pub question_type: QuestionType,

    /// Parameters extracted during classification
    pub type_params: TypeParams,

    /// Resolved document id, when entity resolution found one
    pub document_filter: Option<String>,

    /// Calendar range extracted from the question, if any
    pub date_range: Option<DateRange>,
}
