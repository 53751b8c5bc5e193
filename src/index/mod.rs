//! Collaborator interfaces for the retrieval backends and directories
//!
//! This crate owns no index, store, or wire format; it talks to the lexical
//! index, the vector index, the structured-metadata store, and the document
//! directory through these traits. Backend score semantics are opaque: only
//! rank order is trusted.

use crate::query::DateRange;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure of a single collaborator call. Recovered locally wherever
/// possible: one failed retrieval backend degrades to partial results, a
/// failed directory or store call degrades to "no filter" / "no shortcut".
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Backend timed out")]
    Timeout,

    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed backend response: {0}")]
    Malformed(String),
}

/// Filters pushed down into backend queries, never post-applied
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchFilters {
    /// Restrict both backends to a single resolved document
    pub document_id: Option<String>,
    /// Restrict to documents created inside this range
    pub date_range: Option<DateRange>,
}

impl SearchFilters {
    pub fn none() -> Self {
        Self::default()
    }
}

/// A single retrieval result from one backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedHit {
    /// Passage identifier, unique corpus-wide
    pub chunk_id: String,

    /// Owning document
    pub document_id: String,

    /// 1-based rank in this backend's result list
    pub backend_rank: usize,

    /// Backend-native relevance score; opaque, kept for diagnostics only
    pub backend_score: f32,

    /// Section label from ingestion, when known
    pub section_type: Option<String>,

    /// Clause number within the document, when known
    pub clause_number: Option<String>,

    /// Page the passage starts on
    pub page_num: Option<u32>,

    /// Character span in the source document; end is exclusive and
    /// strictly greater than start
    pub span_start: usize,
    pub span_end: usize,

    /// URI of the source document
    pub source_uri: String,

    /// Passage text
    pub text: String,
}

/// Keyword/term-frequency search backend
#[async_trait]
pub trait LexicalIndex: Send + Sync {
    /// Top-k hits ordered by the backend's own relevance score
    async fn search(
        &self,
        query: &str,
        filters: &SearchFilters,
        k: usize,
    ) -> Result<Vec<RankedHit>, BackendError>;
}

/// Dense-embedding nearest-neighbor search backend
///
/// Takes raw text; embedding happens on the collaborator's side.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    async fn search(
        &self,
        query: &str,
        filters: &SearchFilters,
        k: usize,
    ) -> Result<Vec<RankedHit>, BackendError>;
}

/// Field names understood by the structured-metadata store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataField {
    EffectiveDate,
    GoverningLaw,
    TermMonths,
    SurvivalMonths,
    IsMutual,
    Parties,
}

impl MetadataField {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetadataField::EffectiveDate => "effective_date",
            MetadataField::GoverningLaw => "governing_law",
            MetadataField::TermMonths => "term_months",
            MetadataField::SurvivalMonths => "survival_months",
            MetadataField::IsMutual => "is_mutual",
            MetadataField::Parties => "parties",
        }
    }
}

impl std::fmt::Display for MetadataField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured metadata value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldValue {
    Date(NaiveDate),
    Months(u32),
    Text(String),
    Flag(bool),
    Names(Vec<String>),
}

/// Where a stored field value was extracted from, when ingestion recorded it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldOrigin {
    pub page_num: Option<u32>,
    pub span_start: usize,
    pub span_end: usize,
    pub source_uri: String,
}

/// A stored field value plus optional provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredField {
    pub value: FieldValue,
    pub origin: Option<FieldOrigin>,
}

/// Structured-metadata store populated during ingestion
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// `Ok(None)` means the field was never extracted for this document
    async fn get_field(
        &self,
        document_id: &str,
        field: MetadataField,
    ) -> Result<Option<StoredField>, BackendError>;
}

/// A known party name tied to a document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartyRecord {
    pub document_id: String,
    pub name: String,
}

/// A known source filename tied to a document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilenameRecord {
    pub document_id: String,
    pub filename: String,
}

/// Directory of known parties and filenames, plus bounded access to indexed
/// document text for the resolver's location re-ranking
#[async_trait]
pub trait DocumentDirectory: Send + Sync {
    async fn party_records(&self) -> Result<Vec<PartyRecord>, BackendError>;

    async fn filenames(&self) -> Result<Vec<FilenameRecord>, BackendError>;

    /// Up to `max_chars` of a document's indexed text, `Ok(None)` if the
    /// document has no indexed text
    async fn text_window(
        &self,
        document_id: &str,
        max_chars: usize,
    ) -> Result<Option<String>, BackendError>;
}
