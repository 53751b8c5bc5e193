//! Metadata shortcut: answering structured questions without retrieval
//!
//! When classification already names a metadata field and resolution already
//! names a document, the stored field value answers the question directly.
//! A miss at any step falls back to fused retrieval; a store failure is
//! reported upward so the engine can degrade the same way.

use crate::index::{BackendError, FieldOrigin, FieldValue, MetadataField, MetadataStore, StoredField};
use crate::query::StructuredField;
use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A structured-field answer with its human-readable rendering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataAnswer {
    pub document_id: String,
    pub field: StructuredField,
    /// Rendering used verbatim as the citation excerpt
    pub rendered: String,
    /// Source location of the field value, when ingestion recorded one
    pub origin: Option<FieldOrigin>,
}

/// Shortcut evaluator over the structured-metadata store
pub struct MetadataShortcut {
    store: Arc<dyn MetadataStore>,
}

impl MetadataShortcut {
    pub fn new(store: Arc<dyn MetadataStore>) -> Self {
        Self { store }
    }

    /// Try to answer a structured question from stored fields
    ///
    /// `Ok(None)` means a needed field was never extracted for this
    /// document; the caller falls through to retrieval.
    pub async fn answer(
        &self,
        document_id: &str,
        field: StructuredField,
    ) -> Result<Option<MetadataAnswer>, BackendError> {
        let answer = match field {
            StructuredField::EffectiveDate => self.effective_date(document_id).await?,
            StructuredField::ExpirationDate => self.expiration_date(document_id).await?,
            StructuredField::GoverningLaw => self.governing_law(document_id).await?,
            StructuredField::TermLength => self.term_length(document_id).await?,
            StructuredField::Mutuality => self.mutuality(document_id).await?,
            StructuredField::Parties => self.parties(document_id).await?,
        };

        if answer.is_none() {
            tracing::debug!(document_id, field = %field, "no stored value, shortcut missed");
        }

        Ok(answer)
    }

    async fn effective_date(&self, doc: &str) -> Result<Option<MetadataAnswer>, BackendError> {
        let Some((date, origin)) = self.date_field(doc, MetadataField::EffectiveDate).await?
        else {
            return Ok(None);
        };
        Ok(Some(MetadataAnswer {
            document_id: doc.to_string(),
            field: StructuredField::EffectiveDate,
            rendered: format!("Effective date: {}", render_date(date)),
            origin,
        }))
    }

    /// The store holds no expiration field; it is derived from the
    /// effective date plus the term
    async fn expiration_date(&self, doc: &str) -> Result<Option<MetadataAnswer>, BackendError> {
        let Some((effective, origin)) = self.date_field(doc, MetadataField::EffectiveDate).await?
        else {
            return Ok(None);
        };
        let Some((months, _)) = self.months_field(doc, MetadataField::TermMonths).await? else {
            return Ok(None);
        };
        let Some(expiration) = effective.checked_add_months(Months::new(months)) else {
            return Ok(None);
        };

        Ok(Some(MetadataAnswer {
            document_id: doc.to_string(),
            field: StructuredField::ExpirationDate,
            rendered: format!(
                "Expires on {} ({} months after the effective date of {})",
                render_date(expiration),
                months,
                render_date(effective)
            ),
            origin,
        }))
    }

    async fn governing_law(&self, doc: &str) -> Result<Option<MetadataAnswer>, BackendError> {
        let Some(stored) = self.store.get_field(doc, MetadataField::GoverningLaw).await? else {
            return Ok(None);
        };
        let FieldValue::Text(law) = stored.value else {
            return mismatch(doc, MetadataField::GoverningLaw);
        };
        Ok(Some(MetadataAnswer {
            document_id: doc.to_string(),
            field: StructuredField::GoverningLaw,
            rendered: format!("Governing law: {}", law),
            origin: stored.origin,
        }))
    }

    async fn term_length(&self, doc: &str) -> Result<Option<MetadataAnswer>, BackendError> {
        let Some((term, origin)) = self.months_field(doc, MetadataField::TermMonths).await? else {
            return Ok(None);
        };

        let mut rendered = format!("Term: {} months", term);
        if let Some((survival, _)) = self.months_field(doc, MetadataField::SurvivalMonths).await? {
            rendered.push_str(&format!(
                "; confidentiality obligations survive {} months after termination",
                survival
            ));
        }

        Ok(Some(MetadataAnswer {
            document_id: doc.to_string(),
            field: StructuredField::TermLength,
            rendered,
            origin,
        }))
    }

    async fn mutuality(&self, doc: &str) -> Result<Option<MetadataAnswer>, BackendError> {
        let Some(stored) = self.store.get_field(doc, MetadataField::IsMutual).await? else {
            return Ok(None);
        };
        let FieldValue::Flag(is_mutual) = stored.value else {
            return mismatch(doc, MetadataField::IsMutual);
        };

        let rendered = if is_mutual {
            "This is a mutual agreement: confidentiality obligations bind both parties".to_string()
        } else {
            "This is a one-way agreement: only the receiving party is bound".to_string()
        };

        Ok(Some(MetadataAnswer {
            document_id: doc.to_string(),
            field: StructuredField::Mutuality,
            rendered,
            origin: stored.origin,
        }))
    }

    async fn parties(&self, doc: &str) -> Result<Option<MetadataAnswer>, BackendError> {
        let Some(stored) = self.store.get_field(doc, MetadataField::Parties).await? else {
            return Ok(None);
        };
        let FieldValue::Names(names) = stored.value else {
            return mismatch(doc, MetadataField::Parties);
        };
        if names.is_empty() {
            return Ok(None);
        }

        let rendered = match names.len() {
            1 => format!("Party: {}", names[0]),
            2 => format!("Parties: {} and {}", names[0], names[1]),
            _ => format!("Parties: {}", names.join(", ")),
        };

        Ok(Some(MetadataAnswer {
            document_id: doc.to_string(),
            field: StructuredField::Parties,
            rendered,
            origin: stored.origin,
        }))
    }

    async fn date_field(
        &self,
        doc: &str,
        field: MetadataField,
    ) -> Result<Option<(NaiveDate, Option<FieldOrigin>)>, BackendError> {
        let Some(StoredField { value, origin }) = self.store.get_field(doc, field).await? else {
            return Ok(None);
        };
        match value {
            FieldValue::Date(date) => Ok(Some((date, origin))),
            _ => {
                tracing::warn!(document_id = doc, field = %field, "unexpected value type in store");
                Ok(None)
            }
        }
    }

    async fn months_field(
        &self,
        doc: &str,
        field: MetadataField,
    ) -> Result<Option<(u32, Option<FieldOrigin>)>, BackendError> {
        let Some(StoredField { value, origin }) = self.store.get_field(doc, field).await? else {
            return Ok(None);
        };
        match value {
            FieldValue::Months(months) => Ok(Some((months, origin))),
            _ => {
                tracing::warn!(document_id = doc, field = %field, "unexpected value type in store");
                Ok(None)
            }
        }
    }
}

fn mismatch(doc: &str, field: MetadataField) -> Result<Option<MetadataAnswer>, BackendError> {
    tracing::warn!(document_id = doc, field = %field, "unexpected value type in store");
    Ok(None)
}

fn render_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}
