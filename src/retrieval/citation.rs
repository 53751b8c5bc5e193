//! Citation assembly
//!
//! Converts fused hits (or a metadata shortcut answer) into deduplicated,
//! bounded citation records ready for the answer-generation layer.

use crate::config::CitationConfig;
use crate::retrieval::FusedHit;
use crate::shortcut::MetadataAnswer;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Provenance record backing one piece of evidence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Citation {
    pub doc_id: String,
    pub clause_number: Option<String>,
    pub page_num: Option<u32>,
    pub span_start: usize,
    pub span_end: usize,
    /// Empty for synthetic metadata citations with no recorded origin
    pub source_uri: String,
    pub excerpt: String,
}

impl Citation {
    /// A zero-length span marks field-level evidence with no passage behind
    /// it; consumers must not read it as a retrieval failure
    pub fn is_passage_backed(&self) -> bool {
        self.span_end > self.span_start
    }
}

/// Build citations from fused hits, highest-ranked first
///
/// At most one citation survives per `(doc_id, span_start, span_end)`;
/// the first-seen occurrence wins.
pub fn assemble_citations(hits: &[FusedHit], config: &CitationConfig) -> Vec<Citation> {
    let mut seen: HashSet<(String, usize, usize)> = HashSet::new();

    hits.iter()
        .filter(|hit| {
            seen.insert((hit.document_id.clone(), hit.span_start, hit.span_end))
        })
        .map(|hit| Citation {
            doc_id: hit.document_id.clone(),
            clause_number: hit.clause_number.clone(),
            page_num: hit.page_num,
            span_start: hit.span_start,
            span_end: hit.span_end,
            source_uri: hit.source_uri.clone(),
            excerpt: truncate_excerpt(
                &hit.text,
                config.max_excerpt_chars,
                config.boundary_tolerance,
            ),
        })
        .collect()
}

/// The single synthetic citation for a metadata shortcut answer
pub fn metadata_citation(answer: &MetadataAnswer, config: &CitationConfig) -> Citation {
    let (page_num, span_start, span_end, source_uri) = match &answer.origin {
        Some(origin) => (
            origin.page_num,
            origin.span_start,
            origin.span_end,
            origin.source_uri.clone(),
        ),
        None => (None, 0, 0, String::new()),
    };

    Citation {
        doc_id: answer.document_id.clone(),
        clause_number: None,
        page_num,
        span_start,
        span_end,
        source_uri,
        excerpt: truncate_excerpt(
            &answer.rendered,
            config.max_excerpt_chars,
            config.boundary_tolerance,
        ),
    }
}

/// Cap excerpt length, preferring a sentence or clause boundary within the
/// tolerance window before the hard limit
fn truncate_excerpt(text: &str, max_chars: usize, tolerance: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_chars {
        return text.to_string();
    }

    let window_start = max_chars.saturating_sub(tolerance);
    let boundary = (window_start..max_chars)
        .rev()
        .find(|&i| matches!(chars[i], '.' | ';' | '\n'));

    let cut = match boundary {
        Some(i) => i + 1,
        None => max_chars,
    };

    chars[..cut].iter().collect::<String>().trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::FieldOrigin;
    use crate::query::StructuredField;

    fn fused(doc: &str, span: (usize, usize), text: &str) -> FusedHit {
        FusedHit {
            chunk_id: format!("{doc}:{}:{}", span.0, span.1),
            document_id: doc.to_string(),
            rrf_score: 0.02,
            in_lexical: true,
            in_vector: false,
            best_rank: 1,
            section_type: None,
            clause_number: Some("7.2".to_string()),
            page_num: Some(3),
            span_start: span.0,
            span_end: span.1,
            source_uri: format!("file:///{doc}.pdf"),
            text: text.to_string(),
        }
    }

    fn config() -> CitationConfig {
        CitationConfig::default()
    }

    #[test]
    fn test_duplicate_spans_collapse() {
        let hits = vec![
            fused("doc-1", (100, 200), "first occurrence"),
            fused("doc-1", (100, 200), "same span seen again"),
            fused("doc-1", (300, 400), "different span"),
            fused("doc-2", (100, 200), "same span, different document"),
        ];

        let citations = assemble_citations(&hits, &config());
        assert_eq!(citations.len(), 3);
        // First-seen (highest ranked) occurrence wins
        assert_eq!(citations[0].excerpt, "first occurrence");

        let mut keys: Vec<(String, usize, usize)> = citations
            .iter()
            .map(|c| (c.doc_id.clone(), c.span_start, c.span_end))
            .collect();
        let before = keys.len();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), before, "emitted citations must have unique spans");
    }

    #[test]
    fn test_short_excerpt_untouched() {
        let hits = vec![fused("doc-1", (0, 20), "short passage.")];
        let citations = assemble_citations(&hits, &config());
        assert_eq!(citations[0].excerpt, "short passage.");
    }

    #[test]
    fn test_truncation_prefers_sentence_boundary() {
        // A period sits inside the tolerance window before the 500-char cap
        let sentence = "This agreement shall remain in force. ".repeat(14);
        assert!(sentence.len() > 500);

        let excerpt = truncate_excerpt(&sentence, 500, 80);
        assert!(excerpt.len() <= 500);
        assert!(excerpt.ends_with('.'), "cut should land after a period: {excerpt:?}");
    }

    #[test]
    fn test_truncation_hard_cut_without_boundary() {
        let unbroken = "x".repeat(900);
        let excerpt = truncate_excerpt(&unbroken, 500, 80);
        assert_eq!(excerpt.chars().count(), 500);
    }

    #[test]
    fn test_truncation_is_char_safe() {
        let accented = "é".repeat(600);
        let excerpt = truncate_excerpt(&accented, 500, 80);
        assert_eq!(excerpt.chars().count(), 500);
    }

    #[test]
    fn test_metadata_citation_with_origin() {
        let answer = MetadataAnswer {
            document_id: "doc-1".to_string(),
            field: StructuredField::GoverningLaw,
            rendered: "Governing law: Delaware".to_string(),
            origin: Some(FieldOrigin {
                page_num: Some(6),
                span_start: 1200,
                span_end: 1240,
                source_uri: "file:///doc-1.pdf".to_string(),
            }),
        };

        let citation = metadata_citation(&answer, &config());
        assert_eq!(citation.doc_id, "doc-1");
        assert_eq!(citation.page_num, Some(6));
        assert!(citation.is_passage_backed());
        assert_eq!(citation.excerpt, "Governing law: Delaware");
    }

    #[test]
    fn test_metadata_citation_without_origin_has_zero_span() {
        let answer = MetadataAnswer {
            document_id: "doc-1".to_string(),
            field: StructuredField::Mutuality,
            rendered: "This is a mutual agreement".to_string(),
            origin: None,
        };

        let citation = metadata_citation(&answer, &config());
        assert_eq!(citation.span_start, 0);
        assert_eq!(citation.span_end, 0);
        assert!(!citation.is_passage_backed());
    }
}
