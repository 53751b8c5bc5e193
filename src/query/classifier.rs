//! Question-type classification
//!
//! Priority-ordered rules over normalized text. The rule order is a
//! behavioral invariant: expiration keywords are checked before effective
//! date keywords ("expire" questions also mention effectiveness), and term
//! keywords are suppressed when the question is about survival periods.
//! Classification is total: every input lands on exactly one type and the
//! catch-all is `General`.

use crate::error::Result;
use crate::query::dates::DateRange;
use crate::query::normalizer::contains_word;
use crate::query::{QuestionType, StructuredField};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

const CROSS_DOCUMENT_TERMS: &[&str] = &[
    "compare",
    "comparison",
    "across all",
    "difference",
    "differences",
    "versus",
    "vs",
    "between all",
    "all documents",
];

/// Structured-field keyword rules, evaluated strictly in order.
/// Reordering changes behavior.
const STRUCTURED_RULES: &[(StructuredField, &[&str])] = &[
    (
        StructuredField::ExpirationDate,
        &["expiration", "expires", "expire", "expired", "expiry", "end date"],
    ),
    (
        StructuredField::EffectiveDate,
        &["effective date", "effective", "start date", "commencement", "date signed"],
    ),
    (
        StructuredField::GoverningLaw,
        &[
            "governing law",
            "governing state",
            "jurisdiction",
            "governed by",
            "choice of law",
            "which state",
            "which law",
        ],
    ),
    (
        StructuredField::TermLength,
        &["term", "duration", "how long"],
    ),
    (
        StructuredField::Mutuality,
        &["mutual", "one-way", "one way", "unilateral", "bilateral", "reciprocal"],
    ),
    (
        StructuredField::Parties,
        &[
            "parties",
            "who signed",
            "signatories",
            "signatory",
            "counterparty",
            "counterparties",
        ],
    ),
];

/// Term questions that mention survival are about the survival period, not
/// the contract term
const TERM_SUPPRESSORS: &[&str] = &["survival", "survive", "survives", "after"];

const CLAUSE_TERMS: &[&str] = &[
    "clause",
    "clauses",
    "specify",
    "specifies",
    "definition",
    "definitions",
    "provision",
    "provisions",
    "section",
];

/// Keyword to canonical clause name, used when no "the X clause" pattern is
/// present
const CLAUSE_NAMES: &[(&str, &str)] = &[
    ("non-disclosure", "Non-Disclosure"),
    ("non disclosure", "Non-Disclosure"),
    ("nondisclosure", "Non-Disclosure"),
    ("confidentiality", "Confidentiality"),
    ("definitions", "Definitions"),
    ("definition", "Definitions"),
    ("indemnification", "Indemnification"),
    ("indemnity", "Indemnification"),
    ("termination", "Termination"),
    ("severability", "Severability"),
    ("assignment", "Assignment"),
    ("survival", "Survival"),
    ("remedies", "Remedies"),
    ("notices", "Notices"),
];

/// Parameters extracted during classification
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeParams {
    /// Target metadata field for structured questions
    pub field: Option<StructuredField>,
    /// Canonical clause name for clause questions
    pub clause_name: Option<String>,
    /// Calendar bounds for date-range questions
    pub date_range: Option<DateRange>,
}

/// Question-type classifier
pub struct Classifier {
    named_clause: Regex,
}

impl Classifier {
    pub fn new() -> Result<Self> {
        let named_clause = RegexBuilder::new(r"\bthe\s+([a-z][a-z -]*?)\s+(?:clause|provision|section)\b")
            .case_insensitive(true)
            .build()?;
        Ok(Self { named_clause })
    }

    /// Classify a normalized query; total, never panics
    pub fn classify(
        &self,
        text: &str,
        date_range: Option<&DateRange>,
    ) -> (QuestionType, TypeParams) {
        let lower = text.to_lowercase();
        let mut params = TypeParams::default();

        // 1. Date-range queries, detected upstream by the normalizer
        if let Some(range) = date_range {
            params.date_range = Some(*range);
            return (QuestionType::DateRange, params);
        }

        // 2. Cross-document comparison
        if CROSS_DOCUMENT_TERMS.iter().any(|t| contains_word(&lower, t)) {
            return (QuestionType::CrossDocument, params);
        }

        // 3. Structured fields, in table order
        for (field, keywords) in STRUCTURED_RULES {
            if !keywords.iter().any(|kw| contains_word(&lower, kw)) {
                continue;
            }
            if *field == StructuredField::TermLength
                && TERM_SUPPRESSORS.iter().any(|t| contains_word(&lower, t))
            {
                continue;
            }
            params.field = Some(*field);
            return (QuestionType::Structured, params);
        }

        // 4. Clause-specific questions: explicit clause keywords, a named
        //    "the X clause" pattern, or a known clause term on its own
        let named = self.extract_clause_name(&lower);
        let from_table = lookup_clause_name(&lower);
        if named.is_some()
            || from_table.is_some()
            || CLAUSE_TERMS.iter().any(|t| contains_word(&lower, t))
        {
            params.clause_name = named.or(from_table);
            return (QuestionType::Clause, params);
        }

        // 5. Catch-all
        (QuestionType::General, params)
    }

    /// Pull a clause name out of "the X clause" phrasing
    fn extract_clause_name(&self, lower: &str) -> Option<String> {
        let caps = self.named_clause.captures(lower)?;
        let name = caps.get(1)?.as_str().trim();
        if name.is_empty() {
            return None;
        }
        Some(title_case(name))
    }
}

fn lookup_clause_name(lower: &str) -> Option<String> {
    CLAUSE_NAMES
        .iter()
        .find(|(keyword, _)| contains_word(lower, keyword))
        .map(|(_, canonical)| canonical.to_string())
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
