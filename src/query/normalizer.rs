//! Text normalization and reformulation
//!
//! Fixed correction tables compiled into anchored regexes at construction.
//! All transforms are pure functions over strings and reach a fixed point
//! after one pass.

use crate::error::Result;
use crate::query::dates::{DateExtractor, DateRange};
use regex::{Regex, RegexBuilder};

/// Multi-word corrections, applied before single-word corrections so that
/// phrase context wins (e.g. "effective data" is fixed as a unit).
const PHRASE_CORRECTIONS: &[(&str, &str)] = &[
    ("effective data", "effective date"),
    ("affective date", "effective date"),
    ("effictive date", "effective date"),
    ("experation date", "expiration date"),
    ("expire date", "expiration date"),
    ("governing low", "governing law"),
    ("goberning law", "governing law"),
    ("govering law", "governing law"),
    ("who sign ", "who signed "),
];

/// Single-word misspelling corrections
const WORD_CORRECTIONS: &[(&str, &str)] = &[
    ("effecive", "effective"),
    ("efective", "effective"),
    ("effectve", "effective"),
    ("experation", "expiration"),
    ("expiraton", "expiration"),
    ("expirey", "expiry"),
    ("goverening", "governing"),
    ("governng", "governing"),
    ("juridiction", "jurisdiction"),
    ("jurisdicton", "jurisdiction"),
    ("agrement", "agreement"),
    ("aggreement", "agreement"),
    ("confidentail", "confidential"),
    ("confidental", "confidential"),
    ("disclosue", "disclosure"),
    ("disclousre", "disclosure"),
    ("termintation", "termination"),
    ("terminaton", "termination"),
    ("survivial", "survival"),
    ("parites", "parties"),
    ("partys", "parties"),
    ("clasue", "clause"),
    ("caluse", "clause"),
    ("mutal", "mutual"),
    ("mutural", "mutual"),
    ("singed", "signed"),
    ("wich", "which"),
];

/// Terms that mark a question as date-oriented; only in their presence is a
/// bare "data" rewritten to "date"
const DATE_CONTEXT_TERMS: &[&str] = &["effective", "expiration", "expiry", "signed", "date"];

/// Filler prefixes stripped during reformulation, longest first
const FILLER_PREFIXES: &[&str] = &[
    "can you tell me",
    "could you tell me",
    "can you show me",
    "i would like to know",
    "i want to know",
    "i need to know",
    "please tell me",
    "do you know",
    "tell me",
    "show me",
];

/// Known awkward constructions rewritten into canonical question forms
const REWRITES: &[(&str, &str)] = &[
    ("what ndas where created", "NDAs created"),
    ("what nda where created", "NDAs created"),
    ("what ndas were created", "NDAs created"),
    ("what nda were created", "NDAs created"),
    ("what agreements where created", "agreements created"),
    ("what agreements were created", "agreements created"),
];

/// Query normalizer with pre-compiled correction tables
pub struct Normalizer {
    phrase_rules: Vec<(Regex, &'static str)>,
    word_rules: Vec<(Regex, &'static str)>,
    bare_data: Regex,
    filler_rules: Vec<Regex>,
    rewrite_rules: Vec<(Regex, &'static str)>,
    whitespace: Regex,
    dates: DateExtractor,
}

impl Normalizer {
    /// Compile all correction tables; fails only on an invalid table entry
    pub fn new() -> Result<Self> {
        let phrase_rules = PHRASE_CORRECTIONS
            .iter()
            .map(|(pattern, replacement)| Ok((word_bounded(pattern)?, *replacement)))
            .collect::<Result<Vec<_>>>()?;

        let word_rules = WORD_CORRECTIONS
            .iter()
            .map(|(pattern, replacement)| Ok((word_bounded(pattern)?, *replacement)))
            .collect::<Result<Vec<_>>>()?;

        let filler_rules = FILLER_PREFIXES
            .iter()
            .map(|prefix| {
                let pattern = format!(r"^(?i){}[,:]?\s+", regex::escape(prefix));
                Ok(Regex::new(&pattern)?)
            })
            .collect::<Result<Vec<_>>>()?;

        let rewrite_rules = REWRITES
            .iter()
            .map(|(pattern, replacement)| Ok((word_bounded(pattern)?, *replacement)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            phrase_rules,
            word_rules,
            bare_data: word_bounded("data")?,
            filler_rules,
            rewrite_rules,
            whitespace: Regex::new(r"\s+")?,
            dates: DateExtractor::new()?,
        })
    }

    /// Apply misspelling corrections and whitespace cleanup
    ///
    /// Phrase-level corrections run first, then single-word corrections,
    /// both case-insensitively and anchored at word boundaries so unrelated
    /// substrings are never touched. Idempotent.
    pub fn normalize(&self, raw: &str) -> String {
        let mut text = raw.trim().to_string();

        for (rule, replacement) in &self.phrase_rules {
            text = rule.replace_all(&text, *replacement).into_owned();
        }

        for (rule, replacement) in &self.word_rules {
            text = rule.replace_all(&text, *replacement).into_owned();
        }

        // "data" is only a typo for "date" in date-oriented questions
        if self.has_date_context(&text) {
            text = self.bare_data.replace_all(&text, "date").into_owned();
        }

        self.whitespace.replace_all(&text, " ").trim().to_string()
    }

    /// Strip filler prefixes and rewrite known awkward constructions
    pub fn reformulate(&self, normalized: &str) -> String {
        let mut text = normalized.trim().to_string();

        // Prefixes can stack ("please tell me, can you tell me...")
        loop {
            let mut stripped = false;
            for rule in &self.filler_rules {
                if rule.is_match(&text) {
                    text = rule.replace(&text, "").into_owned();
                    stripped = true;
                }
            }
            if !stripped {
                break;
            }
        }

        for (rule, replacement) in &self.rewrite_rules {
            text = rule.replace_all(&text, *replacement).into_owned();
        }

        text.trim().to_string()
    }

    /// Recognize a calendar range mentioned in the text
    ///
    /// Returns `None` when no date pattern matches; malformed components are
    /// treated the same way, never as an error.
    pub fn extract_date_range(&self, text: &str) -> Option<DateRange> {
        self.dates.extract(text)
    }

    fn has_date_context(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        DATE_CONTEXT_TERMS
            .iter()
            .any(|term| contains_word(&lower, term))
    }
}

/// Compile a case-insensitive, word-boundary-anchored pattern
fn word_bounded(pattern: &str) -> Result<Regex> {
    let anchored = format!(r"\b{}\b", regex::escape(pattern));
    Ok(RegexBuilder::new(&anchored).case_insensitive(true).build()?)
}

/// Word-level containment check used across query understanding
pub(crate) fn contains_word(text: &str, word: &str) -> bool {
    if word.contains(' ') {
        return text.contains(word);
    }
    text.split(|c: char| !c.is_alphanumeric() && c != '-' && c != '\'')
        .any(|w| w == word)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> Normalizer {
        Normalizer::new().unwrap()
    }

    #[test]
    fn test_word_misspelling_corrected() {
        let n = normalizer();
        assert_eq!(
            n.normalize("What is the effecive date?"),
            "What is the effective date?"
        );
    }

    #[test]
    fn test_phrase_correction_runs_before_word_correction() {
        let n = normalizer();
        assert_eq!(
            n.normalize("what is the effective data of the agreement"),
            "what is the effective date of the agreement"
        );
    }

    #[test]
    fn test_corrections_never_touch_substrings() {
        let n = normalizer();
        // "mutal" -> "mutual" must not fire inside "mutalisk"
        assert_eq!(n.normalize("mutalisk"), "mutalisk");
        // "wich" must not fire inside "sandwich"
        assert_eq!(n.normalize("a sandwich"), "a sandwich");
    }

    #[test]
    fn test_bare_data_rewritten_only_with_date_context() {
        let n = normalizer();
        assert_eq!(
            n.normalize("what data is the agreement effective"),
            "what date is the agreement effective"
        );
        // No date-indicating term: "data" means data
        assert_eq!(
            n.normalize("what data does the vendor process"),
            "what data does the vendor process"
        );
    }

    #[test]
    fn test_whitespace_collapsed() {
        let n = normalizer();
        assert_eq!(n.normalize("  governing   law \t of Acme "), "governing law of Acme");
    }

    #[test]
    fn test_normalize_idempotent() {
        let n = normalizer();
        let inputs = [
            "What is the effecive date?",
            "what is the effective data of the agreement",
            "  goberning law   of Vallen ",
            "is this NDA mutal or one-way",
            "what data was it singed",
            "plain question with no corrections at all",
        ];
        for input in inputs {
            let once = n.normalize(input);
            assert_eq!(n.normalize(&once), once, "not a fixed point for {input:?}");
        }
    }

    #[test]
    fn test_filler_prefix_stripped() {
        let n = normalizer();
        assert_eq!(
            n.reformulate("can you tell me the governing law of Acme"),
            "the governing law of Acme"
        );
        assert_eq!(
            n.reformulate("i want to know who signed the agreement"),
            "who signed the agreement"
        );
    }

    #[test]
    fn test_stacked_fillers_stripped() {
        let n = normalizer();
        assert_eq!(
            n.reformulate("please tell me can you tell me the term"),
            "the term"
        );
    }

    #[test]
    fn test_awkward_construction_rewritten() {
        let n = normalizer();
        assert_eq!(
            n.reformulate("what nda where created in January 2025"),
            "NDAs created in January 2025"
        );
    }

    #[test]
    fn test_reformulate_leaves_clean_questions_alone() {
        let n = normalizer();
        assert_eq!(
            n.reformulate("what is the expiration date"),
            "what is the expiration date"
        );
    }
}
