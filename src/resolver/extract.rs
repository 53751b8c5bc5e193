//! Company-name fragment extraction from raw question text
//!
//! Works on the raw (un-normalized) question because capitalization carries
//! the signal. Two strategies in order: capitalized runs following a
//! preposition, then a general scan for capitalized or all-caps token runs.

use crate::error::Result;
use regex::Regex;

/// Question and legal filler words never treated as part of a company name
const STOP_WORDS: &[&str] = &[
    "what", "is", "the", "who", "when", "where", "which", "how", "does", "do", "did", "can",
    "could", "will", "would", "please", "tell", "show", "me", "a", "an", "of", "for", "with",
    "between", "and", "in", "on", "to", "nda", "ndas", "agreement", "agreements", "contract",
    "contracts", "clause", "section", "i", "we", "our", "their", "this", "that", "expire",
    "expires", "expiration", "expiry", "effective", "date", "term", "governing", "law",
    "jurisdiction", "parties", "party", "mutual", "signed", "confidentiality", "termination",
];

/// Capitalized-run extractor
pub struct FragmentExtractor {
    after_preposition: Regex,
}

impl FragmentExtractor {
    pub fn new() -> Result<Self> {
        // Runs of capitalized (or all-caps) tokens following of/for/with/between
        let after_preposition = Regex::new(
            r"\b(?:of|for|with|between)\s+((?:[A-Z][A-Za-z0-9&.'-]*,?\s*)+)",
        )?;
        Ok(Self { after_preposition })
    }

    /// Extract the most likely company-name fragment, or `None`
    pub fn extract(&self, raw: &str) -> Option<String> {
        if let Some(caps) = self.after_preposition.captures(raw) {
            if let Some(fragment) = clean_fragment(caps.get(1)?.as_str()) {
                return Some(fragment);
            }
        }

        self.scan_capitalized_run(raw)
    }

    /// Fallback: first run of capitalized or all-caps tokens that are not
    /// stop words
    fn scan_capitalized_run(&self, raw: &str) -> Option<String> {
        let mut run: Vec<&str> = Vec::new();

        for token in raw.split_whitespace() {
            let word = token.trim_matches(|c: char| !c.is_alphanumeric() && c != '&');
            let capitalized = word.chars().next().is_some_and(|c| c.is_uppercase());
            let stop = STOP_WORDS.contains(&word.to_lowercase().as_str());

            if capitalized && !stop && word.len() >= 2 {
                run.push(word);
            } else if !run.is_empty() {
                break;
            }
        }

        if run.is_empty() {
            None
        } else {
            clean_fragment(&run.join(" "))
        }
    }
}

/// Trim punctuation and strip stop words from the edges of a captured run
fn clean_fragment(captured: &str) -> Option<String> {
    let tokens: Vec<&str> = captured
        .split_whitespace()
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric() && c != '&' && c != '.'))
        .filter(|t| !t.is_empty())
        .collect();

    let is_stop = |t: &&str| STOP_WORDS.contains(&t.to_lowercase().trim_end_matches('.'));

    let start = tokens.iter().position(|t| !is_stop(&t))?;
    let end = tokens.iter().rposition(|t| !is_stop(&t))?;

    let mut fragment = tokens[start..=end].join(" ");
    // Possessives read as part of the token stream, not the name
    if let Some(stripped) = fragment.strip_suffix("'s") {
        fragment = stripped.to_string();
    }

    if fragment.len() < 2 {
        None
    } else {
        Some(fragment)
    }
}
