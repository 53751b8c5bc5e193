//! Fuzzy name scoring
//!
//! The final confidence is the maximum of named sub-scores so each
//! heuristic stays independently testable. Ordering invariant: exact (1.0)
//! beats containment (0.85/0.95) beats first-word similarity (0.7-0.9)
//! beats the blended fallback.

/// Score a company-name fragment against a candidate name, in [0, 1]
pub fn fuzzy_score(fragment: &str, candidate: &str) -> f32 {
    let a = fold(fragment);
    let b = fold(candidate);

    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let score = exact_score(&a, &b)
        .max(containment_score(&a, &b))
        .max(first_word_score(&a, &b))
        .max(blended_score(&a, &b));

    score.clamp(0.0, 1.0)
}

/// Case-folded, whitespace-collapsed comparison form
fn fold(s: &str) -> String {
    s.to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 1.0 on equality, 0 otherwise
pub(crate) fn exact_score(a: &str, b: &str) -> f32 {
    if a == b {
        1.0
    } else {
        0.0
    }
}

/// One string fully containing the other: 0.85, boosted to 0.95 when the
/// match starts the longer string
pub(crate) fn containment_score(a: &str, b: &str) -> f32 {
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if short.len() < 2 {
        return 0.0;
    }
    match long.find(short) {
        Some(0) => 0.95,
        Some(_) => 0.85,
        None => 0.0,
    }
}

/// First-word edit similarity of at least 0.6 maps linearly into 0.7-0.9
pub(crate) fn first_word_score(a: &str, b: &str) -> f32 {
    let (Some(fa), Some(fb)) = (a.split_whitespace().next(), b.split_whitespace().next()) else {
        return 0.0;
    };
    let sim = similarity_ratio(fa, fb);
    if sim < 0.6 {
        return 0.0;
    }
    0.7 + (sim - 0.6) / 0.4 * 0.2
}

/// Word-set overlap blended with whole-string edit similarity, weighted
/// toward first-word similarity; degenerates to the plain edit ratio when
/// there are no words to compare
pub(crate) fn blended_score(a: &str, b: &str) -> f32 {
    let ratio = similarity_ratio(a, b);
    let jaccard = jaccard_words(a, b);

    match (a.split_whitespace().next(), b.split_whitespace().next()) {
        (Some(fa), Some(fb)) => {
            let first = similarity_ratio(fa, fb);
            0.5 * first + 0.25 * jaccard + 0.25 * ratio
        }
        _ => ratio,
    }
}

/// Normalized edit similarity: 1 - distance / longer length
pub(crate) fn similarity_ratio(a: &str, b: &str) -> f32 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f32 / longest as f32
}

/// Jaccard overlap of the two word sets
pub(crate) fn jaccard_words(a: &str, b: &str) -> f32 {
    let set_a: std::collections::HashSet<&str> = a.split_whitespace().collect();
    let set_b: std::collections::HashSet<&str> = b.split_whitespace().collect();
    if set_a.is_empty() && set_b.is_empty() {
        return 0.0;
    }
    let intersection = set_a.intersection(&set_b).count();
    let union = set_a.union(&set_b).count();
    if union == 0 {
        return 0.0;
    }
    intersection as f32 / union as f32
}

/// Simple Levenshtein distance
pub(crate) fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (m, n) = (a.len(), b.len());
    let mut dp = vec![vec![0usize; n + 1]; m + 1];
    for (i, row) in dp.iter_mut().enumerate().take(m + 1) {
        row[0] = i;
    }
    for (j, val) in dp[0].iter_mut().enumerate().take(n + 1) {
        *val = j;
    }
    for i in 1..=m {
        for j in 1..=n {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            dp[i][j] = (dp[i - 1][j] + 1)
                .min(dp[i][j - 1] + 1)
                .min(dp[i - 1][j - 1] + cost);
        }
    }
    dp[m][n]
}
