//! Word and keyword frequency counting.
//!
//! Unlike highlighting, a token only counts toward a keyword when the whole
//! token equals the keyword after case folding.

use std::collections::BTreeMap;

use serde::Serialize;

/// Word count and per-keyword occurrence counts for a text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TextStats {
    /// Number of whitespace-separated tokens.
    pub word_count: usize,
    /// Lower-cased keyword -> number of matching tokens. Keywords that never
    /// occur are absent.
    pub keyword_counts: BTreeMap<String, usize>,
}

/// Count words in `text` and whole-token occurrences of `keywords`.
pub fn count_words<S: AsRef<str>>(text: &str, keywords: &[S]) -> TextStats {
    let wanted: Vec<String> = keywords
        .iter()
        .map(|k| k.as_ref().to_lowercase())
        .collect();

    let mut stats = TextStats::default();
    for token in text.split_whitespace() {
        stats.word_count += 1;
        let folded = token.to_lowercase();
        if wanted.iter().any(|k| *k == folded) {
            *stats.keyword_counts.entry(folded).or_default() += 1;
        }
    }
    stats
}
