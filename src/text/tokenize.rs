//! Keyword tokenization.
//!
//! Text is NFKC-normalized (which also folds ligatures such as `ﬁ`),
//! lowercased, split on anything that is not alphanumeric, and filtered
//! against a minimum length and a small English stop-word list.

use std::collections::BTreeSet;

use unicode_normalization::UnicodeNormalization;

/// Tokens shorter than this many characters are dropped.
pub const MIN_TOKEN_CHARS: usize = 2;

/// Stop words removed from every token stream. Sorted for binary search.
const STOP_WORDS: &[&str] = &[
    "about", "above", "after", "again", "all", "also", "am", "an", "and", "any", "are", "as",
    "at", "be", "been", "before", "being", "below", "between", "both", "but", "by", "can",
    "could", "did", "do", "does", "doing", "down", "during", "each", "few", "for", "from",
    "further", "had", "has", "have", "having", "he", "her", "here", "hers", "him", "his", "how",
    "if", "in", "into", "is", "it", "its", "itself", "just", "me", "might", "more", "most", "must",
    "my", "no", "nor", "not", "now", "of", "off", "on", "once", "only", "or", "other", "our",
    "ours", "out", "over", "own", "same", "shall", "she", "should", "so", "some", "such", "than",
    "that", "the", "their", "theirs", "them", "then", "there", "these", "they", "this", "those",
    "through", "to", "too", "under", "until", "up", "us", "very", "was", "we", "were", "what",
    "when", "where", "which", "while", "who", "whom", "why", "will", "with", "would", "you",
    "your", "yours",
];

/// Check whether a lowercase token is a stop word.
pub fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.binary_search(&token).is_ok()
}

/// Split text into normalized tokens, keeping duplicates and order.
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized: String = text
        .nfkc()
        .flat_map(char::to_lowercase)
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    normalized
        .split_whitespace()
        .filter(|t| t.chars().count() >= MIN_TOKEN_CHARS && !is_stop_word(t))
        .map(str::to_string)
        .collect()
}

/// Normalized token set of the text.
pub fn keyword_set(text: &str) -> BTreeSet<String> {
    tokenize(text).into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_words_sorted() {
        let mut sorted = STOP_WORDS.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, STOP_WORDS);
    }

    #[test]
    fn test_tokenize_normalizes() {
        let tokens = tokenize("Built scalable BACKEND services, using Kubernetes & Go.");
        assert_eq!(
            tokens,
            vec!["built", "scalable", "backend", "services", "using", "kubernetes", "go"]
        );
    }

    #[test]
    fn test_tokenize_drops_short_and_stop_words() {
        assert_eq!(tokenize("a I of the x"), Vec::<String>::new());
        assert_eq!(tokenize("C++ and R&D"), Vec::<String>::new());
    }

    #[test]
    fn test_tokenize_folds_ligatures() {
        assert_eq!(tokenize("\u{FB01}nancial pro\u{FB01}le"), vec!["financial", "profile"]);
    }

    #[test]
    fn test_keyword_set_collapses_duplicates() {
        let set = keyword_set("Data data DATA pipeline");
        assert_eq!(set.len(), 2);
        assert!(set.contains("data"));
        assert!(set.contains("pipeline"));
    }

    #[test]
    fn test_tokenize_deterministic() {
        let text = "Graph neural networks for drug discovery: datasets and benchmarks";
        assert_eq!(tokenize(text), tokenize(text));
        assert_eq!(keyword_set(text), keyword_set(text));
    }
}
