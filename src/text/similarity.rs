//! Text-similarity capability used for content relevance.
//!
//! Two strategies are provided: cosine similarity over term-frequency
//! vectors, and a lightweight Jaccard overlap of token sets. The scorer
//! only sees the [`TextSimilarity`] trait.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Similarity between a token bag and a keyword set, in [0, 1].
pub trait TextSimilarity: Send + Sync {
    /// Name reported in run metadata.
    fn name(&self) -> &'static str;

    /// Compare the tokens of a text span against the keyword set.
    fn similarity(&self, tokens: &[String], keywords: &BTreeSet<String>) -> f64;
}

/// Which similarity strategy to resolve at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMode {
    /// Cosine similarity over term-frequency vectors
    #[default]
    Cosine,
    /// Jaccard overlap of token sets
    Jaccard,
}

impl SimilarityMode {
    /// Build the strategy for this mode.
    pub fn resolve(self) -> Box<dyn TextSimilarity> {
        match self {
            SimilarityMode::Cosine => Box::new(CosineSimilarity),
            SimilarityMode::Jaccard => Box::new(JaccardSimilarity),
        }
    }
}

impl fmt::Display for SimilarityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimilarityMode::Cosine => write!(f, "cosine"),
            SimilarityMode::Jaccard => write!(f, "jaccard"),
        }
    }
}

impl FromStr for SimilarityMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cosine" | "tf" => Ok(SimilarityMode::Cosine),
            "jaccard" | "lite" => Ok(SimilarityMode::Jaccard),
            other => Err(format!("unknown similarity mode: {}", other)),
        }
    }
}

/// Cosine similarity between the span's term-frequency vector and the
/// keyword set taken as a unit-weight vector.
#[derive(Debug, Clone, Copy, Default)]
pub struct CosineSimilarity;

impl TextSimilarity for CosineSimilarity {
    fn name(&self) -> &'static str {
        "cosine"
    }

    fn similarity(&self, tokens: &[String], keywords: &BTreeSet<String>) -> f64 {
        if tokens.is_empty() || keywords.is_empty() {
            return 0.0;
        }

        let mut tf: BTreeMap<&str, u32> = BTreeMap::new();
        for token in tokens {
            *tf.entry(token.as_str()).or_insert(0) += 1;
        }

        let dot: f64 = tf
            .iter()
            .filter(|(term, _)| keywords.contains(**term))
            .map(|(_, count)| f64::from(*count))
            .sum();
        if dot == 0.0 {
            return 0.0;
        }

        let span_norm = tf
            .values()
            .map(|c| f64::from(*c) * f64::from(*c))
            .sum::<f64>()
            .sqrt();
        let keyword_norm = (keywords.len() as f64).sqrt();

        (dot / (span_norm * keyword_norm)).clamp(0.0, 1.0)
    }
}

/// Jaccard overlap: |A ∩ B| / |A ∪ B| over token sets.
#[derive(Debug, Clone, Copy, Default)]
pub struct JaccardSimilarity;

impl TextSimilarity for JaccardSimilarity {
    fn name(&self) -> &'static str {
        "jaccard"
    }

    fn similarity(&self, tokens: &[String], keywords: &BTreeSet<String>) -> f64 {
        if tokens.is_empty() || keywords.is_empty() {
            return 0.0;
        }

        let span: BTreeSet<&str> = tokens.iter().map(String::as_str).collect();
        let intersection = span.iter().filter(|t| keywords.contains(**t)).count();
        let union = span.len() + keywords.len() - intersection;

        intersection as f64 / union as f64
    }
}
