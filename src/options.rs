//! Ranking options and configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::text::{SimilarityMode, ELLIPSIS};

/// Allowed deviation of the weight sum from 1.0.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Relative weights of the six relevance factors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Body/persona similarity
    pub content: f64,
    /// Title/persona overlap
    pub title: f64,
    /// Body length quality
    pub length: f64,
    /// Early-position bonus
    pub position: f64,
    /// Persona keyword density
    pub density: f64,
    /// Document-type alignment
    pub doc_type: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            content: 0.40,
            title: 0.20,
            length: 0.10,
            position: 0.10,
            density: 0.10,
            doc_type: 0.10,
        }
    }
}

impl ScoringWeights {
    /// Sum of all weights.
    pub fn sum(&self) -> f64 {
        self.as_array().iter().sum()
    }

    fn as_array(&self) -> [f64; 6] {
        [
            self.content,
            self.title,
            self.length,
            self.position,
            self.density,
            self.doc_type,
        ]
    }

    /// Check that every weight is finite and non-negative and that they sum to 1.
    pub fn validate(&self) -> Result<()> {
        if self.as_array().iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(Error::InvalidWeights(format!(
                "weights must be non-negative: {:?}",
                self
            )));
        }
        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(Error::InvalidWeights(format!(
                "weights sum to {}, expected 1.0",
                sum
            )));
        }
        Ok(())
    }
}

/// Body length, in words, that earns the full length factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LengthWindow {
    /// Below this the factor ramps linearly from 0
    pub min_words: usize,
    /// Above this the factor decays as `max_words / words`
    pub max_words: usize,
}

impl Default for LengthWindow {
    fn default() -> Self {
        Self {
            min_words: 100,
            max_words: 400,
        }
    }
}

impl LengthWindow {
    /// Check that the window is non-empty.
    pub fn validate(&self) -> Result<()> {
        if self.min_words == 0 || self.min_words > self.max_words {
            return Err(Error::Config(format!(
                "invalid length window {}..{}",
                self.min_words, self.max_words
            )));
        }
        Ok(())
    }
}

/// Size limits of the ranked output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputLimits {
    /// Number of sections in `extracted_sections`
    pub top_sections: usize,
    /// Spans per top section in `subsection_analysis`
    pub subsections_per_section: usize,
    /// Maximum characters of `refined_text`, ellipsis included
    pub max_refined_chars: usize,
    /// Sentences are packed into spans of roughly this many words
    pub span_words: usize,
}

impl Default for OutputLimits {
    fn default() -> Self {
        Self {
            top_sections: 5,
            subsections_per_section: 1,
            max_refined_chars: 500,
            span_words: 40,
        }
    }
}

impl OutputLimits {
    /// Check that truncated text can still carry content.
    pub fn validate(&self) -> Result<()> {
        if self.max_refined_chars <= ELLIPSIS.len() {
            return Err(Error::Config(format!(
                "max refined chars must exceed {}",
                ELLIPSIS.len()
            )));
        }
        if self.span_words == 0 {
            return Err(Error::Config("span words must be positive".into()));
        }
        Ok(())
    }
}

/// Options for a ranking run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankOptions {
    /// Factor weights
    pub weights: ScoringWeights,

    /// Ideal body length
    pub length_window: LengthWindow,

    /// Output sizes
    pub limits: OutputLimits,

    /// Content similarity strategy
    pub similarity: SimilarityMode,

    /// Keyword hits at which the density factor saturates
    pub density_cap: usize,

    /// Process documents on the rayon pool
    pub parallel: bool,
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            length_window: LengthWindow::default(),
            limits: OutputLimits::default(),
            similarity: SimilarityMode::default(),
            density_cap: 5,
            parallel: false,
        }
    }
}

impl RankOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the factor weights.
    pub fn with_weights(mut self, weights: ScoringWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Set the ideal length window.
    pub fn with_length_window(mut self, min_words: usize, max_words: usize) -> Self {
        self.length_window = LengthWindow {
            min_words,
            max_words,
        };
        self
    }

    /// Set the number of top sections.
    pub fn with_top_sections(mut self, n: usize) -> Self {
        self.limits.top_sections = n;
        self
    }

    /// Set the number of spans kept per top section.
    pub fn with_subsections_per_section(mut self, m: usize) -> Self {
        self.limits.subsections_per_section = m;
        self
    }

    /// Set the refined text limit.
    pub fn with_max_refined_chars(mut self, max: usize) -> Self {
        self.limits.max_refined_chars = max;
        self
    }

    /// Set the target span size in words.
    pub fn with_span_words(mut self, words: usize) -> Self {
        self.limits.span_words = words;
        self
    }

    /// Set the similarity strategy.
    pub fn with_similarity(mut self, mode: SimilarityMode) -> Self {
        self.similarity = mode;
        self
    }

    /// Use the lightweight Jaccard similarity.
    pub fn lite(mut self) -> Self {
        self.similarity = SimilarityMode::Jaccard;
        self
    }

    /// Set the density saturation point.
    pub fn with_density_cap(mut self, cap: usize) -> Self {
        self.density_cap = cap;
        self
    }

    /// Enable or disable parallel document processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Validate every parameter.
    pub fn validate(&self) -> Result<()> {
        self.weights.validate()?;
        self.length_window.validate()?;
        self.limits.validate()?;
        if self.density_cap == 0 {
            return Err(Error::Config("density cap must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_valid() {
        let weights = ScoringWeights::default();
        assert!((weights.sum() - 1.0).abs() < WEIGHT_SUM_TOLERANCE);
        assert!(RankOptions::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_weights() {
        let negative = ScoringWeights {
            content: -0.1,
            title: 0.3,
            ..Default::default()
        };
        assert!(matches!(negative.validate(), Err(Error::InvalidWeights(_))));

        let unbalanced = ScoringWeights {
            content: 0.5,
            ..Default::default()
        };
        assert!(matches!(unbalanced.validate(), Err(Error::InvalidWeights(_))));
    }

    #[test]
    fn test_options_builder() {
        let options = RankOptions::new()
            .with_top_sections(10)
            .with_subsections_per_section(2)
            .with_max_refined_chars(300)
            .lite()
            .with_parallel(true);

        assert_eq!(options.limits.top_sections, 10);
        assert_eq!(options.limits.subsections_per_section, 2);
        assert_eq!(options.limits.max_refined_chars, 300);
        assert_eq!(options.similarity, SimilarityMode::Jaccard);
        assert!(options.parallel);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_invalid_limits() {
        assert!(RankOptions::new().with_max_refined_chars(3).validate().is_err());
        assert!(RankOptions::new().with_length_window(500, 100).validate().is_err());
        assert!(RankOptions::new().with_density_cap(0).validate().is_err());
    }

    #[test]
    fn test_options_from_json() {
        let options: RankOptions =
            serde_json::from_str(r#"{"similarity": "jaccard", "limits": {"top_sections": 3}}"#)
                .unwrap();
        assert_eq!(options.similarity, SimilarityMode::Jaccard);
        assert_eq!(options.limits.top_sections, 3);
        assert_eq!(options.limits.max_refined_chars, 500);
    }
}
