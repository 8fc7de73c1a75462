//! Relevance scoring of sections against a persona/job profile.
//!
//! Six factors, each normalized to [0, 1], are combined with configurable
//! weights:
//!
//! | Factor   | Default | Measures |
//! |----------|---------|----------|
//! | content  | 0.40    | similarity of body tokens to persona keywords |
//! | title    | 0.20    | share of title tokens that are persona keywords |
//! | length   | 0.10    | body length against the ideal window |
//! | position | 0.10    | earlier sections score higher |
//! | density  | 0.10    | persona keyword hits in the body, capped |
//! | doc_type | 0.10    | document category implied by the persona |
//!
//! When the persona yields no keywords, only length and position carry
//! signal and the composite is renormalized over those two.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{ScoreBreakdown, ScoredSection, Section};
use crate::options::{LengthWindow, RankOptions, ScoringWeights};
use crate::text::{keyword_set, tokenize, TextSimilarity};

/// Broad kind of document, inferred from its vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentCategory {
    /// Papers, studies, literature reviews
    Research,
    /// Financial and corporate reports
    Business,
    /// Textbooks and course material
    Educational,
    /// Resumes and CVs
    Resume,
    /// Travel guides
    Travel,
    /// Nothing recognizable
    General,
}

impl DocumentCategory {
    /// Categories in tie-break order.
    pub const ALL: [DocumentCategory; 6] = [
        DocumentCategory::Research,
        DocumentCategory::Business,
        DocumentCategory::Educational,
        DocumentCategory::Resume,
        DocumentCategory::Travel,
        DocumentCategory::General,
    ];

    /// Words whose presence in a document suggests this category.
    fn indicators(self) -> &'static [&'static str] {
        match self {
            DocumentCategory::Research => &[
                "abstract",
                "analysis",
                "dataset",
                "experiment",
                "experiments",
                "findings",
                "hypothesis",
                "literature",
                "methodology",
                "results",
                "study",
            ],
            DocumentCategory::Business => &[
                "annual",
                "financial",
                "fiscal",
                "growth",
                "investment",
                "market",
                "profit",
                "quarterly",
                "revenue",
                "sales",
                "strategy",
            ],
            DocumentCategory::Educational => &[
                "chapter",
                "concepts",
                "course",
                "definition",
                "exam",
                "exercise",
                "exercises",
                "learning",
                "lesson",
                "students",
            ],
            DocumentCategory::Resume => &[
                "certifications",
                "education",
                "employment",
                "experience",
                "internship",
                "projects",
                "responsibilities",
                "resume",
                "skills",
            ],
            DocumentCategory::Travel => &[
                "beach",
                "beaches",
                "cuisine",
                "hotel",
                "hotels",
                "itinerary",
                "museum",
                "nightlife",
                "restaurant",
                "restaurants",
                "tour",
                "travel",
                "trip",
            ],
            DocumentCategory::General => &[],
        }
    }

    /// Role and task words in a persona that imply this category.
    fn persona_terms(self) -> &'static [&'static str] {
        match self {
            DocumentCategory::Research => &[
                "academic",
                "literature",
                "phd",
                "research",
                "researcher",
                "review",
                "scientist",
            ],
            DocumentCategory::Business => &[
                "analyst",
                "business",
                "executive",
                "financial",
                "investment",
                "investor",
                "revenue",
            ],
            DocumentCategory::Educational => &[
                "course",
                "exam",
                "learn",
                "student",
                "study",
                "teacher",
                "undergraduate",
            ],
            DocumentCategory::Resume => &[
                "candidate",
                "candidates",
                "cv",
                "hiring",
                "hr",
                "recruiter",
                "resume",
                "talent",
            ],
            DocumentCategory::Travel => &[
                "itinerary",
                "planner",
                "tourist",
                "travel",
                "trip",
                "vacation",
            ],
            DocumentCategory::General => &[],
        }
    }

    /// Infer a category from a bag of normalized tokens.
    ///
    /// The category with the most indicator hits wins; ties go to the
    /// earlier category in [`ALL`](Self::ALL). No hits means `General`.
    pub fn infer<'a>(tokens: impl IntoIterator<Item = &'a str>) -> Self {
        let mut counts = [0usize; 6];
        for token in tokens {
            for (i, category) in Self::ALL.iter().enumerate() {
                if category.indicators().contains(&token) {
                    counts[i] += 1;
                }
            }
        }

        let mut best = DocumentCategory::General;
        let mut best_count = 0;
        for (category, count) in Self::ALL.iter().zip(counts) {
            if count > best_count {
                best = *category;
                best_count = count;
            }
        }
        best
    }

    /// Infer the category of a document from all of its sections.
    pub fn infer_from_sections(sections: &[Section]) -> Self {
        let tokens: Vec<String> = sections
            .iter()
            .flat_map(|s| tokenize(&s.title).into_iter().chain(tokenize(&s.body_text)))
            .collect();
        Self::infer(tokens.iter().map(String::as_str))
    }
}

impl fmt::Display for DocumentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DocumentCategory::Research => "research",
            DocumentCategory::Business => "business",
            DocumentCategory::Educational => "educational",
            DocumentCategory::Resume => "resume",
            DocumentCategory::Travel => "travel",
            DocumentCategory::General => "general",
        };
        f.write_str(name)
    }
}

/// The relevance query: persona and job text reduced to keywords.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaProfile {
    /// Persona and job joined with a space
    pub raw_text: String,
    /// Normalized keyword set of `raw_text`
    pub keywords: BTreeSet<String>,
    /// Document categories implied by the persona
    pub categories: BTreeSet<DocumentCategory>,
}

impl PersonaProfile {
    /// Build a profile from persona and job text.
    pub fn new(persona: &str, job_to_be_done: &str) -> Self {
        let raw_text = format!("{} {}", persona, job_to_be_done);
        let keywords = keyword_set(&raw_text);
        let categories = DocumentCategory::ALL
            .iter()
            .copied()
            .filter(|c| c.persona_terms().iter().any(|t| keywords.contains(*t)))
            .collect();

        Self {
            raw_text,
            keywords,
            categories,
        }
    }

    /// Whether the profile has no keywords, which forces degraded scoring.
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

/// Length factor: linear ramp up to the window, 1.0 inside, `max/words` above.
pub fn length_quality(words: usize, window: &LengthWindow) -> f64 {
    if words == 0 {
        0.0
    } else if words < window.min_words {
        words as f64 / window.min_words as f64
    } else if words <= window.max_words {
        1.0
    } else {
        window.max_words as f64 / words as f64
    }
}

/// Position factor: `1 - order_index / total_sections`.
pub fn position_factor(order_index: usize, total_sections: usize) -> f64 {
    if total_sections == 0 {
        return 1.0;
    }
    (1.0 - order_index as f64 / total_sections as f64).clamp(0.0, 1.0)
}

/// Share of title tokens that are persona keywords.
pub fn title_relevance(title: &str, keywords: &BTreeSet<String>) -> f64 {
    let tokens = tokenize(title);
    if tokens.is_empty() || keywords.is_empty() {
        return 0.0;
    }
    let hits = tokens.iter().filter(|t| keywords.contains(*t)).count();
    hits as f64 / tokens.len() as f64
}

/// Persona keyword occurrences in the body over `cap`, saturating at 1.
pub fn keyword_density(tokens: &[String], keywords: &BTreeSet<String>, cap: usize) -> f64 {
    if cap == 0 {
        return 0.0;
    }
    let hits = tokens.iter().filter(|t| keywords.contains(*t)).count();
    (hits as f64 / cap as f64).min(1.0)
}

/// Scores sections with a fixed strategy and parameter set.
pub struct Scorer {
    weights: ScoringWeights,
    length_window: LengthWindow,
    density_cap: usize,
    similarity: Box<dyn TextSimilarity>,
}

impl Scorer {
    /// Create a scorer from validated options.
    pub fn new(options: &RankOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            weights: options.weights,
            length_window: options.length_window,
            density_cap: options.density_cap,
            similarity: options.similarity.resolve(),
        })
    }

    /// The content similarity strategy in use.
    pub fn similarity(&self) -> &dyn TextSimilarity {
        self.similarity.as_ref()
    }

    /// Score one section.
    pub fn score_section(
        &self,
        section: &Section,
        profile: &PersonaProfile,
        total_sections: usize,
        category: DocumentCategory,
    ) -> ScoredSection {
        let tokens = tokenize(&section.body_text);
        let length = length_quality(section.word_count(), &self.length_window);
        let position = position_factor(section.order_index, total_sections);
        let w = &self.weights;

        let (breakdown, score) = if profile.is_empty() {
            let breakdown = ScoreBreakdown {
                length,
                position,
                degraded: true,
                ..Default::default()
            };
            let denominator = w.length + w.position;
            let score = if denominator > 0.0 {
                (w.length * length + w.position * position) / denominator
            } else {
                0.0
            };
            (breakdown, score)
        } else {
            let breakdown = ScoreBreakdown {
                content: self.similarity.similarity(&tokens, &profile.keywords),
                title: title_relevance(&section.title, &profile.keywords),
                length,
                position,
                density: keyword_density(&tokens, &profile.keywords, self.density_cap),
                doc_type: if profile.categories.contains(&category) {
                    1.0
                } else {
                    0.0
                },
                degraded: false,
            };
            let score = w.content * breakdown.content
                + w.title * breakdown.title
                + w.length * breakdown.length
                + w.position * breakdown.position
                + w.density * breakdown.density
                + w.doc_type * breakdown.doc_type;
            (breakdown, score)
        };

        let score = score.clamp(0.0, 1.0);
        log::debug!(
            "{} #{} {:?}: {:.4} (content {:.3}, title {:.3}, length {:.3}, position {:.3}, density {:.3}, type {:.0})",
            section.document_id,
            section.order_index,
            section.title,
            score,
            breakdown.content,
            breakdown.title,
            breakdown.length,
            breakdown.position,
            breakdown.density,
            breakdown.doc_type
        );

        ScoredSection {
            section: section.clone(),
            score,
            breakdown,
        }
    }

    /// Score every section of one document.
    pub fn score_document(
        &self,
        sections: &[Section],
        profile: &PersonaProfile,
    ) -> Vec<ScoredSection> {
        let category = DocumentCategory::infer_from_sections(sections);
        if let Some(first) = sections.first() {
            log::debug!("{}: category {}", first.document_id, category);
        }
        sections
            .iter()
            .map(|s| self.score_section(s, profile, sections.len(), category))
            .collect()
    }
}
