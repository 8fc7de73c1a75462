//! Section types produced by the segmenter and consumed by the scorer.

use serde::{Deserialize, Serialize};

/// A paragraph of section body text, tagged with the page it starts on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Page index (0-based) of the paragraph's first line
    pub page_number: usize,
    /// Paragraph text, lines joined with single spaces
    pub text: String,
}

/// A contiguous, titled span of one document's text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Identifier of the originating document (its file name)
    pub document_id: String,

    /// Detected heading, or a title synthesized from the first body words
    pub title: String,

    /// Body text from the heading to the next heading, paragraphs separated by a blank line
    pub body_text: String,

    /// The body split into paragraphs
    pub paragraphs: Vec<Paragraph>,

    /// Page index (0-based) where the heading occurs
    pub page_number: usize,

    /// Position among all sections of the same document
    pub order_index: usize,

    /// Whether the title was synthesized rather than detected
    pub synthesized_title: bool,
}

impl Section {
    /// Number of whitespace-separated words in the body.
    pub fn word_count(&self) -> usize {
        self.body_text.split_whitespace().count()
    }

    /// Whether the section has no body text.
    pub fn is_empty(&self) -> bool {
        self.body_text.trim().is_empty()
    }

    /// Case- and whitespace-insensitive fingerprint used for deduplication.
    pub fn fingerprint(&self) -> String {
        let title = self.title.split_whitespace().collect::<Vec<_>>().join(" ");
        let body = self.body_text.split_whitespace().collect::<Vec<_>>().join(" ");
        format!("{}\u{1f}{}", title.to_lowercase(), body.to_lowercase())
    }
}

/// The six independently normalized relevance factors of a section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Similarity between body tokens and persona keywords
    pub content: f64,
    /// Share of title tokens that are persona keywords
    pub title: f64,
    /// Peaked body-length quality
    pub length: f64,
    /// Early-position bonus
    pub position: f64,
    /// Capped count of verbatim persona-keyword hits in the body
    pub density: f64,
    /// Document category matches a category implied by the persona
    pub doc_type: f64,
    /// True when the persona had no keywords and only length and position carried signal
    pub degraded: bool,
}

/// A section with its composite relevance score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredSection {
    /// The scored section
    pub section: Section,
    /// Composite relevance in [0, 1]
    pub score: f64,
    /// Per-factor diagnostics
    pub breakdown: ScoreBreakdown,
}

impl ScoredSection {
    /// Deterministic ranking order: score descending, then reading order,
    /// then document id, then title.
    pub fn rank_cmp(&self, other: &Self) -> std::cmp::Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| self.section.order_index.cmp(&other.section.order_index))
            .then_with(|| self.section.document_id.cmp(&other.section.document_id))
            .then_with(|| self.section.title.cmp(&other.section.title))
            .then_with(|| self.section.page_number.cmp(&other.section.page_number))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cmp::Ordering;

    fn section(doc: &str, order: usize) -> Section {
        Section {
            document_id: doc.to_string(),
            title: "Overview".to_string(),
            body_text: "Some   body\n\ntext".to_string(),
            paragraphs: vec![],
            page_number: 0,
            order_index: order,
            synthesized_title: false,
        }
    }

    fn scored(doc: &str, order: usize, score: f64) -> ScoredSection {
        ScoredSection {
            section: section(doc, order),
            score,
            breakdown: ScoreBreakdown::default(),
        }
    }

    #[test]
    fn test_word_count_and_fingerprint() {
        let s = section("a.pdf", 0);
        assert_eq!(s.word_count(), 3);
        assert!(s.fingerprint().ends_with("some body text"));
    }

    #[test]
    fn test_rank_cmp_tie_breaks() {
        let high = scored("b.pdf", 3, 0.9);
        let low = scored("a.pdf", 0, 0.1);
        assert_eq!(high.rank_cmp(&low), Ordering::Less);

        let early = scored("z.pdf", 0, 0.5);
        let late = scored("a.pdf", 1, 0.5);
        assert_eq!(early.rank_cmp(&late), Ordering::Less);

        let doc_a = scored("a.pdf", 1, 0.5);
        let doc_b = scored("b.pdf", 1, 0.5);
        assert_eq!(doc_a.rank_cmp(&doc_b), Ordering::Less);
        assert_eq!(doc_b.rank_cmp(&doc_a), Ordering::Greater);
    }
}
