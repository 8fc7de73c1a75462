//! Global ranking and subsection selection.

use std::collections::BTreeSet;

use crate::model::{ExtractedSection, RankedOutput, ScoredSection, Section, SubsectionAnalysis};
use crate::options::OutputLimits;
use crate::score::PersonaProfile;
use crate::text::{tokenize, truncate_with_ellipsis, TextRefiner, TextSimilarity};

/// A candidate subsection: consecutive sentences of one paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    /// Raw span text
    pub text: String,
    /// Page of the paragraph the span starts in
    pub page_number: usize,
    /// Position of the span within its section
    pub position: usize,
}

/// Split text into sentences at `.`, `!` or `?` followed by whitespace.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        if let Some(&(next_idx, next)) = chars.peek() {
            if next.is_whitespace() {
                let sentence = text[start..i + c.len_utf8()].trim();
                if !sentence.is_empty() {
                    sentences.push(sentence);
                }
                start = next_idx;
            }
        }
    }

    let rest = text[start..].trim();
    if !rest.is_empty() {
        sentences.push(rest);
    }
    sentences
}

/// Pack each paragraph's sentences into spans of about `span_words` words.
///
/// Spans never cross a paragraph boundary. A sentence longer than the
/// target becomes a span of its own.
pub fn split_spans(section: &Section, span_words: usize) -> Vec<Span> {
    let paragraphs: Vec<(usize, &str)> = if section.paragraphs.is_empty() {
        vec![(section.page_number, section.body_text.as_str())]
    } else {
        section
            .paragraphs
            .iter()
            .map(|p| (p.page_number, p.text.as_str()))
            .collect()
    };

    let mut spans = Vec::new();
    for (page_number, text) in paragraphs {
        let mut current: Vec<&str> = Vec::new();
        let mut words = 0;

        for sentence in split_sentences(text) {
            let sentence_words = sentence.split_whitespace().count();
            if !current.is_empty() && words + sentence_words > span_words {
                spans.push(Span {
                    text: current.join(" "),
                    page_number,
                    position: spans.len(),
                });
                current.clear();
                words = 0;
            }
            current.push(sentence);
            words += sentence_words;
        }

        if !current.is_empty() {
            spans.push(Span {
                text: current.join(" "),
                page_number,
                position: spans.len(),
            });
        }
    }
    spans
}

/// Sorts scored sections, removes duplicates, and builds the output records.
pub struct Ranker<'a> {
    limits: OutputLimits,
    similarity: &'a dyn TextSimilarity,
    refiner: TextRefiner,
}

impl<'a> Ranker<'a> {
    /// Create a ranker that scores spans with `similarity`.
    pub fn new(limits: OutputLimits, similarity: &'a dyn TextSimilarity) -> Self {
        Self {
            limits,
            similarity,
            refiner: TextRefiner::new(),
        }
    }

    /// Sort into the global total order and drop duplicate sections.
    ///
    /// Two sections of one document with the same normalized title and body
    /// are duplicates; the better-ranked one is kept.
    pub fn order(&self, mut scored: Vec<ScoredSection>) -> Vec<ScoredSection> {
        scored.sort_by(|a, b| a.rank_cmp(b));

        let mut seen = BTreeSet::new();
        scored.retain(|s| seen.insert((s.section.document_id.clone(), s.section.fingerprint())));
        scored
    }

    /// Rank scored sections from all documents.
    pub fn rank(&self, scored: Vec<ScoredSection>, profile: &PersonaProfile) -> RankedOutput {
        let candidates = scored.len();
        let top: Vec<ScoredSection> = self
            .order(scored)
            .into_iter()
            .take(self.limits.top_sections)
            .collect();

        let extracted_sections = top
            .iter()
            .enumerate()
            .map(|(i, s)| ExtractedSection {
                document: s.section.document_id.clone(),
                section_title: s.section.title.clone(),
                importance_rank: (i + 1) as u32,
                page_number: s.section.page_number,
            })
            .collect();

        let mut subsection_analysis = Vec::new();
        for s in &top {
            for (span, refined_text) in self.select_spans(&s.section, profile) {
                subsection_analysis.push(SubsectionAnalysis {
                    document: s.section.document_id.clone(),
                    refined_text,
                    page_number: span.page_number,
                });
            }
        }

        log::info!(
            "ranked {} candidate sections: {} selected, {} subsections",
            candidates,
            top.len(),
            subsection_analysis.len()
        );

        RankedOutput {
            extracted_sections,
            subsection_analysis,
        }
    }

    /// Best spans of one section, refined. Repeats within the section are skipped.
    fn select_spans(&self, section: &Section, profile: &PersonaProfile) -> Vec<(Span, String)> {
        let mut spans: Vec<(f64, Span)> = split_spans(section, self.limits.span_words)
            .into_iter()
            .map(|span| {
                let score = self
                    .similarity
                    .similarity(&tokenize(&span.text), &profile.keywords);
                (score, span)
            })
            .collect();
        spans.sort_by(|(sa, a), (sb, b)| sb.total_cmp(sa).then(a.position.cmp(&b.position)));

        let mut seen_texts = BTreeSet::new();
        let mut selected = Vec::new();
        for (_, span) in spans {
            if selected.len() >= self.limits.subsections_per_section {
                break;
            }
            let refined = truncate_with_ellipsis(
                &self.refiner.refine(&span.text),
                self.limits.max_refined_chars,
            );
            if refined.is_empty() || !seen_texts.insert(refined.clone()) {
                continue;
            }
            selected.push((span, refined));
        }
        selected
    }
}
