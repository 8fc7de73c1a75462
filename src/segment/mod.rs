//! Section segmentation.
//!
//! Pages are walked line by line through a two-state machine. Heading lines
//! close the open section and start a new one; body lines accumulate into
//! paragraphs. Blank lines, gap runs and page boundaries end a paragraph.

mod heading;

pub use heading::{
    is_heading, HeadingFeatures, FONT_SIZE_EPSILON, HEADING_THRESHOLD, MAX_HEADING_CHARS,
    MAX_HEADING_WORDS, MIN_HEADING_LETTERS, SECTION_KEYWORDS,
};

use crate::model::{Page, Paragraph, Section};

/// Consecutive headings on one page merge while the title stays within this length.
pub const MAX_TITLE_CHARS: usize = 120;

/// Synthesized titles use between this many words...
pub const SYNTH_TITLE_MIN_WORDS: usize = 3;

/// ...and this many words of the body.
pub const SYNTH_TITLE_MAX_WORDS: usize = 6;

/// Synthesized titles are cut back to this many characters.
pub const MAX_SYNTH_TITLE_CHARS: usize = 60;

/// Splits a document's pages into sections.
#[derive(Debug, Clone)]
pub struct Segmenter {
    merge_headings: bool,
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new()
    }
}

impl Segmenter {
    /// Create a segmenter that merges stacked headings.
    pub fn new() -> Self {
        Self {
            merge_headings: true,
        }
    }

    /// Enable or disable merging of consecutive heading lines.
    pub fn with_merge_headings(mut self, merge: bool) -> Self {
        self.merge_headings = merge;
        self
    }

    /// Segment one document into sections in reading order.
    ///
    /// Every returned section has a non-empty title and a page number taken
    /// from `pages`. Pages without text contribute nothing.
    pub fn segment(&self, document_id: &str, pages: &[Page]) -> Vec<Section> {
        let mut sections = Vec::new();
        let mut state = State::Seeking;

        for page in pages {
            if page.is_empty() {
                continue;
            }

            let body_font_size = page.body_font_size();
            if let State::Open(builder) = &mut state {
                builder.end_paragraph();
            }

            for line in page.lines() {
                if line.text.is_empty() {
                    if let State::Open(builder) = &mut state {
                        builder.end_paragraph();
                    }
                    continue;
                }

                let features = HeadingFeatures::extract(line.text, line.font_size, body_font_size);
                if features.is_heading() {
                    if let State::Open(builder) = &mut state {
                        if self.merge_headings && builder.can_extend_title(line.text, page.index) {
                            builder.extend_title(line.text);
                            continue;
                        }
                    }

                    log::trace!(
                        "{}: heading {:?} on page {} (confidence {:.2})",
                        document_id,
                        line.text,
                        page.index,
                        features.confidence()
                    );
                    if let State::Open(builder) = std::mem::replace(
                        &mut state,
                        State::Open(SectionBuilder::titled(line.text, page.index)),
                    ) {
                        sections.push(builder.finish(document_id, sections.len()));
                    }
                } else {
                    if let State::Seeking = state {
                        state = State::Open(SectionBuilder::untitled(page.index));
                    }
                    if let State::Open(builder) = &mut state {
                        builder.push_line(line.text, page.index);
                    }
                }
            }
        }

        if let State::Open(builder) = state {
            sections.push(builder.finish(document_id, sections.len()));
        }

        log::debug!("{}: {} sections", document_id, sections.len());
        sections
    }
}

/// Segment with default settings.
pub fn segment(document_id: &str, pages: &[Page]) -> Vec<Section> {
    Segmenter::new().segment(document_id, pages)
}

enum State {
    /// No section open yet
    Seeking,
    /// Accumulating the body of a section
    Open(SectionBuilder),
}

struct SectionBuilder {
    title: Option<String>,
    page_number: usize,
    paragraphs: Vec<Paragraph>,
    current: Option<Paragraph>,
}

impl SectionBuilder {
    fn titled(title: &str, page_number: usize) -> Self {
        Self {
            title: Some(title.to_string()),
            page_number,
            paragraphs: Vec::new(),
            current: None,
        }
    }

    fn untitled(page_number: usize) -> Self {
        Self {
            title: None,
            page_number,
            paragraphs: Vec::new(),
            current: None,
        }
    }

    fn has_body(&self) -> bool {
        self.current.is_some() || !self.paragraphs.is_empty()
    }

    fn can_extend_title(&self, line: &str, page_number: usize) -> bool {
        match &self.title {
            Some(title) => {
                !self.has_body()
                    && self.page_number == page_number
                    && title.chars().count() + 1 + line.chars().count() <= MAX_TITLE_CHARS
            }
            None => false,
        }
    }

    fn extend_title(&mut self, line: &str) {
        if let Some(title) = &mut self.title {
            title.push(' ');
            title.push_str(line);
        }
    }

    fn push_line(&mut self, line: &str, page_number: usize) {
        match &mut self.current {
            Some(paragraph) => join_line(&mut paragraph.text, line),
            None => {
                self.current = Some(Paragraph {
                    page_number,
                    text: line.to_string(),
                })
            }
        }
    }

    fn end_paragraph(&mut self) {
        if let Some(paragraph) = self.current.take() {
            self.paragraphs.push(paragraph);
        }
    }

    fn finish(mut self, document_id: &str, order_index: usize) -> Section {
        self.end_paragraph();

        let body_text = self
            .paragraphs
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let (title, synthesized_title) = match self.title {
            Some(title) => (title, false),
            None => (synthesize_title(&body_text), true),
        };

        Section {
            document_id: document_id.to_string(),
            title,
            body_text,
            paragraphs: self.paragraphs,
            page_number: self.page_number,
            order_index,
            synthesized_title,
        }
    }
}

/// Append a wrapped line, rejoining words split by a trailing hyphen.
fn join_line(text: &mut String, line: &str) {
    let hyphenated = text.ends_with('-')
        && text
            .chars()
            .rev()
            .nth(1)
            .is_some_and(char::is_alphabetic)
        && line.chars().next().is_some_and(char::is_lowercase);

    if hyphenated {
        text.pop();
    } else {
        text.push(' ');
    }
    text.push_str(line);
}

/// Title from the first words of a body with no detected heading.
pub fn synthesize_title(body: &str) -> String {
    let mut words: Vec<&str> = body.split_whitespace().take(SYNTH_TITLE_MAX_WORDS).collect();
    while words.len() > SYNTH_TITLE_MIN_WORDS
        && words.join(" ").chars().count() > MAX_SYNTH_TITLE_CHARS
    {
        words.pop();
    }

    let joined = words.join(" ");
    let clipped: String = joined.chars().take(MAX_SYNTH_TITLE_CHARS).collect();
    let title = clipped.trim_end_matches(|c: char| !c.is_alphanumeric());

    if title.is_empty() {
        clipped
    } else {
        title.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TextRun;

    #[test]
    fn test_headings_split_sections() {
        let pages = vec![Page::from_text(
            0,
            "EXPERIENCE\nBuilt scalable backend services using Kubernetes and Go.\n\nEDUCATION\nBSc Computer Science, 2016.",
        )];
        let sections = segment("resume.pdf", &pages);

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].title, "EXPERIENCE");
        assert_eq!(
            sections[0].body_text,
            "Built scalable backend services using Kubernetes and Go."
        );
        assert_eq!(sections[1].title, "EDUCATION");
        assert_eq!(sections[1].order_index, 1);
        assert!(sections.iter().all(|s| s.document_id == "resume.pdf"));
    }

    #[test]
    fn test_leading_body_gets_synthesized_title() {
        let pages = vec![Page::from_text(
            0,
            "The coastal towns of southern France offer quiet beaches.\nTips\nPack light.",
        )];
        let sections = segment("guide.pdf", &pages);

        assert_eq!(sections.len(), 2);
        assert!(sections[0].synthesized_title);
        assert_eq!(sections[0].title, "The coastal towns of southern France");
        assert_eq!(sections[1].title, "Tips");
        assert!(!sections[1].synthesized_title);
    }

    #[test]
    fn test_stacked_headings_merge() {
        let pages = vec![Page::from_text(0, "1. Introduction\nBACKGROUND AND MOTIVATION\nBody text here.")];
        let sections = segment("paper.pdf", &pages);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "1. Introduction BACKGROUND AND MOTIVATION");

        let unmerged = Segmenter::new()
            .with_merge_headings(false)
            .segment("paper.pdf", &pages);
        assert_eq!(unmerged.len(), 2);
        assert!(unmerged[0].is_empty());
    }

    #[test]
    fn test_headings_on_different_pages_do_not_merge() {
        let pages = vec![
            Page::from_text(0, "Body before.\nSUMMARY"),
            Page::from_text(1, "RESULTS\nNumbers went up."),
        ];
        let sections = segment("r.pdf", &pages);
        let titles: Vec<_> = sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Body before", "SUMMARY", "RESULTS"]);
        assert_eq!(sections[2].page_number, 1);
    }

    #[test]
    fn test_section_spans_pages() {
        let pages = vec![
            Page::from_text(0, "Methods\nWe sampled widely"),
            Page::from_text(1, "across three regions."),
        ];
        let sections = segment("p.pdf", &pages);

        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].page_number, 0);
        assert_eq!(sections[0].paragraphs.len(), 2);
        assert_eq!(sections[0].paragraphs[1].page_number, 1);
        assert_eq!(
            sections[0].body_text,
            "We sampled widely\n\nacross three regions."
        );
    }

    #[test]
    fn test_empty_pages_are_skipped() {
        let pages = vec![Page::from_text(0, "   "), Page::from_text(1, "")];
        assert!(segment("blank.pdf", &pages).is_empty());
        assert!(segment("none.pdf", &[]).is_empty());
    }

    #[test]
    fn test_font_size_detects_heading() {
        let pages = vec![Page::from_runs(
            0,
            vec![
                TextRun::new("Nice Coastal Towns", 18.0),
                TextRun::new("Antibes and Menton are lovely in spring and autumn.", 11.0),
                TextRun::new("Both have old towns worth a slow afternoon walk.", 11.0),
            ],
        )];
        let sections = segment("travel.pdf", &pages);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "Nice Coastal Towns");
        assert_eq!(sections[0].paragraphs.len(), 1);
    }

    #[test]
    fn test_hyphenated_line_join() {
        let pages = vec![Page::from_text(0, "Overview\nextract infor-\nmation quickly")];
        let sections = segment("d.pdf", &pages);
        assert_eq!(sections[0].body_text, "extract information quickly");
    }

    #[test]
    fn test_synthesize_title_bounds() {
        assert_eq!(synthesize_title("one two"), "one two");
        assert_eq!(
            synthesize_title("alpha beta gamma delta epsilon zeta eta theta"),
            "alpha beta gamma delta epsilon zeta"
        );
        let long = "Pneumonoultramicroscopicsilicovolcanoconiosis ".repeat(6);
        let title = synthesize_title(&long);
        assert!(title.chars().count() <= MAX_SYNTH_TITLE_CHARS);
        assert!(!title.is_empty());
        assert_eq!(synthesize_title("••• •••"), "••• •••");
    }

    #[test]
    fn test_deterministic() {
        let pages = vec![Page::from_text(0, "SKILLS\nRust, Go\n\nPROJECTS\nA compiler.")];
        assert_eq!(segment("x.pdf", &pages), segment("x.pdf", &pages));
    }
}
