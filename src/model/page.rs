//! Page-level types.

use serde::{Deserialize, Serialize};

/// One visual line of text with the font size it was set in.
///
/// An empty `text` marks a paragraph gap detected by the extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    /// Line text
    pub text: String,
    /// Dominant font size in points
    pub font_size: f32,
}

impl TextRun {
    /// Create a new run.
    pub fn new(text: impl Into<String>, font_size: f32) -> Self {
        Self {
            text: text.into(),
            font_size,
        }
    }

    /// Create a paragraph-gap marker.
    pub fn gap() -> Self {
        Self {
            text: String::new(),
            font_size: 0.0,
        }
    }

    /// Whether this run only marks a gap.
    pub fn is_gap(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// A single page of extracted text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Page index (0-based)
    pub index: usize,

    /// Raw text content, lines separated by `\n`
    pub text: String,

    /// Line-granular runs with font sizes, when layout metadata is available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runs: Option<Vec<TextRun>>,
}

/// A line as seen by the segmenter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line<'a> {
    /// Trimmed line text (empty for a paragraph gap)
    pub text: &'a str,
    /// Font size, when known
    pub font_size: Option<f32>,
}

impl Page {
    /// Create a page from plain text.
    pub fn from_text(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
            runs: None,
        }
    }

    /// Create a page from line runs; the raw text is derived from them.
    pub fn from_runs(index: usize, runs: Vec<TextRun>) -> Self {
        let text = runs
            .iter()
            .map(|r| r.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        Self {
            index,
            text,
            runs: Some(runs),
        }
    }

    /// Check if the page carries no extractable text.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Whether font-size hints are available.
    pub fn has_layout(&self) -> bool {
        self.runs.as_ref().is_some_and(|r| !r.is_empty())
    }

    /// Lines in reading order, trimmed. Blank lines come back with empty text.
    pub fn lines(&self) -> Vec<Line<'_>> {
        match &self.runs {
            Some(runs) if !runs.is_empty() => runs
                .iter()
                .flat_map(|run| {
                    let size = (!run.is_gap()).then_some(run.font_size);
                    run.text.split('\n').map(move |l| Line {
                        text: l.trim(),
                        font_size: size,
                    })
                })
                .collect(),
            _ => self
                .text
                .lines()
                .map(|l| Line {
                    text: l.trim(),
                    font_size: None,
                })
                .collect(),
        }
    }

    /// Modal body font size of the page, weighted by characters.
    ///
    /// Sizes are bucketed to 0.1pt. Ties go to the smaller size, since
    /// headings are the minority. Returns `None` without layout metadata.
    pub fn body_font_size(&self) -> Option<f32> {
        let runs = self.runs.as_ref()?;
        let mut histogram: std::collections::BTreeMap<i32, usize> = Default::default();
        for run in runs.iter().filter(|r| !r.is_gap() && r.font_size > 0.0) {
            let key = (run.font_size * 10.0).round() as i32;
            *histogram.entry(key).or_insert(0) += run.text.chars().count();
        }

        histogram
            .iter()
            .max_by(|(ka, ca), (kb, cb)| ca.cmp(cb).then(kb.cmp(ka)))
            .map(|(key, _)| *key as f32 / 10.0)
    }
}
