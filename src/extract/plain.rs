//! Plain-text extraction through `pdf-extract`.

use crate::error::{Error, Result};
use crate::model::Page;

use super::TextExtractor;

/// Text-only extractor. Used when the layout extractor fails or finds nothing.
///
/// Output carries no font sizes. `pdf-extract` renders each page separately,
/// so page indices match the document.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl PlainTextExtractor {
    /// Create a new plain-text extractor.
    pub fn new() -> Self {
        Self
    }
}

impl TextExtractor for PlainTextExtractor {
    fn name(&self) -> &'static str {
        "plain"
    }

    fn extract(&self, data: &[u8]) -> Result<Vec<Page>> {
        // pdf-extract panics on some malformed inputs
        let texts =
            std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(data))
                .map_err(|_| Error::TextExtract("pdf-extract aborted on malformed input".into()))??;
        Ok(texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| Page::from_text(i, text))
            .collect())
    }
}
