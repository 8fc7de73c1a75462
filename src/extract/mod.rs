//! Text extraction capability.
//!
//! Extractors turn PDF bytes into [`Page`]s. They are tried in order of
//! capability: the layout extractor keeps font sizes, the plain extractor
//! only recovers text. The first one that yields text wins.
//!
//! # Example
//!
//! ```no_run
//! use sectionrank::extract::ExtractorChain;
//!
//! fn main() -> sectionrank::Result<()> {
//!     let data = std::fs::read("report.pdf")?;
//!     let extraction = ExtractorChain::with_defaults().extract(&data)?;
//!     println!("{} pages via {}", extraction.pages.len(), extraction.extractor);
//!     Ok(())
//! }
//! ```

mod layout;
mod plain;

pub use layout::LayoutExtractor;
pub use plain::PlainTextExtractor;

use std::sync::Arc;

use crate::detect::detect_format_from_bytes;
use crate::error::{Error, Result};
use crate::model::Page;

/// Trait for PDF text extractors.
///
/// Implement this trait to plug in another extraction backend.
pub trait TextExtractor: Send + Sync {
    /// Name recorded in the run metadata.
    fn name(&self) -> &'static str;

    /// Extract pages, indexed from 0 in document order.
    fn extract(&self, data: &[u8]) -> Result<Vec<Page>>;
}

/// Pages produced by one extractor.
#[derive(Debug, Clone)]
pub struct Extraction {
    /// Name of the extractor that produced the pages
    pub extractor: &'static str,
    /// Extracted pages
    pub pages: Vec<Page>,
}

impl Extraction {
    /// Number of pages that carry text.
    pub fn pages_with_text(&self) -> usize {
        self.pages.iter().filter(|p| !p.is_empty()).count()
    }
}

/// Ordered list of extractors, most capable first.
#[derive(Clone)]
pub struct ExtractorChain {
    extractors: Vec<Arc<dyn TextExtractor>>,
}

impl ExtractorChain {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self {
            extractors: Vec::new(),
        }
    }

    /// Create a chain with the layout extractor followed by the plain extractor.
    pub fn with_defaults() -> Self {
        let mut chain = Self::new();
        chain.register(Arc::new(LayoutExtractor::new()));
        chain.register(Arc::new(PlainTextExtractor::new()));
        chain
    }

    /// Append an extractor to the end of the chain.
    pub fn register(&mut self, extractor: Arc<dyn TextExtractor>) {
        self.extractors.push(extractor);
    }

    /// Builder form of [`register`](Self::register).
    pub fn with_extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.register(extractor);
        self
    }

    /// Names of the registered extractors in order.
    pub fn names(&self) -> Vec<&'static str> {
        self.extractors.iter().map(|e| e.name()).collect()
    }

    /// Extract text, falling through the chain until one extractor yields text.
    ///
    /// The PDF header is verified first. When every extractor succeeds
    /// without text, the first such result is returned so the caller can
    /// record an empty document. When all fail, the last error is returned.
    pub fn extract(&self, data: &[u8]) -> Result<Extraction> {
        detect_format_from_bytes(data)?;

        if self.extractors.is_empty() {
            return Err(Error::NoExtractor("no text extractors registered".into()));
        }

        let mut empty: Option<Extraction> = None;
        let mut last_error: Option<Error> = None;

        for (i, extractor) in self.extractors.iter().enumerate() {
            match extractor.extract(data) {
                Ok(pages) if pages.iter().any(|p| !p.is_empty()) => {
                    if i > 0 {
                        log::warn!("fell back to {} extractor", extractor.name());
                    }
                    return Ok(Extraction {
                        extractor: extractor.name(),
                        pages,
                    });
                }
                Ok(pages) => {
                    log::debug!("{} extractor found no text", extractor.name());
                    if empty.is_none() {
                        empty = Some(Extraction {
                            extractor: extractor.name(),
                            pages,
                        });
                    }
                }
                Err(e) => {
                    log::debug!("{} extractor failed: {}", extractor.name(), e);
                    last_error = Some(e);
                }
            }
        }

        match (empty, last_error) {
            (Some(extraction), _) => Ok(extraction),
            (None, Some(e)) => Err(e),
            (None, None) => Err(Error::NoExtractor("no extractor produced output".into())),
        }
    }
}

impl Default for ExtractorChain {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for ExtractorChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractorChain")
            .field("extractors", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed {
        name: &'static str,
        result: std::result::Result<&'static str, &'static str>,
    }

    impl TextExtractor for Fixed {
        fn name(&self) -> &'static str {
            self.name
        }

        fn extract(&self, _data: &[u8]) -> Result<Vec<Page>> {
            match self.result {
                Ok(text) => Ok(vec![Page::from_text(0, text)]),
                Err(msg) => Err(Error::TextExtract(msg.to_string())),
            }
        }
    }

    fn fixed(
        name: &'static str,
        result: std::result::Result<&'static str, &'static str>,
    ) -> Arc<dyn TextExtractor> {
        Arc::new(Fixed { name, result })
    }

    const PDF: &[u8] = b"%PDF-1.4\n";

    #[test]
    fn test_defaults_order() {
        assert_eq!(ExtractorChain::with_defaults().names(), vec!["layout", "plain"]);
    }

    #[test]
    fn test_rejects_non_pdf() {
        let chain = ExtractorChain::new().with_extractor(fixed("a", Ok("text")));
        assert!(matches!(chain.extract(b"hello"), Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_empty_chain() {
        assert!(matches!(
            ExtractorChain::new().extract(PDF),
            Err(Error::NoExtractor(_))
        ));
    }

    #[test]
    fn test_falls_back_on_error() {
        let chain = ExtractorChain::new()
            .with_extractor(fixed("first", Err("broken")))
            .with_extractor(fixed("second", Ok("hello")));
        let extraction = chain.extract(PDF).unwrap();
        assert_eq!(extraction.extractor, "second");
        assert_eq!(extraction.pages_with_text(), 1);
    }

    #[test]
    fn test_falls_back_on_empty_text() {
        let chain = ExtractorChain::new()
            .with_extractor(fixed("first", Ok("   ")))
            .with_extractor(fixed("second", Ok("hello")));
        assert_eq!(chain.extract(PDF).unwrap().extractor, "second");
    }

    #[test]
    fn test_all_empty_returns_first_empty() {
        let chain = ExtractorChain::new()
            .with_extractor(fixed("first", Ok("")))
            .with_extractor(fixed("second", Err("broken")));
        let extraction = chain.extract(PDF).unwrap();
        assert_eq!(extraction.extractor, "first");
        assert_eq!(extraction.pages_with_text(), 0);
    }

    #[test]
    fn test_all_fail_returns_last_error() {
        let chain = ExtractorChain::new()
            .with_extractor(fixed("first", Err("one")))
            .with_extractor(fixed("second", Err("two")));
        match chain.extract(PDF) {
            Err(Error::TextExtract(msg)) => assert_eq!(msg, "two"),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
