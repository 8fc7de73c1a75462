//! Ranked output records and per-document processing status.

use serde::{Deserialize, Serialize};

/// One entry of `extracted_sections`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedSection {
    /// Source document file name
    pub document: String,
    /// Section title
    pub section_title: String,
    /// 1-based position after the global sort
    pub importance_rank: u32,
    /// 0-based page index of the section heading
    pub page_number: usize,
}

/// One entry of `subsection_analysis`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubsectionAnalysis {
    /// Source document file name
    pub document: String,
    /// Cleaned, possibly truncated span text
    pub refined_text: String,
    /// 0-based page index where the span starts
    pub page_number: usize,
}

/// The two ranked arrays of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedOutput {
    /// Top-N sections across all documents
    pub extracted_sections: Vec<ExtractedSection>,
    /// Top-M spans for each top section
    pub subsection_analysis: Vec<SubsectionAnalysis>,
}

impl RankedOutput {
    /// Whether nothing was ranked.
    pub fn is_empty(&self) -> bool {
        self.extracted_sections.is_empty()
    }
}

/// Outcome of text extraction for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExtractionStatus {
    /// Text was extracted by the named extractor.
    Extracted {
        /// Name of the extractor that succeeded
        extractor: String,
    },
    /// The document was skipped.
    Skipped {
        /// Why it was skipped
        reason: String,
    },
}

/// Processing metadata for one input document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentStatus {
    /// Document file name
    pub document: String,
    /// Extraction outcome
    #[serde(flatten)]
    pub extraction: ExtractionStatus,
    /// Pages with extractable text
    pub pages_with_text: usize,
    /// Sections found by the segmenter
    pub sections_found: usize,
}

impl DocumentStatus {
    /// Status for a document whose text was extracted and segmented.
    pub fn extracted(
        document: impl Into<String>,
        extractor: impl Into<String>,
        pages_with_text: usize,
        sections_found: usize,
    ) -> Self {
        Self {
            document: document.into(),
            extraction: ExtractionStatus::Extracted {
                extractor: extractor.into(),
            },
            pages_with_text,
            sections_found,
        }
    }

    /// Status for a skipped document.
    pub fn skipped(document: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            document: document.into(),
            extraction: ExtractionStatus::Skipped {
                reason: reason.into(),
            },
            pages_with_text: 0,
            sections_found: 0,
        }
    }

    /// Whether extraction succeeded.
    pub fn succeeded(&self) -> bool {
        matches!(self.extraction, ExtractionStatus::Extracted { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serialization_is_flat() {
        let status = DocumentStatus::skipped("broken.pdf", "not a PDF");
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["status"], "skipped");
        assert_eq!(json["reason"], "not a PDF");
        assert_eq!(json["sections_found"], 0);
        assert!(!status.succeeded());

        let ok = DocumentStatus::extracted("a.pdf", "layout", 3, 7);
        assert!(ok.succeeded());
        assert_eq!(serde_json::to_value(&ok).unwrap()["extractor"], "layout");
    }

    #[test]
    fn test_extracted_section_field_names() {
        let entry = ExtractedSection {
            document: "a.pdf".into(),
            section_title: "Skills".into(),
            importance_rank: 1,
            page_number: 0,
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(
            json,
            r#"{"document":"a.pdf","section_title":"Skills","importance_rank":1,"page_number":0}"#
        );
    }
}
