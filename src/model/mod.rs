//! Data model shared by extraction, segmentation, scoring, and ranking.
//!
//! Pages come out of an extractor, sections out of the segmenter, scored
//! sections out of the scorer, and the ranked records out of the ranker.
//! Everything is immutable once built and carries its document identity
//! explicitly.

mod page;
mod report;
mod section;

pub use page::{Line, Page, TextRun};
pub use report::{
    DocumentStatus, ExtractedSection, ExtractionStatus, RankedOutput, SubsectionAnalysis,
};
pub use section::{Paragraph, ScoreBreakdown, ScoredSection, Section};
