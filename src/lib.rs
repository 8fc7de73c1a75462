//! # sectionrank
//!
//! Persona-driven section ranking for batches of PDF documents.
//!
//! Each document is extracted to pages, segmented into titled sections, and
//! every section is scored against a persona and a job to be done. The best
//! sections across the batch are ranked and the most relevant passage of each
//! is refined into a short excerpt.
//!
//! ## Quick Start
//!
//! ```no_run
//! use sectionrank::{rank_directory, render};
//! use std::path::Path;
//!
//! fn main() -> sectionrank::Result<()> {
//!     // The directory holds the PDFs and one JSON configuration file
//!     let report = rank_directory(Path::new("input"))?;
//!     render::write_report(&report, Path::new("output/challenge1b_output.json"), Default::default())?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Fallback extraction**: layout-aware extractor with font sizes, plain text fallback
//! - **Heading detection**: weighted feature classifier with named thresholds
//! - **Six-factor relevance**: content, title, length, position, density, document type
//! - **Deterministic output**: total ordering, identical across runs and thread counts
//! - **Parallel processing**: optional Rayon processing of documents

pub mod detect;
pub mod error;
pub mod extract;
pub mod input;
pub mod model;
pub mod options;
pub mod pipeline;
pub mod rank;
pub mod render;
pub mod score;
pub mod segment;
pub mod text;

// Re-export commonly used types
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_pdf_bytes, PdfFormat};
pub use error::{Error, Result};
pub use extract::{ExtractorChain, LayoutExtractor, PlainTextExtractor, TextExtractor};
pub use input::{load_input_dir, InputBatch, RunConfig, SourceDocument};
pub use model::{
    DocumentStatus, ExtractedSection, Page, RankedOutput, ScoredSection, Section,
    SubsectionAnalysis, TextRun,
};
pub use options::{LengthWindow, OutputLimits, RankOptions, ScoringWeights};
pub use pipeline::{Pipeline, RunResult};
pub use render::{JsonFormat, Report};
pub use score::{DocumentCategory, PersonaProfile, Scorer};
pub use segment::Segmenter;
pub use text::SimilarityMode;

use std::path::{Path, PathBuf};

/// Rank the documents of an input directory with default options.
///
/// # Example
///
/// ```no_run
/// use sectionrank::rank_directory;
/// use std::path::Path;
///
/// let report = rank_directory(Path::new("input")).unwrap();
/// println!("{} sections", report.extracted_sections.len());
/// ```
pub fn rank_directory(dir: &Path) -> Result<Report> {
    SectionRank::new().rank_dir(dir)
}

/// Extract and segment one PDF file with the default extractor chain.
pub fn segment_file<P: AsRef<Path>>(path: P) -> Result<Vec<Section>> {
    let path = path.as_ref();
    let data = std::fs::read(path)?;
    let id = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    segment_bytes(&id, &data)
}

/// Extract and segment PDF bytes with the default extractor chain.
pub fn segment_bytes(document_id: &str, data: &[u8]) -> Result<Vec<Section>> {
    let extraction = ExtractorChain::with_defaults().extract(data)?;
    Ok(Segmenter::new().segment(document_id, &extraction.pages))
}

/// Builder for ranking runs.
///
/// # Example
///
/// ```no_run
/// use sectionrank::{SectionRank, SimilarityMode};
/// use std::path::Path;
///
/// let report = SectionRank::new()
///     .with_top_sections(10)
///     .with_similarity(SimilarityMode::Jaccard)
///     .parallel()
///     .rank_dir(Path::new("input"))?;
/// # Ok::<(), sectionrank::Error>(())
/// ```
pub struct SectionRank {
    options: RankOptions,
    config_path: Option<PathBuf>,
    chain: Option<ExtractorChain>,
}

impl SectionRank {
    /// Create a builder with default options.
    pub fn new() -> Self {
        Self {
            options: RankOptions::default(),
            config_path: None,
            chain: None,
        }
    }

    /// Replace all options.
    pub fn with_options(mut self, options: RankOptions) -> Self {
        self.options = options;
        self
    }

    /// Read the configuration from this file instead of scanning the directory.
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Use a custom extractor chain.
    pub fn with_chain(mut self, chain: ExtractorChain) -> Self {
        self.chain = Some(chain);
        self
    }

    /// Set the number of top sections.
    pub fn with_top_sections(mut self, n: usize) -> Self {
        self.options = self.options.with_top_sections(n);
        self
    }

    /// Set the similarity strategy.
    pub fn with_similarity(mut self, mode: SimilarityMode) -> Self {
        self.options = self.options.with_similarity(mode);
        self
    }

    /// Process documents in parallel.
    pub fn parallel(mut self) -> Self {
        self.options = self.options.with_parallel(true);
        self
    }

    /// Build the pipeline; fails on invalid options.
    pub fn pipeline(self) -> Result<Pipeline> {
        let pipeline = Pipeline::new(self.options)?;
        Ok(match self.chain {
            Some(chain) => pipeline.with_chain(chain),
            None => pipeline,
        })
    }

    /// Load an input directory and rank its documents.
    pub fn rank_dir(self, dir: &Path) -> Result<Report> {
        let batch = load_input_dir(dir, self.config_path.as_deref())?;
        let pipeline = self.pipeline()?;
        let run = pipeline.run_batch(&batch, |_| {});
        Ok(Report::from_run(
            &batch.config.persona,
            &batch.config.job_to_be_done,
            run,
        ))
    }

    /// Rank in-memory documents for a persona and job.
    pub fn rank_documents(
        self,
        documents: &[SourceDocument],
        persona: &str,
        job_to_be_done: &str,
    ) -> Result<Report> {
        let pipeline = self.pipeline()?;
        let profile = PersonaProfile::new(persona, job_to_be_done);
        let run = pipeline.run(documents, &profile);
        Ok(Report::from_run(persona, job_to_be_done, run))
    }
}

impl Default for SectionRank {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_options() {
        let builder = SectionRank::new()
            .with_top_sections(3)
            .with_similarity(SimilarityMode::Jaccard)
            .parallel();

        assert_eq!(builder.options.limits.top_sections, 3);
        assert_eq!(builder.options.similarity, SimilarityMode::Jaccard);
        assert!(builder.options.parallel);
        assert!(builder.config_path.is_none());
    }

    #[test]
    fn test_builder_rejects_invalid_options() {
        let result = SectionRank::new()
            .with_options(RankOptions::new().with_max_refined_chars(2))
            .pipeline();
        assert!(result.is_err());
    }

    #[test]
    fn test_segment_bytes_rejects_non_pdf() {
        assert!(matches!(
            segment_bytes("x.pdf", b"<!DOCTYPE html>"),
            Err(Error::UnknownFormat)
        ));
    }

    #[test]
    fn test_rank_documents_all_skipped() {
        let docs = vec![SourceDocument::from_bytes("bad.pdf", b"nope".to_vec())];
        let report = SectionRank::new()
            .rank_documents(&docs, "Analyst", "Summarize revenue")
            .unwrap();
        assert!(report.extracted_sections.is_empty());
        assert_eq!(report.skipped_count(), 1);
        assert_eq!(report.metadata.input_documents, vec!["bad.pdf"]);
    }
}
