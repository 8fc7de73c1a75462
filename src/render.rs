//! JSON report rendering.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{DocumentStatus, ExtractedSection, SubsectionAnalysis};
use crate::pipeline::RunResult;
use crate::text::SimilarityMode;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Run metadata written ahead of the ranked arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Every input document, in processing order
    pub input_documents: Vec<String>,
    /// Persona text
    pub persona: String,
    /// Job-to-be-done text
    pub job_to_be_done: String,
    /// When the report was produced
    pub processing_timestamp: DateTime<Utc>,
    /// Similarity strategy used for content relevance
    pub similarity: SimilarityMode,
    /// Whether scoring fell back to length and position only
    pub degraded_scoring: bool,
    /// Per-document extraction status
    pub documents: Vec<DocumentStatus>,
}

/// The complete output of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Run metadata
    pub metadata: ReportMetadata,
    /// Top sections across all documents
    pub extracted_sections: Vec<ExtractedSection>,
    /// Refined spans of the top sections
    pub subsection_analysis: Vec<SubsectionAnalysis>,
}

impl Report {
    /// Build a report from a finished run, stamped with the current time.
    pub fn from_run(persona: &str, job_to_be_done: &str, run: RunResult) -> Self {
        let input_documents = run.documents.iter().map(|d| d.document.clone()).collect();
        Self {
            metadata: ReportMetadata {
                input_documents,
                persona: persona.to_string(),
                job_to_be_done: job_to_be_done.to_string(),
                processing_timestamp: Utc::now(),
                similarity: run.similarity,
                degraded_scoring: run.degraded,
                documents: run.documents,
            },
            extracted_sections: run.output.extracted_sections,
            subsection_analysis: run.output.subsection_analysis,
        }
    }

    /// Replace the processing timestamp.
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.metadata.processing_timestamp = timestamp;
        self
    }

    /// Number of documents that were skipped.
    pub fn skipped_count(&self) -> usize {
        self.metadata
            .documents
            .iter()
            .filter(|d| !d.succeeded())
            .count()
    }
}

/// Convert a report to JSON.
pub fn to_json(report: &Report, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(report),
        JsonFormat::Compact => serde_json::to_string(report),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

/// Write a report to `path`, creating parent directories as needed.
pub fn write_report(report: &Report, path: &Path, format: JsonFormat) -> Result<()> {
    let json = to_json(report, format)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, json)?;
    log::info!("wrote report to {}", path.display());
    Ok(())
}
