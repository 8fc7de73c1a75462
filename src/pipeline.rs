//! End-to-end processing: extract, segment, and score each document, then
//! rank the pooled sections.
//!
//! A document that cannot be read or extracted is recorded as skipped and
//! the run continues with the rest. Documents are independent; with
//! `parallel` they are processed on the rayon pool and merged in input
//! order, so the result does not depend on completion order.

use rayon::prelude::*;

use crate::error::Result;
use crate::extract::ExtractorChain;
use crate::input::{InputBatch, SourceDocument};
use crate::model::{DocumentStatus, RankedOutput, ScoredSection};
use crate::options::RankOptions;
use crate::rank::Ranker;
use crate::score::{PersonaProfile, Scorer};
use crate::segment::Segmenter;
use crate::text::SimilarityMode;

/// Outcome of one document.
#[derive(Debug, Clone)]
pub struct DocumentResult {
    /// Extraction and segmentation status
    pub status: DocumentStatus,
    /// Scored sections, empty when skipped
    pub sections: Vec<ScoredSection>,
}

/// Outcome of a whole run.
#[derive(Debug, Clone)]
pub struct RunResult {
    /// Ranked arrays
    pub output: RankedOutput,
    /// Per-document status in input order
    pub documents: Vec<DocumentStatus>,
    /// Similarity strategy used for content relevance
    pub similarity: SimilarityMode,
    /// True when the persona produced no keywords
    pub degraded: bool,
}

/// Configured extract → segment → score → rank pipeline.
pub struct Pipeline {
    chain: ExtractorChain,
    segmenter: Segmenter,
    scorer: Scorer,
    options: RankOptions,
}

impl Pipeline {
    /// Create a pipeline with the default extractor chain.
    ///
    /// Fails if the options do not validate.
    pub fn new(options: RankOptions) -> Result<Self> {
        let scorer = Scorer::new(&options)?;
        Ok(Self {
            chain: ExtractorChain::with_defaults(),
            segmenter: Segmenter::new(),
            scorer,
            options,
        })
    }

    /// Replace the extractor chain.
    pub fn with_chain(mut self, chain: ExtractorChain) -> Self {
        self.chain = chain;
        self
    }

    /// Replace the segmenter.
    pub fn with_segmenter(mut self, segmenter: Segmenter) -> Self {
        self.segmenter = segmenter;
        self
    }

    /// Options in effect.
    pub fn options(&self) -> &RankOptions {
        &self.options
    }

    /// Extract, segment, and score one document.
    pub fn process_document(
        &self,
        document: &SourceDocument,
        profile: &PersonaProfile,
    ) -> DocumentResult {
        let id = document.id.as_str();

        let data = match document.read() {
            Ok(data) => data,
            Err(e) => return skipped(id, e.to_string()),
        };
        let extraction = match self.chain.extract(&data) {
            Ok(extraction) => extraction,
            Err(e) => return skipped(id, e.to_string()),
        };

        let sections = self.segmenter.segment(id, &extraction.pages);
        let pages_with_text = extraction.pages_with_text();
        log::info!(
            "{}: {} pages ({} with text) via {}, {} sections",
            id,
            extraction.pages.len(),
            pages_with_text,
            extraction.extractor,
            sections.len()
        );

        DocumentResult {
            status: DocumentStatus::extracted(
                id,
                extraction.extractor,
                pages_with_text,
                sections.len(),
            ),
            sections: self.scorer.score_document(&sections, profile),
        }
    }

    /// Process documents and rank the pooled sections.
    pub fn run(&self, documents: &[SourceDocument], profile: &PersonaProfile) -> RunResult {
        self.run_with_progress(documents, profile, |_| {})
    }

    /// Like [`run`](Self::run), calling `on_document` as each document finishes.
    pub fn run_with_progress<F>(
        &self,
        documents: &[SourceDocument],
        profile: &PersonaProfile,
        on_document: F,
    ) -> RunResult
    where
        F: Fn(&DocumentStatus) + Sync,
    {
        if profile.is_empty() {
            log::warn!("persona and job yield no keywords; ranking by length and position only");
        }

        let process = |document: &SourceDocument| {
            let result = self.process_document(document, profile);
            on_document(&result.status);
            result
        };
        let results: Vec<DocumentResult> = if self.options.parallel {
            documents.par_iter().map(process).collect()
        } else {
            documents.iter().map(process).collect()
        };

        let mut statuses = Vec::with_capacity(results.len());
        let mut pooled = Vec::new();
        for result in results {
            statuses.push(result.status);
            pooled.extend(result.sections);
        }

        let ranker = Ranker::new(self.options.limits, self.scorer.similarity());
        RunResult {
            output: ranker.rank(pooled, profile),
            documents: statuses,
            similarity: self.options.similarity,
            degraded: profile.is_empty(),
        }
    }

    /// Run a loaded input batch, recording listed-but-missing documents as skipped.
    pub fn run_batch<F>(&self, batch: &InputBatch, on_document: F) -> RunResult
    where
        F: Fn(&DocumentStatus) + Sync,
    {
        let profile = PersonaProfile::new(&batch.config.persona, &batch.config.job_to_be_done);
        let mut result = self.run_with_progress(&batch.documents, &profile, on_document);
        result.documents.extend(
            batch
                .missing
                .iter()
                .map(|name| DocumentStatus::skipped(name, "listed in configuration but not found")),
        );
        result
    }
}

fn skipped(id: &str, reason: String) -> DocumentResult {
    log::warn!("{}: skipped ({})", id, reason);
    DocumentResult {
        status: DocumentStatus::skipped(id, reason),
        sections: Vec::new(),
    }
}
