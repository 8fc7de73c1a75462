//! Input loading: the run configuration and the batch of PDF documents.
//!
//! An input directory holds the PDFs to rank and exactly one JSON
//! configuration file naming the persona and the job to be done:
//!
//! ```json
//! {
//!   "persona": { "role": "Travel Planner" },
//!   "job_to_be_done": { "task": "Plan a trip of 4 days for a group of 10 college friends." },
//!   "documents": [{ "filename": "South of France - Cities.pdf", "title": "Cities" }]
//! }
//! ```
//!
//! `persona` and `job_to_be_done` may also be plain strings, and `jd` is
//! accepted in place of `job_to_be_done`.

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::detect::{classify_path, InputKind};
use crate::error::{Error, Result};

/// A document listed in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentEntry {
    /// File name inside the input directory
    pub filename: String,
    /// Optional human-readable title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PersonaField {
    Text(String),
    Object { role: String },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JobField {
    Text(String),
    Object { task: String },
}

#[derive(Deserialize)]
struct RawConfig {
    persona: Option<PersonaField>,
    job_to_be_done: Option<JobField>,
    jd: Option<String>,
    #[serde(default)]
    documents: Vec<DocumentEntry>,
    challenge_info: Option<serde_json::Value>,
}

/// The parsed run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Persona text
    pub persona: String,
    /// Job-to-be-done text
    pub job_to_be_done: String,
    /// Documents to rank, in order; empty means every PDF in the directory
    #[serde(default)]
    pub documents: Vec<DocumentEntry>,
    /// Free-form challenge description, carried for logging only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenge_info: Option<serde_json::Value>,
}

impl RunConfig {
    /// Create a configuration from persona and job text.
    pub fn new(persona: impl Into<String>, job_to_be_done: impl Into<String>) -> Self {
        Self {
            persona: persona.into(),
            job_to_be_done: job_to_be_done.into(),
            documents: Vec::new(),
            challenge_info: None,
        }
    }

    /// Parse a configuration from JSON text.
    ///
    /// Missing `persona` or job fields are errors; present but empty values
    /// are accepted and lead to degraded scoring.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawConfig = serde_json::from_str(json)?;

        let persona = match raw.persona {
            Some(PersonaField::Text(text)) | Some(PersonaField::Object { role: text }) => text,
            None => return Err(Error::MissingField("persona")),
        };
        let job_to_be_done = match (raw.job_to_be_done, raw.jd) {
            (Some(JobField::Text(text)), _) | (Some(JobField::Object { task: text }), _) => text,
            (None, Some(jd)) => jd,
            (None, None) => return Err(Error::MissingField("job_to_be_done")),
        };

        Ok(Self {
            persona,
            job_to_be_done,
            documents: raw.documents,
            challenge_info: raw.challenge_info,
        })
    }

    /// Read and parse a configuration file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

/// Where a document's bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    /// A file on disk, read when the document is processed
    Path(PathBuf),
    /// Bytes already in memory
    Bytes(Vec<u8>),
}

/// One document of the batch, identified by its file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    /// Document identifier used in every output record
    pub id: String,
    /// Content source
    pub source: DocumentSource,
}

impl SourceDocument {
    /// Document backed by a file.
    pub fn from_path(id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            source: DocumentSource::Path(path.into()),
        }
    }

    /// Document backed by bytes in memory.
    pub fn from_bytes(id: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            id: id.into(),
            source: DocumentSource::Bytes(data),
        }
    }

    /// Load the document bytes.
    pub fn read(&self) -> Result<Cow<'_, [u8]>> {
        match &self.source {
            DocumentSource::Path(path) => Ok(Cow::Owned(fs::read(path)?)),
            DocumentSource::Bytes(data) => Ok(Cow::Borrowed(data)),
        }
    }
}

/// Everything needed for a run, loaded from an input directory.
#[derive(Debug, Clone)]
pub struct InputBatch {
    /// Parsed configuration
    pub config: RunConfig,
    /// Path the configuration was read from
    pub config_path: PathBuf,
    /// Documents to process, in processing order
    pub documents: Vec<SourceDocument>,
    /// Documents listed in the configuration but absent from the directory
    pub missing: Vec<String>,
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Scan an input directory.
///
/// Without `config_path`, the directory must contain exactly one `.json`
/// file. PDFs are taken in the order the configuration lists them, or by
/// file name when it lists none.
pub fn load_input_dir(dir: &Path, config_path: Option<&Path>) -> Result<InputBatch> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .collect();
    files.sort_by_key(|p| file_name(p));

    let mut pdfs = Vec::new();
    let mut jsons = Vec::new();
    for path in files {
        match classify_path(&path) {
            InputKind::Pdf => pdfs.push(path),
            InputKind::Json => jsons.push(path),
            InputKind::Other => log::debug!("ignoring {}", path.display()),
        }
    }

    let config_path = match config_path {
        Some(path) => path.to_path_buf(),
        None => match jsons.as_slice() {
            [single] => single.clone(),
            [] => {
                return Err(Error::Config(format!(
                    "no JSON configuration file in {}",
                    dir.display()
                )))
            }
            many => {
                let names: Vec<String> = many.iter().map(|p| file_name(p)).collect();
                return Err(Error::Config(format!(
                    "multiple JSON files in {} ({}); choose one explicitly",
                    dir.display(),
                    names.join(", ")
                )));
            }
        },
    };
    let config = RunConfig::from_path(&config_path)?;
    if let Some(info) = &config.challenge_info {
        log::info!("challenge: {}", info);
    }

    let mut missing = Vec::new();
    let documents = if config.documents.is_empty() {
        pdfs.iter()
            .map(|p| SourceDocument::from_path(file_name(p), p.clone()))
            .collect()
    } else {
        let mut listed = Vec::new();
        for entry in &config.documents {
            match pdfs.iter().find(|p| file_name(p) == entry.filename) {
                Some(path) => listed.push(SourceDocument::from_path(&entry.filename, path.clone())),
                None => {
                    log::warn!("{}: listed in configuration but not found", entry.filename);
                    missing.push(entry.filename.clone());
                }
            }
        }
        listed
    };

    log::info!(
        "loaded {} documents and configuration {}",
        documents.len(),
        config_path.display()
    );

    Ok(InputBatch {
        config,
        config_path,
        documents,
        missing,
    })
}
