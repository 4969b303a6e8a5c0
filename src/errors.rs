/*!
 * Error types for the journal-ingest pipeline.
 *
 * One error enum per failure family, using the thiserror crate for
 * ergonomic definitions. Only `SegmentationError` and a whole-document
 * `ExtractionError` abort a task; the rest degrade into the task's error list.
 */

use thiserror::Error;

/// Errors raised by the extraction collaborator
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The document could not be read at all
    #[error("Failed to read document: {0}")]
    Io(#[from] std::io::Error),

    /// Every page of the document was unreadable or empty
    #[error("No readable pages in document ({pages} pages inspected)")]
    NoReadablePages {
        /// Number of pages the extractor returned
        pages: usize,
    },

    /// Any other collaborator-side failure (timeouts included)
    #[error("Extraction collaborator failed: {0}")]
    Collaborator(String),
}

/// Errors raised when boundary detection yields nothing to process
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SegmentationError {
    /// No date boundary was found anywhere in the text
    #[error("No date boundaries found in {chars} characters of text")]
    NoBoundaries {
        /// Length of the scanned text
        chars: usize,
    },

    /// Boundaries were found but none produced a usable entry
    #[error("Found {boundaries} date boundaries but no usable entries")]
    NoEntries {
        /// Number of boundaries detected
        boundaries: usize,
    },
}

/// Errors raised by the storage collaborator or the persistence coordinator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// The underlying storage rejected an operation
    #[error("Storage error: {0}")]
    Storage(String),

    /// The storage handle could not be locked
    #[error("Storage lock error: {0}")]
    Lock(String),

    /// The blocking persistence task did not complete
    #[error("Persistence task failed: {0}")]
    TaskJoin(String),
}

impl From<rusqlite::Error> for PersistenceError {
    fn from(error: rusqlite::Error) -> Self {
        Self::Storage(error.to_string())
    }
}

impl From<anyhow::Error> for PersistenceError {
    fn from(error: anyhow::Error) -> Self {
        Self::Storage(format!("{:#}", error))
    }
}

/// Errors raised while loading or checking configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A setting has an invalid value
    #[error("Invalid configuration for '{field}': {reason}")]
    Invalid {
        /// Name of the offending field
        field: &'static str,
        /// Why the value was rejected
        reason: String,
    },

    /// The configuration file could not be read or written
    #[error("Configuration file error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid JSON for `Config`
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConfigError {
    /// Shorthand for an invalid field
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Errors raised by the processing status store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatusError {
    /// The task id is unknown or its record has expired
    #[error("Task not found: {0}")]
    NotFound(String),

    /// The task already reached a terminal stage
    #[error("Task {task_id} is already {stage}")]
    AlreadyTerminal {
        /// The task id
        task_id: String,
        /// The terminal stage it is in
        stage: String,
    },
}

/// Top-level error for a pipeline run
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Input could not be staged for extraction
    #[error("Failed to stage document: {0}")]
    Staging(String),

    /// Extraction failed for the whole document
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Segmentation found nothing to process
    #[error("Segmentation error: {0}")]
    Segmentation(#[from] SegmentationError),

    /// Persistence could not run at all
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Configuration was rejected
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Status tracking failed
    #[error("Status error: {0}")]
    Status(#[from] StatusError),
}

impl From<std::io::Error> for PipelineError {
    fn from(error: std::io::Error) -> Self {
        Self::Staging(error.to_string())
    }
}
