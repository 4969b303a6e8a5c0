/*!
 * # journal-ingest
 *
 * A library for turning exported journal documents into dated, validated
 * entries stored in SQLite.
 *
 * ## Features
 *
 * - Date-heading segmentation with configurable heading formats
 * - Idempotent text cleanup for extraction artifacts
 * - Staged entry validation with a rejection reason for every entry
 * - Batch persistence with per-entry retry fallback
 * - Concurrent document runs with pollable, TTL-bounded progress records
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `segmentation`: Date rules and boundary detection
 * - `normalizer`: Text cleanup
 * - `entry`: Entry models shared across stages
 * - `validation`: Staged entry validation
 * - `persistence`: Storage seam and the batch coordinator
 * - `database`: SQLite storage
 * - `extraction`: Page extraction collaborator
 * - `status`: Processing status registry
 * - `pipeline`: The controller that runs a document through every stage
 * - `file_utils`: Input discovery
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod database;
pub mod entry;
pub mod errors;
pub mod extraction;
pub mod file_utils;
pub mod normalizer;
pub mod persistence;
pub mod pipeline;
pub mod segmentation;
pub mod status;
pub mod validation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use entry::{NormalizedEntry, PersistedEntry};
pub use errors::{
    ConfigError, ExtractionError, PersistenceError, PipelineError, SegmentationError, StatusError,
};
pub use normalizer::TextNormalizer;
pub use persistence::{BatchPersistenceCoordinator, EntryStore, PersistenceOutcome};
pub use pipeline::{Document, PipelineController, PipelineReport};
pub use segmentation::EntrySegmenter;
pub use status::{ProcessingStatusStore, TaskSnapshot};
pub use validation::EntryValidator;
