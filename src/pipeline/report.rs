/*!
 * Summary of one document run.
 */

use serde::Serialize;

use crate::validation::EntryRejection;

/// What a completed run did with a document
#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineReport {
    pub task_id: String,
    /// Original name of the uploaded document
    pub source_file: String,
    /// SHA-256 of the document bytes, hex encoded
    pub document_hash: String,
    /// Pages returned by extraction
    pub pages: usize,
    /// 1-based numbers of pages that could not be read
    pub skipped_pages: Vec<usize>,
    /// Candidate entries found by segmentation
    pub candidates: usize,
    /// Entries that passed validation
    pub accepted: usize,
    pub rejections: Vec<EntryRejection>,
    /// Entries committed to storage
    pub success_count: usize,
    /// Every non-fatal problem, in the order it occurred
    pub errors: Vec<String>,
}

impl PipelineReport {
    /// Entries that passed validation but were not stored
    pub fn failed_count(&self) -> usize {
        self.accepted.saturating_sub(self.success_count)
    }

    pub fn summary(&self) -> String {
        format!(
            "{}: {} stored, {} rejected, {} failed ({} candidates, {} pages, {} skipped)",
            self.source_file,
            self.success_count,
            self.rejections.len(),
            self.failed_count(),
            self.candidates,
            self.pages,
            self.skipped_pages.len()
        )
    }
}
