/*!
 * Journal entry models shared by validation and persistence.
 */

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::normalizer::{word_count, TextNormalizer};
use crate::segmentation::CandidateEntry;

/// A cleaned journal entry, ready for validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedEntry {
    /// Calendar date of the entry
    pub date: NaiveDate,
    /// Normalized content
    pub content: String,
    /// Whitespace-token count of `content`
    pub word_count: usize,
    /// Calendar components, stored alongside the date
    pub year: i32,
    pub month: u32,
    pub day: u32,
    /// Day of week, Sunday = 1 through Saturday = 7
    pub day_of_week: u32,
    /// Original name of the source document
    pub source_file: String,
    /// 1-based position of the entry in its document
    pub entry_number: usize,
    /// Analysis fields; never populated by the ingestion pipeline
    pub sentiment_score: Option<f64>,
    pub topics: Option<Vec<String>>,
    pub embedding: Option<Vec<f32>>,
}

impl NormalizedEntry {
    /// Build an entry with calendar fields derived from `date`
    pub fn new(date: NaiveDate, content: String, word_count: usize, source_file: String, entry_number: usize) -> Self {
        Self {
            date,
            content,
            word_count,
            year: date.year(),
            month: date.month(),
            day: date.day(),
            day_of_week: date.weekday().number_from_sunday(),
            source_file,
            entry_number,
            sentiment_score: None,
            topics: None,
            embedding: None,
        }
    }

    /// Normalize a candidate; the word count describes the normalized content
    pub fn from_candidate(
        candidate: &CandidateEntry,
        normalizer: &TextNormalizer,
        source_file: &str,
        entry_number: usize,
    ) -> Self {
        let content = normalizer.normalize(&candidate.raw_content);
        let words = word_count(&content);
        Self::new(candidate.date, content, words, source_file.to_string(), entry_number)
    }

    /// Identifier used in rejection and failure reports
    pub fn label(&self) -> String {
        format!("entry #{} ({})", self.entry_number, self.date)
    }
}

/// An entry committed to storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedEntry {
    /// Storage-assigned identifier
    pub id: i64,
    /// The stored entry
    pub entry: NormalizedEntry,
}
