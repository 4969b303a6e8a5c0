/*!
 * Database entity models.
 *
 * `JournalEntryRecord` maps one row of `journal_entries`. Optional analysis
 * fields are stored as JSON text.
 */

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::entry::NormalizedEntry;
use crate::persistence::Provenance;

/// Storage format for `entry_date`
pub const ENTRY_DATE_FORMAT: &str = "%Y-%m-%d";

/// A row of the journal_entries table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntryRecord {
    /// Database ID (None before insert)
    pub id: Option<i64>,
    pub task_id: String,
    pub source_file: String,
    pub source_hash: String,
    pub entry_number: i64,
    /// Calendar date, YYYY-MM-DD
    pub entry_date: String,
    pub content: String,
    pub word_count: i64,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    /// Sunday = 1 through Saturday = 7
    pub day_of_week: u32,
    pub sentiment_score: Option<f64>,
    /// JSON array of strings
    pub topics: Option<String>,
    /// JSON array of floats
    pub embedding: Option<String>,
    /// Insert timestamp (RFC 3339)
    pub created_at: String,
}

impl JournalEntryRecord {
    /// Build a record ready for insertion
    pub fn from_entry(entry: &NormalizedEntry, provenance: &Provenance) -> Result<Self> {
        let topics = entry
            .topics
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .context("Failed to encode topics")?;
        let embedding = entry
            .embedding
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .context("Failed to encode embedding")?;

        Ok(Self {
            id: None,
            task_id: provenance.task_id.clone(),
            source_file: entry.source_file.clone(),
            source_hash: provenance.source_hash.clone(),
            entry_number: entry.entry_number as i64,
            entry_date: entry.date.format(ENTRY_DATE_FORMAT).to_string(),
            content: entry.content.clone(),
            word_count: entry.word_count as i64,
            year: entry.year,
            month: entry.month,
            day: entry.day,
            day_of_week: entry.day_of_week,
            sentiment_score: entry.sentiment_score,
            topics,
            embedding,
            created_at: chrono::Utc::now().to_rfc3339(),
        })
    }

    /// Rebuild the domain entry
    pub fn to_entry(&self) -> Result<NormalizedEntry> {
        let date = NaiveDate::parse_from_str(&self.entry_date, ENTRY_DATE_FORMAT)
            .with_context(|| format!("Invalid entry_date '{}'", self.entry_date))?;

        let mut entry = NormalizedEntry::new(
            date,
            self.content.clone(),
            usize::try_from(self.word_count).unwrap_or(0),
            self.source_file.clone(),
            usize::try_from(self.entry_number).unwrap_or(0),
        );
        entry.sentiment_score = self.sentiment_score;
        entry.topics = self
            .topics
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .context("Failed to decode topics")?;
        entry.embedding = self
            .embedding
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .context("Failed to decode embedding")?;

        Ok(entry)
    }
}

/// Entry count for one year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearCount {
    pub year: i32,
    pub count: i64,
}
