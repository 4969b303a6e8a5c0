/*!
 * Validation service that runs every stage over a batch of entries.
 *
 * Entries are ordered chronologically (stable) before checking. Each entry
 * runs structural, bounds, temporal and consistency stages, stopping at the
 * first failure. The first surviving entry for a calendar date wins; later
 * ones are rejected as duplicates.
 */

use std::collections::HashSet;

use chrono::NaiveDate;
use log::{debug, warn};
use serde::Serialize;

use crate::app_config::ValidationConfig;
use crate::entry::NormalizedEntry;

use super::consistency::{ConsistencyIssue, ConsistencyValidator};
use super::content::{ContentIssue, ContentValidator, ContentValidatorConfig};
use super::temporal::{TemporalIssue, TemporalValidator};

/// Why an entry was rejected
#[derive(Debug, Clone, PartialEq)]
pub enum RejectionReason {
    Structure(ContentIssue),
    Bounds(ContentIssue),
    Temporal(TemporalIssue),
    Consistency(ConsistencyIssue),
    DuplicateDate(NaiveDate),
}

impl RejectionReason {
    /// Stage name, used in logs
    pub fn stage(&self) -> &'static str {
        match self {
            RejectionReason::Structure(_) => "structure",
            RejectionReason::Bounds(_) => "bounds",
            RejectionReason::Temporal(_) => "temporal",
            RejectionReason::Consistency(_) => "consistency",
            RejectionReason::DuplicateDate(_) => "duplicate",
        }
    }
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectionReason::Structure(issue) | RejectionReason::Bounds(issue) => write!(f, "{}", issue),
            RejectionReason::Temporal(issue) => write!(f, "{}", issue),
            RejectionReason::Consistency(issue) => write!(f, "{}", issue),
            RejectionReason::DuplicateDate(date) => write!(f, "duplicate date {}", date.format("%Y-%m-%d")),
        }
    }
}

/// Verdict for a single entry
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationVerdict {
    pub entry_number: usize,
    pub date: NaiveDate,
    pub accepted: bool,
    pub reason: Option<RejectionReason>,
}

impl ValidationVerdict {
    fn accept(entry: &NormalizedEntry) -> Self {
        Self {
            entry_number: entry.entry_number,
            date: entry.date,
            accepted: true,
            reason: None,
        }
    }

    fn reject(entry: &NormalizedEntry, reason: RejectionReason) -> Self {
        Self {
            entry_number: entry.entry_number,
            date: entry.date,
            accepted: false,
            reason: Some(reason),
        }
    }
}

/// A rejected entry, as reported to callers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryRejection {
    pub entry_number: usize,
    pub date: NaiveDate,
    pub reason: String,
}

/// Result of validating a batch
#[derive(Debug, Clone, Default)]
pub struct ValidationOutcome {
    /// Accepted entries in chronological order
    pub accepted: Vec<NormalizedEntry>,
    /// Rejected entries with human-readable reasons
    pub rejections: Vec<EntryRejection>,
    /// One verdict per input entry, in chronological order
    pub verdicts: Vec<ValidationVerdict>,
}

impl ValidationOutcome {
    /// Total entries validated
    pub fn total(&self) -> usize {
        self.verdicts.len()
    }

    /// Verdict for an entry number, if it was part of the batch
    pub fn verdict_for(&self, entry_number: usize) -> Option<&ValidationVerdict> {
        self.verdicts.iter().find(|v| v.entry_number == entry_number)
    }

    /// Get a summary string
    pub fn summary(&self) -> String {
        format!(
            "Validation: {}/{} accepted, {} rejected",
            self.accepted.len(),
            self.total(),
            self.rejections.len()
        )
    }
}

/// Staged validator for normalized entries
#[derive(Debug, Clone)]
pub struct EntryValidator {
    content_validator: ContentValidator,
    temporal_validator: TemporalValidator,
    consistency_validator: ConsistencyValidator,
}

impl Default for EntryValidator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}

impl EntryValidator {
    pub fn new(config: ValidationConfig) -> Self {
        Self {
            content_validator: ContentValidator::with_config(ContentValidatorConfig {
                min_length: config.min_content_length,
                max_length: config.max_content_length,
            }),
            temporal_validator: TemporalValidator::new(config.min_year, config.max_year),
            consistency_validator: ConsistencyValidator::new(
                config.word_count_tolerance,
                config.suspicious_ratio_threshold,
            ),
        }
    }

    /// Run stages 1 through 4 on one entry
    pub fn check_entry(&self, entry: &NormalizedEntry, today: NaiveDate) -> Option<RejectionReason> {
        if let Some(issue) = self.content_validator.check_structure(entry) {
            return Some(RejectionReason::Structure(issue));
        }
        if let Some(issue) = self.content_validator.check_bounds(entry) {
            return Some(RejectionReason::Bounds(issue));
        }
        if let Some(issue) = self.temporal_validator.check(entry, today) {
            return Some(RejectionReason::Temporal(issue));
        }
        self.consistency_validator
            .check(entry)
            .map(RejectionReason::Consistency)
    }

    /// Validate a batch against the processing date `today`
    pub fn validate(&self, mut entries: Vec<NormalizedEntry>, today: NaiveDate) -> ValidationOutcome {
        // sort_by_key is stable, ties keep document order
        entries.sort_by_key(|e| e.date);

        let mut outcome = ValidationOutcome::default();
        let mut seen_dates: HashSet<NaiveDate> = HashSet::new();

        for entry in entries {
            let reason = match self.check_entry(&entry, today) {
                Some(reason) => Some(reason),
                None if !seen_dates.insert(entry.date) => Some(RejectionReason::DuplicateDate(entry.date)),
                None => None,
            };

            match reason {
                Some(reason) => {
                    warn!("Rejected {} at {} stage: {}", entry.label(), reason.stage(), reason);
                    outcome.rejections.push(EntryRejection {
                        entry_number: entry.entry_number,
                        date: entry.date,
                        reason: reason.to_string(),
                    });
                    outcome.verdicts.push(ValidationVerdict::reject(&entry, reason));
                }
                None => {
                    outcome.verdicts.push(ValidationVerdict::accept(&entry));
                    outcome.accepted.push(entry);
                }
            }
        }

        debug!("{}", outcome.summary());
        outcome
    }

    /// Validate using the local calendar date
    pub fn validate_now(&self, entries: Vec<NormalizedEntry>) -> ValidationOutcome {
        self.validate(entries, chrono::Local::now().date_naive())
    }
}
