/*!
 * Consistency validation: declared word count against the content, and a
 * characters-per-word ceiling that catches garbled extraction.
 */

use crate::entry::NormalizedEntry;
use crate::normalizer::word_count;

/// Types of consistency issues
#[derive(Debug, Clone, PartialEq)]
pub enum ConsistencyIssue {
    /// Declared word count is zero
    NoWords,
    /// Declared and actual word counts differ by more than the tolerance
    WordCountMismatch { declared: usize, actual: usize, tolerance: usize },
    /// Average characters per word is at or above the threshold
    SuspiciousRatio { ratio: f64, threshold: f64 },
}

impl std::fmt::Display for ConsistencyIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConsistencyIssue::NoWords => write!(f, "entry has no words"),
            ConsistencyIssue::WordCountMismatch { declared, actual, tolerance } => {
                write!(
                    f,
                    "word count mismatch: declared {}, actual {} (tolerance {})",
                    declared, actual, tolerance
                )
            }
            ConsistencyIssue::SuspiciousRatio { ratio, threshold } => {
                write!(f, "suspicious average word length: {:.2} >= {:.2}", ratio, threshold)
            }
        }
    }
}

/// Consistency validator
#[derive(Debug, Clone)]
pub struct ConsistencyValidator {
    word_count_tolerance: usize,
    suspicious_ratio_threshold: f64,
}

impl ConsistencyValidator {
    pub fn new(word_count_tolerance: usize, suspicious_ratio_threshold: f64) -> Self {
        Self {
            word_count_tolerance,
            suspicious_ratio_threshold,
        }
    }

    /// Characters per declared word
    pub fn calculate_ratio(entry: &NormalizedEntry) -> f64 {
        if entry.word_count == 0 {
            return f64::INFINITY;
        }
        entry.content.chars().count() as f64 / entry.word_count as f64
    }

    /// Consistency stage
    pub fn check(&self, entry: &NormalizedEntry) -> Option<ConsistencyIssue> {
        if entry.word_count == 0 {
            return Some(ConsistencyIssue::NoWords);
        }

        let actual = word_count(&entry.content);
        if entry.word_count.abs_diff(actual) > self.word_count_tolerance {
            return Some(ConsistencyIssue::WordCountMismatch {
                declared: entry.word_count,
                actual,
                tolerance: self.word_count_tolerance,
            });
        }

        let ratio = Self::calculate_ratio(entry);
        if ratio >= self.suspicious_ratio_threshold {
            return Some(ConsistencyIssue::SuspiciousRatio {
                ratio,
                threshold: self.suspicious_ratio_threshold,
            });
        }

        None
    }
}
