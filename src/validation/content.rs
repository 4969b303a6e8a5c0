/*!
 * Content validation for journal entries.
 *
 * Covers the structural stage (source identity, non-empty content that
 * contains at least one letter) and the bounds stage (content length in
 * characters within the configured inclusive range).
 */

use crate::entry::NormalizedEntry;

/// Default minimum content length in characters
const DEFAULT_MIN_CONTENT_LENGTH: usize = 10;

/// Default maximum content length in characters
const DEFAULT_MAX_CONTENT_LENGTH: usize = 50_000;

/// Types of content issues
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentIssue {
    /// Entry has no source document name
    MissingSource,
    /// Content is empty after normalization
    EmptyContent,
    /// Content has no alphabetic character
    NoLetters,
    /// Content is shorter than the minimum
    TooShort { length: usize, min_length: usize },
    /// Content is longer than the maximum
    TooLong { length: usize, max_length: usize },
}

impl std::fmt::Display for ContentIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentIssue::MissingSource => write!(f, "missing source file"),
            ContentIssue::EmptyContent => write!(f, "content is empty"),
            ContentIssue::NoLetters => write!(f, "content contains no letters"),
            ContentIssue::TooShort { length, min_length } => {
                write!(f, "content too short: {} < {} chars", length, min_length)
            }
            ContentIssue::TooLong { length, max_length } => {
                write!(f, "content too long: {} > {} chars", length, max_length)
            }
        }
    }
}

/// Configuration for content validation
#[derive(Debug, Clone)]
pub struct ContentValidatorConfig {
    /// Minimum content length (inclusive)
    pub min_length: usize,
    /// Maximum content length (inclusive)
    pub max_length: usize,
}

impl Default for ContentValidatorConfig {
    fn default() -> Self {
        Self {
            min_length: DEFAULT_MIN_CONTENT_LENGTH,
            max_length: DEFAULT_MAX_CONTENT_LENGTH,
        }
    }
}

/// Content validator for journal entries
#[derive(Debug, Clone, Default)]
pub struct ContentValidator {
    config: ContentValidatorConfig,
}

impl ContentValidator {
    /// Create a new validator with custom configuration
    pub fn with_config(config: ContentValidatorConfig) -> Self {
        Self { config }
    }

    /// Structural stage
    pub fn check_structure(&self, entry: &NormalizedEntry) -> Option<ContentIssue> {
        if entry.source_file.trim().is_empty() {
            return Some(ContentIssue::MissingSource);
        }
        if entry.content.trim().is_empty() {
            return Some(ContentIssue::EmptyContent);
        }
        if !entry.content.chars().any(char::is_alphabetic) {
            return Some(ContentIssue::NoLetters);
        }
        None
    }

    /// Bounds stage
    pub fn check_bounds(&self, entry: &NormalizedEntry) -> Option<ContentIssue> {
        let length = entry.content.chars().count();

        if length < self.config.min_length {
            return Some(ContentIssue::TooShort {
                length,
                min_length: self.config.min_length,
            });
        }
        if length > self.config.max_length {
            return Some(ContentIssue::TooLong {
                length,
                max_length: self.config.max_length,
            });
        }
        None
    }
}
