/*!
 * Boundary detection: splits document text into dated candidate entries.
 */

use chrono::NaiveDate;
use log::{debug, info, warn};

use crate::app_config::DateFormat;
use crate::errors::SegmentationError;

use super::rules::{rules_for, DateRule};

/// A date heading located in the text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Boundary {
    /// Byte offset where the heading starts
    pub start: usize,
    /// Byte offset just past the heading
    pub end: usize,
    /// Index of the rule whose pattern matched
    pub rule_index: usize,
}

/// A text span bounded by two date headings, not yet validated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateEntry {
    /// The heading text as it appeared
    pub date_string: String,
    /// The parsed heading
    pub date: NaiveDate,
    /// Trimmed text between this heading and the next one
    pub raw_content: String,
    /// Byte offset of the heading in the scanned text
    pub offset: usize,
}

/// Result of segmenting one document
#[derive(Debug, Clone, Default)]
pub struct Segmentation {
    /// Candidate entries in document order
    pub candidates: Vec<CandidateEntry>,
    /// Discarded text before the first heading, if any
    pub preamble: Option<String>,
    /// Headings no rule could parse; their spans were dropped
    pub unparseable: Vec<String>,
    /// Number of headings found
    pub boundaries: usize,
}

/// Splits raw text into candidate entries using an ordered list of date rules
#[derive(Debug, Clone)]
pub struct EntrySegmenter {
    rules: Vec<DateRule>,
}

impl EntrySegmenter {
    /// Create a segmenter; rule order is parse priority
    pub fn new(rules: Vec<DateRule>) -> Self {
        Self { rules }
    }

    /// Create a segmenter from configured built-in formats
    pub fn from_formats(formats: &[DateFormat]) -> Self {
        Self::new(rules_for(formats))
    }

    /// The rules in priority order
    pub fn rules(&self) -> &[DateRule] {
        &self.rules
    }

    /// Locate date headings with one leftmost, non-overlapping scan over all rules.
    ///
    /// Matches from every rule are ordered by start offset, ties going to the
    /// higher-priority rule, and any match overlapping an earlier pick is skipped.
    pub fn find_boundaries(&self, text: &str) -> Vec<Boundary> {
        let mut matches: Vec<Boundary> = self
            .rules
            .iter()
            .enumerate()
            .flat_map(|(rule_index, rule)| {
                rule.find_iter(text).map(move |m| Boundary {
                    start: m.start(),
                    end: m.end(),
                    rule_index,
                })
            })
            .collect();

        matches.sort_by_key(|b| (b.start, b.rule_index));

        let mut boundaries: Vec<Boundary> = Vec::with_capacity(matches.len());
        let mut last_end = 0;
        for boundary in matches {
            if boundary.start < last_end {
                continue;
            }
            last_end = boundary.end;
            boundaries.push(boundary);
        }

        boundaries
    }

    /// Parse a heading by trying each rule in priority order
    pub fn parse_date(&self, date_string: &str) -> Option<(NaiveDate, &str)> {
        self.rules
            .iter()
            .find_map(|rule| rule.parse(date_string).map(|date| (date, rule.name())))
    }

    /// Split `text` into candidate entries.
    ///
    /// A date-shaped string inside an entry body is indistinguishable from a
    /// heading and splits that entry.
    pub fn segment(&self, text: &str) -> Result<Segmentation, SegmentationError> {
        let boundaries = self.find_boundaries(text);

        if boundaries.is_empty() {
            return Err(SegmentationError::NoBoundaries {
                chars: text.chars().count(),
            });
        }

        let mut segmentation = Segmentation {
            boundaries: boundaries.len(),
            ..Default::default()
        };

        let preamble = text[..boundaries[0].start].trim();
        if !preamble.is_empty() {
            warn!(
                "Discarding {} characters of text before the first date heading",
                preamble.chars().count()
            );
            segmentation.preamble = Some(preamble.to_string());
        }

        for (index, boundary) in boundaries.iter().enumerate() {
            let span_end = boundaries
                .get(index + 1)
                .map(|next| next.start)
                .unwrap_or(text.len());
            let date_string = text[boundary.start..boundary.end].to_string();
            let raw_content = text[boundary.end..span_end].trim();

            let Some((date, rule_name)) = self.parse_date(&date_string) else {
                warn!("Unparseable date heading '{}' at offset {}, dropping its span", date_string, boundary.start);
                segmentation.unparseable.push(date_string);
                continue;
            };

            if raw_content.is_empty() {
                debug!("Empty entry under heading '{}', skipping", date_string);
                continue;
            }

            debug!("Entry for {} matched by rule {} ({} chars)", date, rule_name, raw_content.len());

            segmentation.candidates.push(CandidateEntry {
                date_string,
                date,
                raw_content: raw_content.to_string(),
                offset: boundary.start,
            });
        }

        if segmentation.candidates.is_empty() {
            return Err(SegmentationError::NoEntries {
                boundaries: segmentation.boundaries,
            });
        }

        info!(
            "Segmented {} candidate entries from {} date headings",
            segmentation.candidates.len(),
            segmentation.boundaries
        );

        Ok(segmentation)
    }
}

impl Default for EntrySegmenter {
    fn default() -> Self {
        Self::from_formats(&crate::app_config::SegmentationConfig::default().date_formats)
    }
}
