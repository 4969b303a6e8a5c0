/*!
 * Temporal validation: future dates, year range and calendar consistency.
 */

use chrono::{Datelike, NaiveDate};

use crate::entry::NormalizedEntry;

/// Types of temporal issues
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemporalIssue {
    /// Entry is dated after the processing date
    FutureDate { date: NaiveDate, today: NaiveDate },
    /// Entry year falls outside the accepted range
    YearOutOfRange { year: i32, min_year: i32, max_year: i32 },
    /// Stored year/month/day disagree with the date
    ComponentMismatch { date: NaiveDate, year: i32, month: u32, day: u32 },
}

impl std::fmt::Display for TemporalIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemporalIssue::FutureDate { date, today } => {
                write!(f, "date {} is in the future (processing date {})", date, today)
            }
            TemporalIssue::YearOutOfRange { year, min_year, max_year } => {
                write!(f, "year {} outside valid range {}-{}", year, min_year, max_year)
            }
            TemporalIssue::ComponentMismatch { date, year, month, day } => {
                write!(f, "date components {}-{}-{} do not match date {}", year, month, day, date)
            }
        }
    }
}

/// Temporal validator with an inclusive year range
#[derive(Debug, Clone)]
pub struct TemporalValidator {
    min_year: i32,
    max_year: i32,
}

impl TemporalValidator {
    pub fn new(min_year: i32, max_year: i32) -> Self {
        Self { min_year, max_year }
    }

    /// Temporal stage against the processing date `today`
    pub fn check(&self, entry: &NormalizedEntry, today: NaiveDate) -> Option<TemporalIssue> {
        if entry.date > today {
            return Some(TemporalIssue::FutureDate { date: entry.date, today });
        }

        let year = entry.date.year();
        if year < self.min_year || year > self.max_year {
            return Some(TemporalIssue::YearOutOfRange {
                year,
                min_year: self.min_year,
                max_year: self.max_year,
            });
        }

        if entry.year != year || entry.month != entry.date.month() || entry.day != entry.date.day() {
            return Some(TemporalIssue::ComponentMismatch {
                date: entry.date,
                year: entry.year,
                month: entry.month,
                day: entry.day,
            });
        }

        None
    }
}
