/*!
 * Date heading rules used for boundary detection.
 *
 * Each rule pairs an unanchored scan pattern with a parse function. The
 * segmenter scans with every rule and parses a matched heading by trying the
 * rules in priority order, the first rule whose anchored pattern and parse
 * function both accept the string wins.
 */

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::{Captures, Match, Regex};

use crate::app_config::DateFormat;

/// Parse function turning the captures of a rule's anchored pattern into a date
pub type ParseFn = fn(&Captures) -> Option<NaiveDate>;

const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September", "October",
    "November", "December",
];

// @const: 1/2/2020 – Thursday (weekday is part of the heading)
const US_SLASH_WITH_WEEKDAY_PATTERN: &str = r"\b(?P<month>\d{1,2})/(?P<day>\d{1,2})/(?P<year>\d{4})\s*[-\x{2013}\x{2014}]\s*(?:Monday|Tuesday|Wednesday|Thursday|Friday|Saturday|Sunday)\b";

// @const: 01/02/2020
const US_SLASH_PATTERN: &str = r"\b(?P<month>\d{1,2})/(?P<day>\d{1,2})/(?P<year>\d{4})\b";

// @const: 2020-01-02
const ISO_PATTERN: &str = r"\b(?P<year>\d{4})-(?P<month>\d{2})-(?P<day>\d{2})\b";

// @const: January 2, 2020
const LONG_MONTH_PATTERN: &str = r"\b(?P<month>January|February|March|April|May|June|July|August|September|October|November|December)\s+(?P<day>\d{1,2}),?\s+(?P<year>\d{4})\b";

static US_SLASH_WITH_WEEKDAY_RULE: Lazy<DateRule> = Lazy::new(|| {
    DateRule::new("us_slash_with_weekday", US_SLASH_WITH_WEEKDAY_PATTERN, parse_numeric).unwrap()
});

static US_SLASH_RULE: Lazy<DateRule> = Lazy::new(|| {
    DateRule::new("us_slash", US_SLASH_PATTERN, parse_numeric).unwrap()
});

static ISO_RULE: Lazy<DateRule> = Lazy::new(|| {
    DateRule::new("iso", ISO_PATTERN, parse_numeric).unwrap()
});

static LONG_MONTH_RULE: Lazy<DateRule> = Lazy::new(|| {
    DateRule::new("long_month", LONG_MONTH_PATTERN, parse_long_month).unwrap()
});

/// A date heading rule: scan pattern plus parse function
#[derive(Clone)]
pub struct DateRule {
    name: String,
    pattern: Regex,
    anchored: Regex,
    parse: ParseFn,
}

impl DateRule {
    /// Build a rule from a pattern; the anchored form is derived from it
    pub fn new(name: impl Into<String>, pattern: &str, parse: ParseFn) -> Result<Self, regex::Error> {
        Ok(Self {
            name: name.into(),
            pattern: Regex::new(pattern)?,
            anchored: Regex::new(&format!(r"^(?:{})$", pattern))?,
            parse,
        })
    }

    /// Built-in rule for a configured format
    pub fn for_format(format: DateFormat) -> Self {
        match format {
            DateFormat::UsSlashWithWeekday => US_SLASH_WITH_WEEKDAY_RULE.clone(),
            DateFormat::UsSlash => US_SLASH_RULE.clone(),
            DateFormat::Iso => ISO_RULE.clone(),
            DateFormat::LongMonth => LONG_MONTH_RULE.clone(),
        }
    }

    /// Rule name for logs
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All non-overlapping matches of this rule in `text`
    pub fn find_iter<'t>(&self, text: &'t str) -> impl Iterator<Item = Match<'t>> + use<'_, 't> {
        self.pattern.find_iter(text)
    }

    /// Parse a whole date heading with this rule
    pub fn parse(&self, date_string: &str) -> Option<NaiveDate> {
        let captures = self.anchored.captures(date_string.trim())?;
        (self.parse)(&captures)
    }
}

impl std::fmt::Debug for DateRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DateRule")
            .field("name", &self.name)
            .field("pattern", &self.pattern.as_str())
            .finish()
    }
}

/// Built-in rules for the configured formats, in priority order
pub fn rules_for(formats: &[DateFormat]) -> Vec<DateRule> {
    formats.iter().map(|format| DateRule::for_format(*format)).collect()
}

fn capture_number<T: std::str::FromStr>(captures: &Captures, name: &str) -> Option<T> {
    captures.name(name)?.as_str().parse().ok()
}

/// Parse `year`, `month` and `day` numeric captures
pub fn parse_numeric(captures: &Captures) -> Option<NaiveDate> {
    let year: i32 = capture_number(captures, "year")?;
    let month: u32 = capture_number(captures, "month")?;
    let day: u32 = capture_number(captures, "day")?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parse a month-name capture with numeric `day` and `year`
pub fn parse_long_month(captures: &Captures) -> Option<NaiveDate> {
    let month_name = captures.name("month")?.as_str();
    let month = MONTH_NAMES.iter().position(|m| *m == month_name)? as u32 + 1;
    let year: i32 = capture_number(captures, "year")?;
    let day: u32 = capture_number(captures, "day")?;
    NaiveDate::from_ymd_opt(year, month, day)
}
