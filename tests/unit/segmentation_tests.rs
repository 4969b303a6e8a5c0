/*!
 * Tests for date rules and boundary detection
 */

use chrono::{Duration, NaiveDate};

use journal_ingest::app_config::DateFormat;
use journal_ingest::errors::SegmentationError;
use journal_ingest::segmentation::{DateRule, EntrySegmenter};
use crate::common;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_segment_withTwoInlineEntries_shouldSplitOnHeadings() {
    let segmenter = EntrySegmenter::default();

    let result = segmenter
        .segment("01/02/2020 I went for a walk. 01/03/2020 It rained.")
        .unwrap();

    assert_eq!(result.candidates.len(), 2);
    assert_eq!(result.candidates[0].date, date(2020, 1, 2));
    assert_eq!(result.candidates[0].raw_content, "I went for a walk.");
    assert_eq!(result.candidates[1].date, date(2020, 1, 3));
    assert_eq!(result.candidates[1].raw_content, "It rained.");
}

#[test]
fn test_segment_withNHeadings_shouldYieldNCandidatesInOrder() {
    let start = date(2021, 12, 28);
    let text = common::journal_text(start, 10);

    let result = EntrySegmenter::default().segment(&text).unwrap();

    assert_eq!(result.boundaries, 10);
    assert_eq!(result.candidates.len(), 10);
    for (offset, candidate) in result.candidates.iter().enumerate() {
        assert_eq!(candidate.date, start + Duration::days(offset as i64));
        assert!(candidate.raw_content.starts_with("Today was day number"));
        assert!(!candidate.raw_content.contains('\n'));
    }
    let offsets: Vec<usize> = result.candidates.iter().map(|c| c.offset).collect();
    let mut sorted = offsets.clone();
    sorted.sort_unstable();
    assert_eq!(offsets, sorted);
}

#[test]
fn test_segment_withWeekdayHeading_shouldPreferWeekdayRule() {
    let segmenter = EntrySegmenter::default();
    let text = "1/2/2020 \u{2013} Thursday\nCoffee with Dana.\n1/3/2020 \u{2013} Friday\nLong drive north.";

    let result = segmenter.segment(text).unwrap();

    assert_eq!(result.candidates.len(), 2);
    assert_eq!(result.candidates[0].date_string, "1/2/2020 \u{2013} Thursday");
    assert_eq!(result.candidates[0].raw_content, "Coffee with Dana.");
}

#[test]
fn test_segment_withMixedFormats_shouldParseEach() {
    let text = "2020-03-01 Iso heading entry.\nMarch 2, 2020 Long heading entry.\n03/03/2020 Slash heading entry.";

    let result = EntrySegmenter::default().segment(text).unwrap();

    let dates: Vec<NaiveDate> = result.candidates.iter().map(|c| c.date).collect();
    assert_eq!(dates, vec![date(2020, 3, 1), date(2020, 3, 2), date(2020, 3, 3)]);
}

#[test]
fn test_segment_withPreamble_shouldDiscardAndReport() {
    let text = "My 2020 journal\n\n01/02/2020 First entry text.";

    let result = EntrySegmenter::default().segment(text).unwrap();

    assert_eq!(result.preamble.as_deref(), Some("My 2020 journal"));
    assert_eq!(result.candidates.len(), 1);
}

#[test]
fn test_segment_withImpossibleDate_shouldDropItsSpan() {
    let text = "02/30/2020 Not a real day.\n03/01/2020 A real day.";

    let result = EntrySegmenter::default().segment(text).unwrap();

    assert_eq!(result.unparseable, vec!["02/30/2020".to_string()]);
    assert_eq!(result.candidates.len(), 1);
    assert_eq!(result.candidates[0].date, date(2020, 3, 1));
}

#[test]
fn test_segment_withoutHeadings_shouldFail() {
    let result = EntrySegmenter::default().segment("Just some notes without any dates.");
    assert!(matches!(result, Err(SegmentationError::NoBoundaries { .. })));
}

#[test]
fn test_segment_withOnlyEmptySpans_shouldFailWithNoEntries() {
    let result = EntrySegmenter::default().segment("01/02/2020\n01/03/2020\n");
    assert_eq!(result.unwrap_err(), SegmentationError::NoEntries { boundaries: 2 });
}

#[test]
fn test_fromFormats_shouldRestrictRecognizedHeadings() {
    let segmenter = EntrySegmenter::from_formats(&[DateFormat::Iso]);

    let result = segmenter.segment("2020-01-02 Kept. 01/03/2020 is just text now.").unwrap();

    assert_eq!(result.candidates.len(), 1);
    assert!(result.candidates[0].raw_content.contains("01/03/2020"));
}

#[test]
fn test_customRule_shouldPlugIntoSegmenter() {
    fn parse_dotted(caps: &regex::Captures) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(
            caps.name("year")?.as_str().parse().ok()?,
            caps.name("month")?.as_str().parse().ok()?,
            caps.name("day")?.as_str().parse().ok()?,
        )
    }
    let rule = DateRule::new(
        "dotted",
        r"\b(?P<day>\d{2})\.(?P<month>\d{2})\.(?P<year>\d{4})\b",
        parse_dotted,
    )
    .unwrap();
    let segmenter = EntrySegmenter::new(vec![rule]);

    let result = segmenter.segment("24.12.2020 Christmas eve at home.").unwrap();

    assert_eq!(result.candidates[0].date, date(2020, 12, 24));
    assert_eq!(segmenter.parse_date("24.12.2020").map(|(_, name)| name), Some("dotted"));
}
