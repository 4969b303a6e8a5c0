/*!
 * Text normalization for extracted journal content.
 *
 * Removes control characters and scanning artifacts, canonicalizes
 * punctuation and collapses whitespace while keeping paragraph breaks.
 * `normalize` applies the cleanup pass until the text stops changing, so
 * normalizing already-normalized text is a no-op.
 */

use once_cell::sync::Lazy;
use regex::Regex;

// @const: Inline image references left by OCR tools
static IMAGE_REFERENCE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\[Image:[^\]]*\]").unwrap()
});

// @const: Horizontal rules and table separators
static RULE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[-_=]{3,}").unwrap()
});

// @const: Table corner and junction marks left after rule removal (+--+ becomes ++)
static TABLE_CORNER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\+(?:\s*\+)+").unwrap()
});

// @const: Page number lines (12, Page 3, Page 3 of 9, - 4 -)
static PAGE_NUMBER_LINE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:page\s+\d+(?:\s+of\s+\d+)?|-?\s*\d+\s*-?)\s*$").unwrap()
});

// @const: Figure and image caption lines
static CAPTION_LINE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:figure|fig\.|image|photo)\s*\d+\s*[:.].*$").unwrap()
});

// @const: Standalone month headers (March, March 2021)
static MONTH_HEADER_LINE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(?:January|February|March|April|May|June|July|August|September|October|November|December)(?:\s+\d{4})?\s*$",
    )
    .unwrap()
});

// @const: Runs of spaces inside a paragraph
static SPACE_RUN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r" {2,}").unwrap()
});

// @const: Whitespace before closing punctuation
static SPACE_BEFORE_PUNCTUATION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r" +([.,!?;:])").unwrap()
});

/// Normalizer for journal entry text
#[derive(Debug, Clone, Copy, Default)]
pub struct TextNormalizer;

impl TextNormalizer {
    /// Create a new normalizer
    pub fn new() -> Self {
        Self
    }

    /// Normalize a piece of text
    pub fn normalize(&self, text: &str) -> String {
        let mut current = Self::clean_pass(text);

        // Passes after the first never grow the text, so this reaches a fixpoint
        loop {
            let next = Self::clean_pass(&current);
            if next == current {
                return current;
            }
            current = next;
        }
    }

    /// One full cleanup pass
    fn clean_pass(text: &str) -> String {
        let text = Self::clean_characters(text);
        let text = Self::remove_inline_artifacts(&text);
        let text = Self::remove_artifact_lines(&text);
        Self::collapse_whitespace(&text)
    }

    /// Character-level cleanup: line endings, control characters, punctuation and border glyphs
    fn clean_characters(text: &str) -> String {
        let mut result = String::with_capacity(text.len());
        let mut chars = text.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '\r' => {
                    if chars.peek() == Some(&'\n') {
                        chars.next();
                    }
                    result.push('\n');
                }
                '\n' | '\u{000C}' | '\u{2028}' | '\u{2029}' => result.push('\n'),
                '\t' => result.push(' '),
                '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' | '\u{2033}' | '\u{00AB}' | '\u{00BB}' => {
                    result.push('"')
                }
                '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' | '\u{2032}' => result.push('\''),
                '\u{2012}' | '\u{2013}' | '\u{2014}' | '\u{2015}' | '\u{2212}' => result.push('-'),
                '\u{2026}' => result.push_str("..."),
                '|' | '\u{2500}'..='\u{257F}' => {}
                c if is_non_printable(c) => {}
                c if c.is_whitespace() => result.push(' '),
                c => result.push(c),
            }
        }

        result
    }

    /// Inline artifacts that can appear mid-line
    ///
    /// Image references are removed until none remain, since removing one can
    /// join the halves of an enclosing reference.
    fn remove_inline_artifacts(text: &str) -> String {
        let mut without_images = text.to_string();
        while IMAGE_REFERENCE_REGEX.is_match(&without_images) {
            without_images = IMAGE_REFERENCE_REGEX.replace_all(&without_images, "").into_owned();
        }
        let without_rules = RULE_REGEX.replace_all(&without_images, "");
        TABLE_CORNER_REGEX.replace_all(&without_rules, "").into_owned()
    }

    /// Drop whole lines that are page numbers, captions or month headers
    fn remove_artifact_lines(text: &str) -> String {
        text.split('\n')
            .filter(|line| {
                !(PAGE_NUMBER_LINE_REGEX.is_match(line)
                    || CAPTION_LINE_REGEX.is_match(line)
                    || MONTH_HEADER_LINE_REGEX.is_match(line))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Join lines into paragraphs and collapse whitespace
    fn collapse_whitespace(text: &str) -> String {
        let mut paragraphs: Vec<String> = Vec::new();
        let mut current: Vec<&str> = Vec::new();

        for line in text.split('\n') {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                if !current.is_empty() {
                    paragraphs.push(Self::join_paragraph(&current));
                    current.clear();
                }
            } else {
                current.push(trimmed);
            }
        }
        if !current.is_empty() {
            paragraphs.push(Self::join_paragraph(&current));
        }

        paragraphs
            .into_iter()
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn join_paragraph(lines: &[&str]) -> String {
        let joined = lines.join(" ");
        let collapsed = SPACE_RUN_REGEX.replace_all(&joined, " ");
        SPACE_BEFORE_PUNCTUATION_REGEX
            .replace_all(&collapsed, "$1")
            .trim()
            .to_string()
    }
}

/// Characters that never carry content: controls, zero-width marks, BOM, soft hyphen
fn is_non_printable(c: char) -> bool {
    (c.is_control() && c != '\n')
        || matches!(
            c,
            '\u{00AD}' | '\u{200B}'..='\u{200F}' | '\u{202A}'..='\u{202E}' | '\u{2060}'..='\u{2064}' | '\u{FEFF}' | '\u{FFFD}'
        )
}

/// Count whitespace-separated tokens
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
