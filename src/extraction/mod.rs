/*!
 * Page extraction collaborator.
 *
 * Extraction turns a staged document into ordered pages of text. Pages that
 * cannot be read come back with `text: None`; the pipeline skips them and
 * records them in the task's errors. Only a document-level failure is an
 * `ExtractionError`.
 */

use std::path::Path;

use async_trait::async_trait;
use log::debug;

use crate::errors::ExtractionError;

/// Page separator in plain-text exports
const PAGE_SEPARATOR: char = '\u{000C}';

/// One page of an extracted document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPage {
    /// 1-based page number
    pub page_number: usize,
    /// Page text, `None` when the page could not be read
    pub text: Option<String>,
}

impl RawPage {
    pub fn readable(page_number: usize, text: impl Into<String>) -> Self {
        Self {
            page_number,
            text: Some(text.into()),
        }
    }

    pub fn unreadable(page_number: usize) -> Self {
        Self {
            page_number,
            text: None,
        }
    }
}

/// Turns a document on disk into pages
#[async_trait]
pub trait PageExtractor: Send + Sync {
    async fn extract(&self, path: &Path) -> Result<Vec<RawPage>, ExtractionError>;
}

/// Extractor for plain-text documents, one page per form feed
#[derive(Debug, Clone, Copy, Default)]
pub struct TextPageExtractor;

impl TextPageExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Split decoded text into pages
    ///
    /// A page made only of replacement characters and whitespace failed to
    /// decode and is reported unreadable.
    pub fn split_pages(text: &str) -> Vec<RawPage> {
        text.split(PAGE_SEPARATOR)
            .enumerate()
            .map(|(index, page)| {
                let garbled = page.contains(char::REPLACEMENT_CHARACTER)
                    && page
                        .chars()
                        .all(|c| c == char::REPLACEMENT_CHARACTER || c.is_whitespace());
                if garbled {
                    RawPage::unreadable(index + 1)
                } else {
                    RawPage::readable(index + 1, page)
                }
            })
            .collect()
    }
}

#[async_trait]
impl PageExtractor for TextPageExtractor {
    async fn extract(&self, path: &Path) -> Result<Vec<RawPage>, ExtractionError> {
        let bytes = tokio::fs::read(path).await?;
        let text = String::from_utf8_lossy(&bytes);
        let pages = Self::split_pages(&text);
        debug!("Extracted {} pages from {:?}", pages.len(), path);
        Ok(pages)
    }
}
