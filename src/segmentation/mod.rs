/*!
 * Segmentation module: boundary detection for dated journal entries.
 *
 * - `rules`: date heading rules (scan pattern + parse function)
 * - `segmenter`: the canonical segmenter parameterized by an ordered rule list
 */

pub mod rules;
pub mod segmenter;

// Re-export main types
pub use rules::DateRule;
pub use segmenter::{Boundary, CandidateEntry, EntrySegmenter, Segmentation};
