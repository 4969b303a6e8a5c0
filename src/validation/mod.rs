/*!
 * Validation module for normalized journal entries.
 *
 * # Architecture
 *
 * - `content`: structural and length checks
 * - `temporal`: future dates, year range, calendar components
 * - `consistency`: word count and characters-per-word checks
 * - `service`: runs every stage and resolves duplicate dates
 */

pub mod consistency;
pub mod content;
pub mod service;
pub mod temporal;

// Re-export main types
pub use service::{EntryRejection, EntryValidator, RejectionReason, ValidationOutcome, ValidationVerdict};
