/*!
 * Pipeline module: document runs and their reports.
 *
 * - `controller`: submit, poll and run documents
 * - `report`: per-document summary
 */

pub mod controller;
pub mod report;

pub use controller::{Document, PipelineController};
pub use report::PipelineReport;
