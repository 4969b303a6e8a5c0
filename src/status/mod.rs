/*!
 * Status module: per-task progress records for pollers.
 *
 * - `models`: task stage, task record, partial updates and snapshots
 * - `store`: the concurrent registry with TTL eviction
 */

pub mod models;
pub mod store;

pub use models::{ProcessingTask, TaskSnapshot, TaskStage, TaskUpdate};
pub use store::ProcessingStatusStore;
