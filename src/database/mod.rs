/*!
 * Database module: SQLite storage for journal entries.
 *
 * - `connection`: shared connection handle, transactions, stats
 * - `schema`: table definitions and versioning
 * - `models`: row mapping
 * - `repository`: async queries used by the CLI
 * - `store`: the `EntryStore` implementation used by the pipeline
 */

pub mod connection;
pub mod models;
pub mod repository;
pub mod schema;
pub mod store;

// Re-export main types
pub use connection::{DatabaseConnection, DatabaseStats};
pub use models::{JournalEntryRecord, YearCount};
pub use repository::Repository;
pub use store::SqliteEntryStore;
