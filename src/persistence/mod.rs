/*!
 * Persistence module: transactional storage seam and the batch coordinator.
 *
 * - `store`: `EntryStore` / `EntryWriter` traits
 * - `memory`: in-memory store for dry runs and tests
 * - `coordinator`: batch-then-fallback persistence
 */

pub mod coordinator;
pub mod memory;
pub mod store;

pub use coordinator::{BatchPersistenceCoordinator, PersistenceOutcome};
pub use memory::{InMemoryEntryStore, TransactionRecord};
pub use store::{EntryStore, EntryWriter, Provenance};
