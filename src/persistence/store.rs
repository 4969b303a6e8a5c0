/*!
 * Storage collaborator seam.
 *
 * Stores expose scoped transactions only: the work closure receives a writer,
 * the store commits when the closure returns `Ok` and rolls back on any error,
 * including a failed commit.
 */

use serde::{Deserialize, Serialize};

use crate::entry::NormalizedEntry;
use crate::errors::PersistenceError;

/// Where a batch of entries came from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    /// Processing task that produced the entries
    pub task_id: String,
    /// SHA-256 of the source document, hex encoded
    pub source_hash: String,
}

impl Provenance {
    pub fn new(task_id: impl Into<String>, source_hash: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            source_hash: source_hash.into(),
        }
    }
}

/// Writes entries inside an open transaction
pub trait EntryWriter {
    /// Stage one entry; returns its storage id
    fn add(&mut self, entry: &NormalizedEntry, provenance: &Provenance) -> Result<i64, PersistenceError>;
}

/// Transactional entry storage
pub trait EntryStore: Send + Sync {
    /// Run `work` inside one transaction
    fn in_transaction(
        &self,
        work: &mut dyn FnMut(&mut dyn EntryWriter) -> Result<(), PersistenceError>,
    ) -> Result<(), PersistenceError>;

    /// Short name used in logs
    fn name(&self) -> &str {
        "store"
    }
}
