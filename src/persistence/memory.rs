/*!
 * In-memory entry store.
 *
 * Writes are staged per transaction and only become visible on commit.
 * Every transaction is recorded in a log, and transactions can be scripted to
 * fail, which makes the store usable for dry runs and for exercising the
 * coordinator's fallback path.
 */

use std::collections::HashSet;

use log::debug;
use parking_lot::Mutex;

use crate::entry::{NormalizedEntry, PersistedEntry};
use crate::errors::PersistenceError;

use super::store::{EntryStore, EntryWriter, Provenance};

/// One transaction as observed by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionRecord {
    /// Number of entries the work tried to add
    pub attempted: usize,
    /// Whether the transaction committed
    pub committed: bool,
}

#[derive(Debug, Default)]
struct MemoryState {
    entries: Vec<PersistedEntry>,
    provenance: Vec<Provenance>,
    next_id: i64,
    transactions: Vec<TransactionRecord>,
    failing_transactions: HashSet<usize>,
}

/// Entry store backed by a vector
#[derive(Debug, Default)]
pub struct InMemoryEntryStore {
    state: Mutex<MemoryState>,
}

struct StagingWriter {
    next_id: i64,
    staged: Vec<(PersistedEntry, Provenance)>,
}

impl EntryWriter for StagingWriter {
    fn add(&mut self, entry: &NormalizedEntry, provenance: &Provenance) -> Result<i64, PersistenceError> {
        self.next_id += 1;
        self.staged.push((
            PersistedEntry {
                id: self.next_id,
                entry: entry.clone(),
            },
            provenance.clone(),
        ));
        Ok(self.next_id)
    }
}

impl InMemoryEntryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the `n`th transaction (1-based, counted from store creation) fail at commit
    pub fn fail_transaction(&self, n: usize) {
        self.state.lock().failing_transactions.insert(n);
    }

    /// Committed entries in insertion order
    pub fn entries(&self) -> Vec<PersistedEntry> {
        self.state.lock().entries.clone()
    }

    /// Provenance of each committed entry, parallel to `entries`
    pub fn provenance(&self) -> Vec<Provenance> {
        self.state.lock().provenance.clone()
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every transaction seen so far
    pub fn transaction_log(&self) -> Vec<TransactionRecord> {
        self.state.lock().transactions.clone()
    }
}

impl EntryStore for InMemoryEntryStore {
    fn in_transaction(
        &self,
        work: &mut dyn FnMut(&mut dyn EntryWriter) -> Result<(), PersistenceError>,
    ) -> Result<(), PersistenceError> {
        let mut state = self.state.lock();
        let number = state.transactions.len() + 1;

        let mut writer = StagingWriter {
            next_id: state.next_id,
            staged: Vec::new(),
        };
        let result = work(&mut writer).and_then(|()| {
            if state.failing_transactions.contains(&number) {
                Err(PersistenceError::Storage(format!("commit of transaction {} failed", number)))
            } else {
                Ok(())
            }
        });

        let committed = result.is_ok();
        state.transactions.push(TransactionRecord {
            attempted: writer.staged.len(),
            committed,
        });

        if committed {
            state.next_id = writer.next_id;
            for (entry, provenance) in writer.staged {
                state.entries.push(entry);
                state.provenance.push(provenance);
            }
        } else {
            debug!("Rolled back in-memory transaction {}", number);
        }

        result
    }

    fn name(&self) -> &str {
        "memory"
    }
}
