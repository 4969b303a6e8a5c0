/*!
 * Batch persistence with per-entry fallback.
 *
 * Accepted entries are committed in fixed-size batches, one transaction per
 * batch. When a batch fails it is rolled back in full and each of its entries
 * is retried on its own, one transaction per attempt. Batches are
 * independent: a failure in one never affects entries already committed.
 */

use std::sync::Arc;

use log::{debug, info, warn};
use serde::Serialize;

use crate::app_config::PersistenceConfig;
use crate::entry::{NormalizedEntry, PersistedEntry};
use crate::errors::PersistenceError;

use super::store::{EntryStore, Provenance};

/// Result of persisting a set of entries
#[derive(Debug, Clone, Default, Serialize)]
pub struct PersistenceOutcome {
    /// Number of entries committed
    pub success_count: usize,
    /// One message per entry that could not be committed, in input order
    pub errors: Vec<String>,
    /// Committed entries with their storage ids
    #[serde(skip)]
    pub persisted: Vec<PersistedEntry>,
}

/// Commits accepted entries through an `EntryStore`
#[derive(Clone)]
pub struct BatchPersistenceCoordinator {
    store: Arc<dyn EntryStore>,
    config: PersistenceConfig,
    provenance: Provenance,
}

impl BatchPersistenceCoordinator {
    pub fn new(store: Arc<dyn EntryStore>, config: PersistenceConfig) -> Self {
        Self {
            store,
            config,
            provenance: Provenance::default(),
        }
    }

    /// Tag every committed entry with its task and source document
    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = provenance;
        self
    }

    /// Commit a whole batch in one transaction, all or nothing
    pub fn persist_batch(&self, batch: &[NormalizedEntry]) -> Result<Vec<PersistedEntry>, PersistenceError> {
        let provenance = &self.provenance;
        let mut ids = Vec::with_capacity(batch.len());

        self.store.in_transaction(&mut |writer| {
            ids.clear();
            for entry in batch {
                ids.push(writer.add(entry, provenance)?);
            }
            Ok(())
        })?;

        Ok(ids
            .into_iter()
            .zip(batch.iter().cloned())
            .map(|(id, entry)| PersistedEntry { id, entry })
            .collect())
    }

    /// Commit one entry, retrying up to `max_retry_attempts` times
    pub fn persist_single(&self, entry: &NormalizedEntry) -> Result<PersistedEntry, PersistenceError> {
        let provenance = &self.provenance;
        let attempts = self.config.max_retry_attempts.max(1);
        let mut last_error = None;

        for attempt in 1..=attempts {
            let mut id = None;
            let result = self.store.in_transaction(&mut |writer| {
                id = Some(writer.add(entry, provenance)?);
                Ok(())
            });

            match (result, id) {
                (Ok(()), Some(id)) => {
                    return Ok(PersistedEntry {
                        id,
                        entry: entry.clone(),
                    });
                }
                (Ok(()), None) => {
                    last_error = Some(PersistenceError::Storage("store committed without an id".to_string()));
                }
                (Err(e), _) => {
                    warn!(
                        "Attempt {}/{} to persist {} failed: {}",
                        attempt,
                        attempts,
                        entry.label(),
                        e
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| PersistenceError::Storage("no attempt was made".to_string())))
    }

    /// Persist every entry, batching first and falling back per entry
    pub fn persist_all(&self, entries: &[NormalizedEntry]) -> PersistenceOutcome {
        let mut outcome = PersistenceOutcome::default();
        let batch_size = self.config.batch_size.max(1);

        for (index, batch) in entries.chunks(batch_size).enumerate() {
            match self.persist_batch(batch) {
                Ok(persisted) => {
                    debug!("Committed batch {} ({} entries) to {}", index + 1, persisted.len(), self.store.name());
                    outcome.success_count += persisted.len();
                    outcome.persisted.extend(persisted);
                }
                Err(e) => {
                    warn!(
                        "Batch {} ({} entries) failed, falling back to single inserts: {}",
                        index + 1,
                        batch.len(),
                        e
                    );
                    for entry in batch {
                        match self.persist_single(entry) {
                            Ok(persisted) => {
                                outcome.success_count += 1;
                                outcome.persisted.push(persisted);
                            }
                            Err(e) => outcome.errors.push(format!("{}: {}", entry.label(), e)),
                        }
                    }
                }
            }
        }

        info!(
            "Persisted {}/{} entries ({} failed)",
            outcome.success_count,
            entries.len(),
            outcome.errors.len()
        );
        outcome
    }

    /// Run `persist_all` on the blocking thread pool
    pub async fn persist_all_blocking(&self, entries: Vec<NormalizedEntry>) -> Result<PersistenceOutcome, PersistenceError> {
        let coordinator = self.clone();

        tokio::task::spawn_blocking(move || coordinator.persist_all(&entries))
            .await
            .map_err(|e| PersistenceError::TaskJoin(e.to_string()))
    }
}
