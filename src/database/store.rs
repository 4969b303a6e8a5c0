/*!
 * SQLite-backed `EntryStore`.
 */

use log::debug;

use crate::entry::NormalizedEntry;
use crate::errors::PersistenceError;
use crate::persistence::{EntryStore, EntryWriter, Provenance};

use super::connection::DatabaseConnection;
use super::models::JournalEntryRecord;
use super::repository::Repository;

/// Entry store writing to the `journal_entries` table
#[derive(Clone)]
pub struct SqliteEntryStore {
    db: DatabaseConnection,
}

struct TransactionWriter<'a> {
    conn: &'a rusqlite::Connection,
}

impl EntryWriter for TransactionWriter<'_> {
    fn add(&mut self, entry: &NormalizedEntry, provenance: &Provenance) -> Result<i64, PersistenceError> {
        let record = JournalEntryRecord::from_entry(entry, provenance)?;
        Ok(Repository::insert_entry(self.conn, &record)?)
    }
}

impl SqliteEntryStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl EntryStore for SqliteEntryStore {
    fn in_transaction(
        &self,
        work: &mut dyn FnMut(&mut dyn EntryWriter) -> Result<(), PersistenceError>,
    ) -> Result<(), PersistenceError> {
        self.db.transaction(|tx| {
            let mut writer = TransactionWriter { conn: tx };
            work(&mut writer)
        })?;
        debug!("Committed transaction to {:?}", self.db.path());
        Ok(())
    }

    fn name(&self) -> &str {
        "sqlite"
    }
}
