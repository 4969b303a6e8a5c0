/*!
 * Repository layer for journal entry storage.
 *
 * High-level, async API over `DatabaseConnection` used by the CLI. The
 * synchronous `insert_entry` is shared with the transactional entry store.
 */

use anyhow::Result;
use log::debug;
use rusqlite::{params, Connection, Row};

use super::connection::{DatabaseConnection, DatabaseStats};
use super::models::{JournalEntryRecord, YearCount};

const SELECT_COLUMNS: &str = "id, task_id, source_file, source_hash, entry_number, entry_date, content, word_count, \
     year, month, day, day_of_week, sentiment_score, topics, embedding, created_at";

/// Repository for journal entry operations
#[derive(Clone)]
pub struct Repository {
    db: DatabaseConnection,
}

impl Repository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a repository with the default database location
    pub fn new_default() -> Result<Self> {
        Ok(Self::new(DatabaseConnection::new_default()?))
    }

    /// Create a repository with an in-memory database
    pub fn new_in_memory() -> Result<Self> {
        Ok(Self::new(DatabaseConnection::new_in_memory()?))
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Insert one record on an open connection or transaction
    pub fn insert_entry(conn: &Connection, record: &JournalEntryRecord) -> rusqlite::Result<i64> {
        conn.execute(
            r#"
            INSERT INTO journal_entries (
                task_id, source_file, source_hash, entry_number, entry_date, content, word_count,
                year, month, day, day_of_week, sentiment_score, topics, embedding, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
            params![
                record.task_id,
                record.source_file,
                record.source_hash,
                record.entry_number,
                record.entry_date,
                record.content,
                record.word_count,
                record.year,
                record.month,
                record.day,
                record.day_of_week,
                record.sentiment_score,
                record.topics,
                record.embedding,
                record.created_at,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn record_from_row(row: &Row<'_>) -> rusqlite::Result<JournalEntryRecord> {
        Ok(JournalEntryRecord {
            id: row.get(0)?,
            task_id: row.get(1)?,
            source_file: row.get(2)?,
            source_hash: row.get(3)?,
            entry_number: row.get(4)?,
            entry_date: row.get(5)?,
            content: row.get(6)?,
            word_count: row.get(7)?,
            year: row.get(8)?,
            month: row.get(9)?,
            day: row.get(10)?,
            day_of_week: row.get(11)?,
            sentiment_score: row.get(12)?,
            topics: row.get(13)?,
            embedding: row.get(14)?,
            created_at: row.get(15)?,
        })
    }

    /// Insert records in a single transaction, returning their ids
    pub async fn insert_entries(&self, records: Vec<JournalEntryRecord>) -> Result<Vec<i64>> {
        self.db
            .transaction_async(move |tx| {
                let mut ids = Vec::with_capacity(records.len());
                for record in &records {
                    ids.push(Self::insert_entry(tx, record)?);
                }
                debug!("Inserted {} journal entries", ids.len());
                Ok(ids)
            })
            .await
    }

    /// Total stored entries
    pub async fn count_entries(&self) -> Result<i64> {
        self.db
            .execute_async(|conn| {
                Ok(conn.query_row("SELECT COUNT(*) FROM journal_entries", [], |row| row.get(0))?)
            })
            .await
    }

    /// Entry counts grouped by year, oldest first
    pub async fn count_by_year(&self) -> Result<Vec<YearCount>> {
        self.db
            .execute_async(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT year, COUNT(*) FROM journal_entries GROUP BY year ORDER BY year",
                )?;
                let counts = stmt
                    .query_map([], |row| {
                        Ok(YearCount {
                            year: row.get(0)?,
                            count: row.get(1)?,
                        })
                    })?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(counts)
            })
            .await
    }

    /// Entries of one source document in chronological order
    pub async fn list_by_source(&self, source_file: &str) -> Result<Vec<JournalEntryRecord>> {
        let source_file = source_file.to_string();

        self.db
            .execute_async(move |conn| {
                let sql = format!(
                    "SELECT {} FROM journal_entries WHERE source_file = ?1 ORDER BY entry_date, entry_number",
                    SELECT_COLUMNS
                );
                let mut stmt = conn.prepare(&sql)?;
                let records = stmt
                    .query_map([&source_file], Self::record_from_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(records)
            })
            .await
    }

    /// Delete every stored entry, returning how many were removed
    pub async fn delete_all(&self) -> Result<usize> {
        self.db
            .execute_async(|conn| Ok(conn.execute("DELETE FROM journal_entries", [])?))
            .await
    }

    pub async fn stats(&self) -> Result<DatabaseStats> {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || db.stats()).await?
    }

    /// VACUUM and ANALYZE
    pub async fn optimize(&self) -> Result<()> {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || db.optimize()).await?
    }
}
