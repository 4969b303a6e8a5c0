/*!
 * Database connection management.
 *
 * Wraps a single SQLite connection behind a mutex so the blocking pool and
 * the CLI share one handle. Async callers go through `spawn_blocking`.
 */

use anyhow::{Context, Result};
use log::{debug, info};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use super::schema;

/// Default database filename
const DEFAULT_DB_FILENAME: &str = "journal.db";

/// Default database directory name under user's data directory
const DEFAULT_DB_DIRNAME: &str = "journal-ingest";

/// Database connection wrapper with thread-safe access
#[derive(Clone)]
pub struct DatabaseConnection {
    db_path: PathBuf,
    connection: Arc<Mutex<Connection>>,
}

impl DatabaseConnection {
    /// Open the database at the default location
    pub fn new_default() -> Result<Self> {
        let db_path = Self::default_database_path()?;
        Self::new(&db_path)
    }

    /// Open (or create) the database at `db_path`
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create database directory: {:?}", parent))?;
            }
        }

        info!("Opening database at: {:?}", db_path);

        let conn = Connection::open(&db_path)
            .with_context(|| format!("Failed to open database: {:?}", db_path))?;

        schema::initialize_schema(&conn)?;

        Ok(Self {
            db_path,
            connection: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create an in-memory database
    pub fn new_in_memory() -> Result<Self> {
        debug!("Creating in-memory database");

        let conn = Connection::open_in_memory().context("Failed to create in-memory database")?;
        schema::initialize_schema(&conn)?;

        Ok(Self {
            db_path: PathBuf::from(":memory:"),
            connection: Arc::new(Mutex::new(conn)),
        })
    }

    /// Default path: `<data dir>/journal-ingest/journal.db`
    pub fn default_database_path() -> Result<PathBuf> {
        let base_dir = dirs::data_local_dir()
            .or_else(dirs::data_dir)
            .or_else(|| dirs::home_dir().map(|h| h.join(".local").join("share")))
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;

        Ok(base_dir.join(DEFAULT_DB_DIRNAME).join(DEFAULT_DB_FILENAME))
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn is_in_memory(&self) -> bool {
        self.db_path.to_string_lossy() == ":memory:"
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.connection
            .lock()
            .map_err(|e| anyhow::anyhow!("Failed to acquire database lock: {}", e))
    }

    /// Run `f` with the locked connection
    pub fn execute<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.lock()?;
        f(&conn)
    }

    /// Run `f` with the locked connection on the blocking pool
    pub async fn execute_async<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.clone();

        tokio::task::spawn_blocking(move || db.execute(f))
            .await
            .context("Database task panicked")?
    }

    /// Run `f` inside a transaction; commits on `Ok`, rolls back otherwise
    ///
    /// The error type is the caller's, so storage adapters can keep their own
    /// error taxonomy. Dropping an uncommitted transaction rolls it back.
    pub fn transaction<F, T, E>(&self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&rusqlite::Transaction) -> std::result::Result<T, E>,
        E: From<rusqlite::Error> + From<anyhow::Error>,
    {
        let mut conn = self.lock()?;

        let tx = conn.transaction()?;
        let result = f(&tx)?;
        tx.commit()?;

        Ok(result)
    }

    /// Async variant of `transaction`
    pub async fn transaction_async<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&rusqlite::Transaction) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.clone();

        tokio::task::spawn_blocking(move || db.transaction(f))
            .await
            .context("Database transaction task panicked")?
    }

    /// Reclaim free pages and refresh planner statistics
    pub fn optimize(&self) -> Result<()> {
        self.execute(|conn| {
            conn.execute_batch("VACUUM; ANALYZE;")
                .context("Failed to optimize database")?;
            Ok(())
        })
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<DatabaseStats> {
        self.execute(|conn| {
            let (total_entries, distinct_sources, first_date, last_date) = conn.query_row(
                "SELECT COUNT(*), COUNT(DISTINCT source_file), MIN(entry_date), MAX(entry_date) FROM journal_entries",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )?;

            let file_size_bytes = if self.is_in_memory() {
                0
            } else {
                std::fs::metadata(&self.db_path).map(|m| m.len()).unwrap_or(0)
            };

            Ok(DatabaseStats {
                total_entries,
                distinct_sources,
                first_date,
                last_date,
                file_size_bytes,
            })
        })
    }
}

/// Database statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseStats {
    /// Stored journal entries
    pub total_entries: i64,
    /// Distinct source documents
    pub distinct_sources: i64,
    /// Earliest entry date, if any
    pub first_date: Option<String>,
    /// Latest entry date, if any
    pub last_date: Option<String>,
    /// Database file size in bytes
    pub file_size_bytes: u64,
}

impl std::fmt::Display for DatabaseStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Entries: {}, Sources: {}, Range: {} .. {}, Size: {} KB",
            self.total_entries,
            self.distinct_sources,
            self.first_date.as_deref().unwrap_or("-"),
            self.last_date.as_deref().unwrap_or("-"),
            self.file_size_bytes / 1024
        )
    }
}
