/*!
 * Tests for the pipeline writing to an on-disk SQLite database
 */

use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;

use journal_ingest::app_config::{Config, PersistenceConfig};
use journal_ingest::database::{DatabaseConnection, Repository, SqliteEntryStore};
use journal_ingest::extraction::TextPageExtractor;
use journal_ingest::persistence::{BatchPersistenceCoordinator, Provenance};
use journal_ingest::pipeline::{Document, PipelineController};
use crate::common;

fn open(dir: &std::path::Path) -> Result<DatabaseConnection> {
    DatabaseConnection::new(dir.join("data").join("journal.db"))
}

#[tokio::test]
async fn test_pipeline_withSqliteStore_shouldPersistAcrossReopen() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    let db = open(temp_dir.path())?;

    let store = Arc::new(SqliteEntryStore::new(db.clone()));
    let controller = PipelineController::new(Config::default(), Arc::new(TextPageExtractor::new()), store)?
        .with_processing_date(common::processing_date());
    let start = NaiveDate::from_ymd_opt(2020, 12, 25).unwrap();
    let task_id = controller.status_store().create();

    let report = controller
        .run(&task_id, Document::new("holidays.txt", common::journal_text(start, 14).into_bytes()))
        .await?;
    assert_eq!(report.success_count, 14);
    drop(controller);
    drop(db);

    let repo = Repository::new(open(temp_dir.path())?);
    assert_eq!(repo.count_entries().await?, 14);

    let years: Vec<(i32, i64)> = repo.count_by_year().await?.iter().map(|y| (y.year, y.count)).collect();
    assert_eq!(years, vec![(2020, 7), (2021, 7)]);

    let records = repo.list_by_source("holidays.txt").await?;
    assert_eq!(records.len(), 14);
    assert_eq!(records[0].entry_date, "2020-12-25");
    assert!(records.iter().all(|r| r.task_id == task_id && r.source_hash == report.document_hash));

    let first = records[0].to_entry()?;
    assert_eq!(first.date, start);
    assert_eq!(first.entry_number, 1);
    Ok(())
}

#[tokio::test]
async fn test_repository_statsAndReset_shouldReflectStoredEntries() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let db = open(temp_dir.path())?;
    let coordinator = BatchPersistenceCoordinator::new(
        Arc::new(SqliteEntryStore::new(db.clone())),
        PersistenceConfig {
            batch_size: 4,
            max_retry_attempts: 1,
        },
    )
    .with_provenance(Provenance::new("task-stats", "feedface"));

    let outcome = coordinator.persist_all_blocking(common::sample_entries(10)).await?;
    assert_eq!(outcome.success_count, 10);

    let repo = Repository::new(db);
    let stats = repo.stats().await?;
    assert_eq!(stats.total_entries, 10);
    assert_eq!(stats.distinct_sources, 1);
    assert_eq!(stats.first_date.as_deref(), Some("2020-01-01"));
    assert_eq!(stats.last_date.as_deref(), Some("2020-01-10"));

    repo.optimize().await?;
    assert_eq!(repo.delete_all().await?, 10);
    assert_eq!(repo.count_entries().await?, 0);
    Ok(())
}

#[test]
fn test_persistAll_withSameDateTwice_shouldStoreBoth() -> Result<()> {
    // Duplicate dates are filtered by validation, not by the table
    let db = DatabaseConnection::new_in_memory()?;
    let coordinator = BatchPersistenceCoordinator::new(
        Arc::new(SqliteEntryStore::new(db.clone())),
        PersistenceConfig::default(),
    );
    let mut entries = common::sample_entries(2);
    entries[1].date = entries[0].date;

    let outcome = coordinator.persist_all(&entries);

    assert_eq!(outcome.success_count, 2);
    let stats = db.stats()?;
    assert_eq!(stats.total_entries, 2);
    Ok(())
}
