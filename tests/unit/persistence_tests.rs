/*!
 * Tests for batch persistence and the per-entry fallback
 */

use std::sync::Arc;

use journal_ingest::app_config::PersistenceConfig;
use journal_ingest::persistence::{BatchPersistenceCoordinator, InMemoryEntryStore, Provenance};
use crate::common;
use crate::common::mock_collaborators::PoisonedEntryStore;

fn config(batch_size: usize, max_retry_attempts: u32) -> PersistenceConfig {
    PersistenceConfig {
        batch_size,
        max_retry_attempts,
    }
}

#[test]
fn test_persistAll_with250Entries_shouldCommitThreeBatches() {
    common::init_logging();
    let store = Arc::new(InMemoryEntryStore::new());
    let coordinator = BatchPersistenceCoordinator::new(store.clone(), config(100, 3));

    let outcome = coordinator.persist_all(&common::sample_entries(250));

    assert_eq!(outcome.success_count, 250);
    assert!(outcome.errors.is_empty());
    let sizes: Vec<usize> = store.transaction_log().iter().map(|t| t.attempted).collect();
    assert_eq!(sizes, vec![100, 100, 50]);
}

#[test]
fn test_persistAll_withSecondBatchFailing_shouldFallBackToSingles() {
    common::init_logging();
    let store = Arc::new(InMemoryEntryStore::new());
    store.fail_transaction(2);
    let coordinator = BatchPersistenceCoordinator::new(store.clone(), config(100, 3));

    let outcome = coordinator.persist_all(&common::sample_entries(250));

    assert_eq!(outcome.success_count, 250);
    let log = store.transaction_log();
    // batch 1, failed batch 2, 100 singles, batch 3
    assert_eq!(log.len(), 103);
    assert!(!log[1].committed);
    assert!(log[2..102].iter().all(|t| t.attempted == 1 && t.committed));
    assert_eq!(log[102].attempted, 50);

    let numbers: Vec<usize> = store.entries().iter().map(|p| p.entry.entry_number).collect();
    assert_eq!(numbers, (1..=250).collect::<Vec<_>>());
}

#[test]
fn test_persistAll_withPoisonedEntry_shouldReportOnlyThatEntry() {
    common::init_logging();
    let mut entries = common::sample_entries(250);
    entries[129].content = "This one trips the POISON check.".to_string();
    let expected_label = entries[129].label();

    let store = Arc::new(PoisonedEntryStore::new("POISON"));
    let coordinator = BatchPersistenceCoordinator::new(store.clone(), config(100, 2));

    let outcome = coordinator.persist_all(&entries);

    assert_eq!(outcome.success_count, 249);
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors[0].starts_with(&expected_label), "unexpected error: {}", outcome.errors[0]);
    assert_eq!(store.inner().len(), 249);
    // once inside the batch, then once per retry attempt
    assert_eq!(store.rejected_writes(), 3);
}

#[test]
fn test_persistAll_withEveryEntryPoisoned_shouldCommitNothing() {
    common::init_logging();
    let mut entries = common::sample_entries(5);
    for entry in &mut entries {
        entry.content.push_str(" POISON");
    }
    let store = Arc::new(PoisonedEntryStore::new("POISON"));
    let coordinator = BatchPersistenceCoordinator::new(store.clone(), config(100, 1));

    let outcome = coordinator.persist_all(&entries);

    assert_eq!(outcome.success_count, 0);
    assert_eq!(outcome.errors.len(), 5);
    assert!(store.inner().is_empty());
}

#[test]
fn test_persistAll_shouldTagEntriesWithProvenance() {
    let store = Arc::new(InMemoryEntryStore::new());
    let coordinator = BatchPersistenceCoordinator::new(store.clone(), config(10, 3))
        .with_provenance(Provenance::new("task-1", "abc123"));

    coordinator.persist_all(&common::sample_entries(12));

    let provenance = store.provenance();
    assert_eq!(provenance.len(), 12);
    assert!(provenance.iter().all(|p| p.task_id == "task-1" && p.source_hash == "abc123"));
}

#[tokio::test]
async fn test_persistAllBlocking_shouldMatchSynchronousOutcome() {
    let store = Arc::new(InMemoryEntryStore::new());
    let coordinator = BatchPersistenceCoordinator::new(store.clone(), config(7, 3));

    let outcome = coordinator
        .persist_all_blocking(common::sample_entries(20))
        .await
        .unwrap();

    assert_eq!(outcome.success_count, 20);
    assert_eq!(outcome.persisted.len(), 20);
    assert_eq!(store.transaction_log().len(), 3);
}
