/*!
 * End-to-end tests: documents through every pipeline stage
 */

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::NaiveDate;

use journal_ingest::app_config::Config;
use journal_ingest::errors::{ExtractionError, PipelineError};
use journal_ingest::extraction::{RawPage, TextPageExtractor};
use journal_ingest::persistence::InMemoryEntryStore;
use journal_ingest::pipeline::{Document, PipelineController};
use journal_ingest::status::{TaskSnapshot, TaskStage};
use crate::common;
use crate::common::mock_collaborators::{PoisonedEntryStore, ScriptedExtractor};

fn text_controller(store: Arc<InMemoryEntryStore>) -> PipelineController {
    PipelineController::new(Config::default(), Arc::new(TextPageExtractor::new()), store)
        .unwrap()
        .with_processing_date(common::processing_date())
}

fn scripted_controller(extractor: Arc<ScriptedExtractor>, store: Arc<InMemoryEntryStore>) -> PipelineController {
    PipelineController::new(Config::default(), extractor, store)
        .unwrap()
        .with_processing_date(common::processing_date())
}

async fn wait_for_terminal(controller: &PipelineController, task_id: &str) -> TaskSnapshot {
    for _ in 0..200 {
        if let Some(snapshot) = controller.poll(task_id) {
            if snapshot.is_terminal() {
                return snapshot;
            }
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("task {} never reached a terminal stage", task_id);
}

#[tokio::test]
async fn test_run_withJournalFile_shouldStoreEveryDay() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    let start = NaiveDate::from_ymd_opt(2021, 3, 1).unwrap();
    let path = common::create_test_file(temp_dir.path(), "march.txt", &common::journal_text(start, 31))?;

    let store = Arc::new(InMemoryEntryStore::new());
    let controller = text_controller(store.clone());
    let task_id = controller.status_store().create();

    let report = controller.run(&task_id, Document::from_path(&path).await?).await?;

    assert_eq!(report.source_file, "march.txt");
    assert_eq!(report.candidates, 31);
    assert_eq!(report.success_count, 31);
    assert!(report.errors.is_empty());
    assert_eq!(store.len(), 31);

    let stored = store.entries();
    assert_eq!(stored[0].entry.date, start);
    assert_eq!(stored[0].entry.content, "Today was day number 1 of the journal and nothing went wrong.");
    assert!(store.provenance().iter().all(|p| p.task_id == task_id && p.source_hash == report.document_hash));
    Ok(())
}

#[tokio::test]
async fn test_run_withUnreadablePage_shouldSkipItAndRecordError() {
    common::init_logging();
    let extractor = Arc::new(ScriptedExtractor::pages(vec![
        RawPage::readable(1, "01/02/2020\nFirst page entry about the snow."),
        RawPage::unreadable(2),
        RawPage::readable(3, "01/05/2020\nThird page entry about the thaw."),
    ]));
    let store = Arc::new(InMemoryEntryStore::new());
    let controller = scripted_controller(extractor.clone(), store.clone());
    let task_id = controller.status_store().create();

    let report = controller
        .run(&task_id, Document::new("winter.pdf", b"%PDF".to_vec()))
        .await
        .unwrap();

    assert_eq!(extractor.call_count(), 1);
    assert_eq!(report.pages, 3);
    assert_eq!(report.skipped_pages, vec![2]);
    assert_eq!(report.success_count, 2);

    let snapshot = controller.poll(&task_id).unwrap();
    assert_eq!(snapshot.stage, TaskStage::Completed);
    assert_eq!(snapshot.errors, vec!["page 2 unreadable, skipped".to_string()]);
}

#[tokio::test]
async fn test_run_withAllPagesUnreadable_shouldFailTask() {
    common::init_logging();
    let extractor = Arc::new(ScriptedExtractor::pages(vec![RawPage::unreadable(1), RawPage::unreadable(2)]));
    let store = Arc::new(InMemoryEntryStore::new());
    let controller = scripted_controller(extractor, store.clone());
    let task_id = controller.status_store().create();

    let result = controller.run(&task_id, Document::new("scan.pdf", vec![0u8; 16])).await;

    assert!(matches!(
        result,
        Err(PipelineError::Extraction(ExtractionError::NoReadablePages { pages: 2 }))
    ));
    let snapshot = controller.poll(&task_id).unwrap();
    assert_eq!(snapshot.stage, TaskStage::Failed);
    assert!(snapshot.errors.iter().any(|e| e.contains("No readable pages")));
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_run_withFailingExtractor_shouldFailTask() {
    common::init_logging();
    let extractor = Arc::new(ScriptedExtractor::failing("renderer crashed"));
    let store = Arc::new(InMemoryEntryStore::new());
    let controller = scripted_controller(extractor, store.clone());
    let task_id = controller.status_store().create();

    let result = controller.run(&task_id, Document::new("broken.pdf", vec![1, 2, 3])).await;

    assert!(matches!(result, Err(PipelineError::Extraction(_))));
    let snapshot = controller.poll(&task_id).unwrap();
    assert_eq!(snapshot.stage, TaskStage::Failed);
    assert!(snapshot.errors.last().unwrap().contains("renderer crashed"));
    assert_eq!(snapshot.success_count, 0);
}

#[tokio::test]
async fn test_run_withEntrySpanningPageFooterAndCaption_shouldAcceptIt() {
    common::init_logging();
    let extractor = Arc::new(ScriptedExtractor::pages(vec![
        RawPage::readable(1, "3/1/2021 Went to the lake with the kids.\nPage 3 of 9"),
        RawPage::readable(
            2,
            "Figure 2: the kids at the lake in the morning\n[Image: lake.jpg]\nCame home late and slept well.",
        ),
    ]));
    let store = Arc::new(InMemoryEntryStore::new());
    let controller = scripted_controller(extractor, store.clone());
    let task_id = controller.status_store().create();

    let report = controller
        .run(&task_id, Document::new("lake.pdf", b"%PDF".to_vec()))
        .await
        .unwrap();

    assert_eq!(report.candidates, 1);
    assert!(report.rejections.is_empty(), "unexpected rejections: {:?}", report.rejections);
    assert_eq!(report.success_count, 1);

    let stored = store.entries();
    assert_eq!(stored[0].entry.content, "Went to the lake with the kids.\n\nCame home late and slept well.");
    assert_eq!(stored[0].entry.word_count, 13);
    assert!(controller.poll(&task_id).unwrap().errors.is_empty());
}

#[tokio::test]
async fn test_run_withDuplicateDates_shouldRecordRejection() {
    common::init_logging();
    let text = "03/04/2020 Went skating with the whole family.\n\
                03/04/2020 Same day, written again by mistake.\n\
                03/05/2020 Back to work after the weekend.";
    let store = Arc::new(InMemoryEntryStore::new());
    let controller = text_controller(store.clone());
    let task_id = controller.status_store().create();

    let report = controller
        .run(&task_id, Document::new("dupes.txt", text.as_bytes().to_vec()))
        .await
        .unwrap();

    assert_eq!(report.candidates, 3);
    assert_eq!(report.success_count, 2);
    assert_eq!(report.rejections.len(), 1);
    assert_eq!(report.rejections[0].entry_number, 2);

    let snapshot = controller.poll(&task_id).unwrap();
    assert_eq!(
        snapshot.errors,
        vec!["entry #2 (2020-03-04) rejected: duplicate date 2020-03-04".to_string()]
    );
}

#[tokio::test]
async fn test_run_withFutureAndImpossibleDates_shouldKeepTheRest() {
    common::init_logging();
    let text = "05/30/2024 Planning the summer trip already.\n\
                02/30/2024 This heading cannot be a real day.\n\
                07/01/2024 Written from the future somehow.";
    let store = Arc::new(InMemoryEntryStore::new());
    let controller = text_controller(store.clone());
    let task_id = controller.status_store().create();

    let report = controller
        .run(&task_id, Document::new("2024.txt", text.as_bytes().to_vec()))
        .await
        .unwrap();

    assert_eq!(report.candidates, 2);
    assert_eq!(report.success_count, 1);
    assert_eq!(report.rejections.len(), 1);
    assert!(report.errors.iter().any(|e| e.contains("02/30/2024")));
    assert!(report.errors.iter().any(|e| e.contains("in the future")));
}

#[tokio::test]
async fn test_run_withPoisonedStore_shouldCompleteWithPerEntryErrors() {
    common::init_logging();
    let text = "06/01/2020 A normal day at the office.\n\
                06/02/2020 The database hates the word POISON.\n\
                06/03/2020 Another normal day at the office.";
    let store = Arc::new(PoisonedEntryStore::new("POISON"));
    let controller = PipelineController::new(Config::default(), Arc::new(TextPageExtractor::new()), store.clone())
        .unwrap()
        .with_processing_date(common::processing_date());
    let task_id = controller.status_store().create();

    let report = controller
        .run(&task_id, Document::new("june.txt", text.as_bytes().to_vec()))
        .await
        .unwrap();

    assert_eq!(report.accepted, 3);
    assert_eq!(report.success_count, 2);
    assert_eq!(report.failed_count(), 1);
    assert_eq!(store.inner().len(), 2);

    let snapshot = controller.poll(&task_id).unwrap();
    assert_eq!(snapshot.stage, TaskStage::Completed);
    assert_eq!(snapshot.success_count, 2);
    assert_eq!(snapshot.errors.len(), 1);
    assert!(snapshot.errors[0].starts_with("entry #2 (2020-06-02)"));
}

#[tokio::test]
async fn test_submit_shouldBePollableUntilCompleted() {
    common::init_logging();
    let start = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
    let store = Arc::new(InMemoryEntryStore::new());
    let controller = text_controller(store.clone());

    let task_id = controller.submit(Document::new("2022.txt", common::journal_text(start, 10).into_bytes()));
    let first = controller.poll(&task_id).expect("task should be registered immediately");
    assert!(first.percent <= 100);

    let snapshot = wait_for_terminal(&controller, &task_id).await;

    assert_eq!(snapshot.stage, TaskStage::Completed);
    assert_eq!(snapshot.percent, 100);
    assert_eq!(snapshot.success_count, 10);
    assert_eq!(store.len(), 10);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_submitWithHandle_withConcurrentDocuments_shouldKeepTasksIndependent() {
    common::init_logging();
    let store = Arc::new(InMemoryEntryStore::new());
    let controller = text_controller(store.clone());

    let mut runs = Vec::new();
    for year in 2015..2020 {
        let start = NaiveDate::from_ymd_opt(year, 1, 1).unwrap();
        let days = (year - 2010) as usize;
        let document = Document::new(format!("{}.txt", year), common::journal_text(start, days).into_bytes());
        let (task_id, handle) = controller.submit_with_handle(document);
        runs.push((task_id, handle, days));
    }
    runs.push({
        let (task_id, handle) = controller.submit_with_handle(Document::new("empty.txt", b"nothing dated".to_vec()));
        (task_id, handle, 0)
    });

    for (task_id, handle, days) in runs {
        let result = handle.await.unwrap();
        let snapshot = controller.poll(&task_id).unwrap();
        if days == 0 {
            assert!(result.is_err());
            assert_eq!(snapshot.stage, TaskStage::Failed);
        } else {
            assert_eq!(result.unwrap().success_count, days);
            assert_eq!(snapshot.stage, TaskStage::Completed);
            assert_eq!(snapshot.success_count, days);
        }
    }

    assert_eq!(store.len(), 5 + 6 + 7 + 8 + 9);
}

#[tokio::test]
async fn test_poll_withUnknownTask_shouldReturnNone() {
    let controller = text_controller(Arc::new(InMemoryEntryStore::new()));
    assert!(controller.poll("not-a-task").is_none());
}

#[test]
fn test_documentFromPath_shouldKeepFileNameAndHashBytes() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "notes.txt", "01/01/2020 New year.")?;

    let document = tokio_test::block_on(Document::from_path(&path))?;

    assert_eq!(document.original_name, "notes.txt");
    assert_eq!(document.hash(), Document::new("other.txt", b"01/01/2020 New year.".to_vec()).hash());
    Ok(())
}
