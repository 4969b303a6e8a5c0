/*!
 * Pipeline controller: runs one document through every stage.
 *
 * Stages run strictly in order within a run: stage the upload, extract pages,
 * segment, normalize, validate, persist. Progress is published to the status
 * store at each stage boundary. Only a whole-document extraction failure or a
 * segmentation failure fails the task; everything else is recorded in the
 * task's errors and the run completes with partial success.
 *
 * Independent documents run as separate tokio tasks and share only the
 * status store and the entry store.
 */

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use log::{debug, error, info, warn};
use sha2::{Digest, Sha256};
use tokio::task::JoinHandle;

use crate::app_config::{Config, ProgressCheckpoints};
use crate::entry::NormalizedEntry;
use crate::errors::{ExtractionError, PipelineError};
use crate::extraction::PageExtractor;
use crate::normalizer::TextNormalizer;
use crate::persistence::{BatchPersistenceCoordinator, EntryStore, Provenance};
use crate::segmentation::EntrySegmenter;
use crate::status::{ProcessingStatusStore, TaskSnapshot, TaskUpdate};
use crate::validation::EntryValidator;

use super::report::PipelineReport;

/// An uploaded document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Name the document was uploaded under
    pub original_name: String,
    pub bytes: Vec<u8>,
}

impl Document {
    pub fn new(original_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            original_name: original_name.into(),
            bytes,
        }
    }

    /// Read a document from disk, named after its file name
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let original_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Ok(Self::new(original_name, bytes))
    }

    /// SHA-256 of the document bytes, hex encoded
    pub fn hash(&self) -> String {
        format!("{:x}", Sha256::digest(&self.bytes))
    }
}

/// Runs documents through the ingestion pipeline
#[derive(Clone)]
pub struct PipelineController {
    segmenter: Arc<EntrySegmenter>,
    normalizer: TextNormalizer,
    validator: Arc<EntryValidator>,
    extractor: Arc<dyn PageExtractor>,
    store: Arc<dyn EntryStore>,
    status: Arc<ProcessingStatusStore>,
    config: Arc<Config>,
    today: Option<NaiveDate>,
}

impl PipelineController {
    /// Build a controller; the configuration is checked before anything runs
    pub fn new(
        config: Config,
        extractor: Arc<dyn PageExtractor>,
        store: Arc<dyn EntryStore>,
    ) -> Result<Self, PipelineError> {
        config.validate()?;

        Ok(Self {
            segmenter: Arc::new(EntrySegmenter::from_formats(&config.segmentation.date_formats)),
            normalizer: TextNormalizer::new(),
            validator: Arc::new(EntryValidator::new(config.validation.clone())),
            extractor,
            store,
            status: Arc::new(ProcessingStatusStore::new(&config.status)),
            config: Arc::new(config),
            today: None,
        })
    }

    /// Share an existing status store
    pub fn with_status_store(mut self, status: Arc<ProcessingStatusStore>) -> Self {
        self.status = status;
        self
    }

    /// Pin the processing date used for future-date checks
    pub fn with_processing_date(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn status_store(&self) -> &Arc<ProcessingStatusStore> {
        &self.status
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn checkpoints(&self) -> &ProgressCheckpoints {
        &self.config.status.checkpoints
    }

    /// Accept a document and start processing it in the background
    pub fn submit(&self, document: Document) -> String {
        self.submit_with_handle(document).0
    }

    /// Like `submit`, also returning the handle of the spawned run
    pub fn submit_with_handle(&self, document: Document) -> (String, JoinHandle<Result<PipelineReport, PipelineError>>) {
        let task_id = self.status.create();
        info!("Accepted {} as task {}", document.original_name, task_id);

        let controller = self.clone();
        let id = task_id.clone();
        let handle = tokio::spawn(async move { controller.run(&id, document).await });

        (task_id, handle)
    }

    /// Current status of a task, `None` when unknown or expired
    pub fn poll(&self, task_id: &str) -> Option<TaskSnapshot> {
        self.status.get(task_id)
    }

    /// Run a document to completion under an existing task id
    pub async fn run(&self, task_id: &str, document: Document) -> Result<PipelineReport, PipelineError> {
        match self.execute(task_id, &document).await {
            Ok(report) => {
                info!("Task {} completed: {}", task_id, report.summary());
                self.publish(
                    task_id,
                    TaskUpdate::completed(report.success_count, Vec::new()),
                );
                Ok(report)
            }
            Err(e) => {
                error!("Task {} failed on {}: {}", task_id, document.original_name, e);
                self.publish(task_id, TaskUpdate::failed(e.to_string()));
                Err(e)
            }
        }
    }

    /// Status updates never abort a run; an expired record is only logged
    fn publish(&self, task_id: &str, update: TaskUpdate) {
        if let Err(e) = self.status.update(task_id, update) {
            warn!("Could not update status of task {}: {}", task_id, e);
        }
    }

    /// Record a non-fatal problem in both the report and the task
    fn record_error(&self, task_id: &str, report: &mut PipelineReport, message: String) {
        report.errors.push(message.clone());
        self.publish(task_id, TaskUpdate::error(message));
    }

    async fn execute(&self, task_id: &str, document: &Document) -> Result<PipelineReport, PipelineError> {
        let mut report = PipelineReport {
            task_id: task_id.to_string(),
            source_file: document.original_name.clone(),
            ..Default::default()
        };

        // Stage the upload so extractors always work from a file
        let (staged, document_hash) = stage_document(document).await?;
        report.document_hash = document_hash;
        self.publish(task_id, TaskUpdate::progress(self.checkpoints().staged));

        let text = self.extract_text(task_id, staged.path(), &mut report).await?;
        drop(staged);
        self.publish(task_id, TaskUpdate::progress(self.checkpoints().extracted));

        let segmentation = self.segmenter.segment(&text)?;
        if let Some(preamble) = &segmentation.preamble {
            debug!(
                "Preamble of {} characters discarded from {}",
                preamble.chars().count(),
                document.original_name
            );
        }
        for heading in &segmentation.unparseable {
            self.record_error(task_id, &mut report, format!("unparseable date heading '{}'", heading));
        }
        report.candidates = segmentation.candidates.len();
        self.publish(task_id, TaskUpdate::progress(self.checkpoints().segmented));

        let entries: Vec<NormalizedEntry> = segmentation
            .candidates
            .iter()
            .enumerate()
            .map(|(index, candidate)| {
                NormalizedEntry::from_candidate(candidate, &self.normalizer, &document.original_name, index + 1)
            })
            .collect();
        debug!("Normalized {} entries for task {}", entries.len(), task_id);
        self.publish(task_id, TaskUpdate::progress(self.checkpoints().normalized));

        let outcome = match self.today {
            Some(today) => self.validator.validate(entries, today),
            None => self.validator.validate_now(entries),
        };
        info!("{} for {}", outcome.summary(), document.original_name);
        for rejection in &outcome.rejections {
            let message = format!("entry #{} ({}) rejected: {}", rejection.entry_number, rejection.date, rejection.reason);
            self.record_error(task_id, &mut report, message);
        }
        report.accepted = outcome.accepted.len();
        report.rejections = outcome.rejections;
        self.publish(task_id, TaskUpdate::progress(self.checkpoints().validated));

        let coordinator = BatchPersistenceCoordinator::new(self.store.clone(), self.config.persistence.clone())
            .with_provenance(Provenance::new(task_id, report.document_hash.clone()));
        let persisted = coordinator.persist_all_blocking(outcome.accepted).await?;
        for message in persisted.errors {
            self.record_error(task_id, &mut report, message);
        }
        report.success_count = persisted.success_count;
        self.publish(
            task_id,
            TaskUpdate {
                percent: Some(self.checkpoints().persisted),
                success_count: Some(persisted.success_count),
                ..Default::default()
            },
        );

        Ok(report)
    }

    /// Extract pages and join the readable ones; unreadable pages are skipped
    async fn extract_text(
        &self,
        task_id: &str,
        path: &Path,
        report: &mut PipelineReport,
    ) -> Result<String, PipelineError> {
        let pages = self.extractor.extract(path).await?;
        report.pages = pages.len();

        let mut texts = Vec::with_capacity(pages.len());
        for page in pages {
            match page.text {
                Some(text) => texts.push(text),
                None => {
                    warn!("Skipping unreadable page {} of {}", page.page_number, report.source_file);
                    report.skipped_pages.push(page.page_number);
                    self.record_error(task_id, report, format!("page {} unreadable, skipped", page.page_number));
                }
            }
        }

        if texts.is_empty() {
            return Err(ExtractionError::NoReadablePages { pages: report.pages }.into());
        }

        Ok(texts.join("\n"))
    }
}

/// Write the document to a temporary file and hash it, off the async runtime
async fn stage_document(document: &Document) -> Result<(tempfile::NamedTempFile, String), PipelineError> {
    let bytes = document.bytes.clone();

    tokio::task::spawn_blocking(move || -> Result<_, PipelineError> {
        let mut staged = tempfile::Builder::new()
            .prefix("journal-ingest-")
            .suffix(".txt")
            .tempfile()?;
        staged.write_all(&bytes)?;
        staged.flush()?;

        let hash = format!("{:x}", Sha256::digest(&bytes));
        Ok((staged, hash))
    })
    .await
    .map_err(|e| PipelineError::Staging(e.to_string()))?
}
