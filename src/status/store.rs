/*!
 * Process-wide registry of processing tasks.
 *
 * The map lock is only taken for writing to insert, remove or sweep; updates
 * to different tasks share the read lock and contend only on their own
 * record. Records older than the TTL are dropped by a sweep that runs on
 * `create` and `get`.
 */

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use parking_lot::{Mutex, RwLock};
use uuid::Uuid;

use crate::app_config::StatusConfig;
use crate::errors::StatusError;

use super::models::{ProcessingTask, TaskSnapshot, TaskUpdate};

/// Concurrent `task_id -> task` registry with TTL eviction
#[derive(Debug)]
pub struct ProcessingStatusStore {
    tasks: RwLock<HashMap<String, Arc<Mutex<ProcessingTask>>>>,
    ttl: Duration,
}

impl Default for ProcessingStatusStore {
    fn default() -> Self {
        Self::new(&StatusConfig::default())
    }
}

impl ProcessingStatusStore {
    pub fn new(config: &StatusConfig) -> Self {
        Self::with_ttl(config.ttl())
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            tasks: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Register a new task and return its id
    pub fn create(&self) -> String {
        self.sweep();

        let task_id = Uuid::new_v4().to_string();
        let task = ProcessingTask::new(task_id.clone());
        self.tasks
            .write()
            .insert(task_id.clone(), Arc::new(Mutex::new(task)));

        debug!("Created task {}", task_id);
        task_id
    }

    fn record(&self, task_id: &str) -> Result<Arc<Mutex<ProcessingTask>>, StatusError> {
        self.tasks
            .read()
            .get(task_id)
            .cloned()
            .ok_or_else(|| StatusError::NotFound(task_id.to_string()))
    }

    /// Apply an update to a task
    pub fn update(&self, task_id: &str, update: TaskUpdate) -> Result<(), StatusError> {
        let record = self.record(task_id)?;
        let mut task = record.lock();

        if task.stage.is_terminal() {
            return Err(StatusError::AlreadyTerminal {
                task_id: task_id.to_string(),
                stage: task.stage.to_string(),
            });
        }

        if let Some(percent) = update.percent {
            let percent = percent.min(100);
            if percent < task.percent {
                warn!(
                    "Ignoring progress regression for task {}: {} -> {}",
                    task_id, task.percent, percent
                );
            } else {
                task.percent = percent;
            }
        }
        if let Some(success_count) = update.success_count {
            task.success_count = success_count;
        }
        task.errors.extend(update.errors);
        if let Some(stage) = update.stage {
            task.stage = stage;
        }

        Ok(())
    }

    /// Current snapshot of a task, `None` when unknown or expired
    pub fn get(&self, task_id: &str) -> Option<TaskSnapshot> {
        self.sweep();
        let record = self.record(task_id).ok()?;
        let snapshot = record.lock().snapshot();
        Some(snapshot)
    }

    /// Drop a task explicitly
    pub fn remove(&self, task_id: &str) -> bool {
        self.tasks.write().remove(task_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.tasks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Evict every record older than the TTL, returning how many were dropped
    pub fn sweep(&self) -> usize {
        let ttl = self.ttl;
        let mut tasks = self.tasks.write();
        let before = tasks.len();
        tasks.retain(|_, record| record.lock().created.elapsed() < ttl);

        let evicted = before - tasks.len();
        if evicted > 0 {
            debug!("Evicted {} expired task(s)", evicted);
        }
        evicted
    }
}
