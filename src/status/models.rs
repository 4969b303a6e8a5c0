/*!
 * Processing task models.
 */

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle stage of a processing task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStage {
    Processing,
    Completed,
    Failed,
}

impl TaskStage {
    /// Completed and failed tasks accept no further updates
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStage::Completed | TaskStage::Failed)
    }
}

impl std::fmt::Display for TaskStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStage::Processing => write!(f, "processing"),
            TaskStage::Completed => write!(f, "completed"),
            TaskStage::Failed => write!(f, "failed"),
        }
    }
}

/// Mutable record of one document run
#[derive(Debug, Clone)]
pub struct ProcessingTask {
    pub task_id: String,
    pub stage: TaskStage,
    /// 0 to 100, never decreases
    pub percent: u8,
    pub errors: Vec<String>,
    pub success_count: usize,
    pub created_at: DateTime<Utc>,
    /// Monotonic creation time, used for TTL
    pub(crate) created: Instant,
}

impl ProcessingTask {
    pub fn new(task_id: String) -> Self {
        Self {
            task_id,
            stage: TaskStage::Processing,
            percent: 0,
            errors: Vec::new(),
            success_count: 0,
            created_at: Utc::now(),
            created: Instant::now(),
        }
    }

    pub fn snapshot(&self) -> TaskSnapshot {
        TaskSnapshot {
            task_id: self.task_id.clone(),
            stage: self.stage,
            percent: self.percent,
            errors: self.errors.clone(),
            success_count: self.success_count,
            created_at: self.created_at,
        }
    }
}

/// Partial update applied to a task; unset fields are left alone
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskUpdate {
    pub stage: Option<TaskStage>,
    pub percent: Option<u8>,
    pub success_count: Option<usize>,
    /// Appended to the task's errors
    pub errors: Vec<String>,
}

impl TaskUpdate {
    pub fn progress(percent: u8) -> Self {
        Self {
            percent: Some(percent),
            ..Default::default()
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            errors: vec![message.into()],
            ..Default::default()
        }
    }

    pub fn completed(success_count: usize, errors: Vec<String>) -> Self {
        Self {
            stage: Some(TaskStage::Completed),
            percent: Some(100),
            success_count: Some(success_count),
            errors,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            stage: Some(TaskStage::Failed),
            errors: vec![message.into()],
            ..Default::default()
        }
    }
}

/// Copy of a task handed to pollers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSnapshot {
    pub task_id: String,
    pub stage: TaskStage,
    pub percent: u8,
    pub errors: Vec<String>,
    pub success_count: usize,
    pub created_at: DateTime<Utc>,
}

impl TaskSnapshot {
    pub fn is_terminal(&self) -> bool {
        self.stage.is_terminal()
    }
}
