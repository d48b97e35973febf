use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{TaskId, TaskStatus, VideoId};

pub const SUBTITLE_GENERATE_TASK: &str = "subtitle_generate";

pub const PROGRESS_STARTING: u8 = 0;
pub const PROGRESS_EXTRACTING: u8 = 10;
pub const PROGRESS_TRANSCRIBING: u8 = 30;
pub const PROGRESS_SAVING: u8 = 80;
pub const PROGRESS_RENDERING: u8 = 95;
pub const PROGRESS_DONE: u8 = 100;

/// One run of the subtitle pipeline, as seen by pollers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub task_id: TaskId,
    pub task_type: String,
    pub video_id: VideoId,
    pub status: TaskStatus,
    pub progress: u8,
    pub message: String,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskRecord {
    pub fn new(video_id: VideoId) -> Self {
        let now = Utc::now();
        Self {
            task_id: TaskId::new(),
            task_type: SUBTITLE_GENERATE_TASK.to_string(),
            video_id,
            status: TaskStatus::Running,
            progress: PROGRESS_STARTING,
            message: "starting".to_string(),
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a progress checkpoint. Ignored once terminal; progress never moves backwards.
    pub fn advance(&mut self, progress: u8, message: &str) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.progress = self.progress.max(progress.min(PROGRESS_DONE));
        self.message = message.to_string();
        self.updated_at = Utc::now();
        true
    }

    pub fn succeed(&mut self, message: &str) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = TaskStatus::Succeeded;
        self.progress = PROGRESS_DONE;
        self.message = message.to_string();
        self.updated_at = Utc::now();
        true
    }

    /// Marks the task failed, keeping the last observed progress.
    pub fn fail(&mut self, error_message: &str) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        let error_message = if error_message.trim().is_empty() {
            "unknown error"
        } else {
            error_message
        };
        self.status = TaskStatus::Failed;
        self.message = error_message.to_string();
        self.error_message = Some(error_message.to_string());
        self.updated_at = Utc::now();
        true
    }
}
