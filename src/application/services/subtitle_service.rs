use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::application::ports::{
    MediaStore, MediaStoreError, RepositoryError, SubtitleRepository, TaskRepository,
    VideoRepository,
};
use crate::domain::{
    Subtitle, SubtitleFormat, SubtitleId, TaskId, TaskRecord, TaskStatus, VideoId,
    subtitle_format,
};

use super::SubtitleRequest;

/// Rendered subtitle ready to be sent to a client.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleExport {
    pub format: SubtitleFormat,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Submission and queries for subtitle generation.
pub struct SubtitleService {
    tasks: Arc<dyn TaskRepository>,
    subtitles: Arc<dyn SubtitleRepository>,
    videos: Arc<dyn VideoRepository>,
    store: Arc<dyn MediaStore>,
    sender: mpsc::Sender<SubtitleRequest>,
}

impl SubtitleService {
    pub fn new(
        tasks: Arc<dyn TaskRepository>,
        subtitles: Arc<dyn SubtitleRepository>,
        videos: Arc<dyn VideoRepository>,
        store: Arc<dyn MediaStore>,
        sender: mpsc::Sender<SubtitleRequest>,
    ) -> Self {
        Self {
            tasks,
            subtitles,
            videos,
            store,
            sender,
        }
    }

    /// Persists a Running task and queues it. Returns as soon as the task is queued.
    #[tracing::instrument(skip(self))]
    pub async fn submit(
        &self,
        video_id: VideoId,
        language: &str,
        format: &str,
    ) -> Result<TaskId, SubtitleServiceError> {
        if self.videos.get_by_id(video_id).await?.is_none() {
            return Err(SubtitleServiceError::NotFound(format!("video {}", video_id)));
        }

        let task = TaskRecord::new(video_id);
        let task_id = task.task_id;
        self.tasks.create(&task).await?;

        let request = SubtitleRequest {
            task_id,
            video_id,
            language: language.to_string(),
            format: SubtitleFormat::parse_or_default(format),
        };

        if let Err(e) = self.sender.try_send(request) {
            tracing::error!(error = %e, task_id = %task_id, "Failed to enqueue subtitle task");
            let reason = match e {
                mpsc::error::TrySendError::Full(_) => "task queue full",
                mpsc::error::TrySendError::Closed(_) => "task workers unavailable",
            };
            if let Err(mark_err) = self.tasks.mark_failed(task_id, reason).await {
                tracing::warn!(error = %mark_err, "Failed to mark unqueued task failed");
            }
            return Err(SubtitleServiceError::Unavailable(reason.to_string()));
        }

        tracing::info!(task_id = %task_id, "Subtitle task enqueued");
        Ok(task_id)
    }

    pub async fn get_task_status(&self, task_id: TaskId) -> Result<TaskRecord, SubtitleServiceError> {
        self.tasks
            .get_by_id(task_id)
            .await?
            .ok_or_else(|| SubtitleServiceError::NotFound(format!("task {}", task_id)))
    }

    pub async fn list_by_video(&self, video_id: VideoId) -> Result<Vec<Subtitle>, SubtitleServiceError> {
        Ok(self.subtitles.list_by_video(video_id).await?)
    }

    pub async fn get(&self, id: SubtitleId) -> Result<Subtitle, SubtitleServiceError> {
        self.subtitles
            .get_by_id(id)
            .await?
            .ok_or_else(|| SubtitleServiceError::NotFound(format!("subtitle {}", id)))
    }

    /// Raw bytes of the rendered file, or not-found when no file was rendered.
    pub async fn get_subtitle_file(&self, id: SubtitleId) -> Result<Vec<u8>, SubtitleServiceError> {
        let subtitle = self.get(id).await?;
        if !subtitle.has_file() {
            return Err(SubtitleServiceError::NotFound(format!(
                "subtitle {} has no rendered file",
                id
            )));
        }
        match self.store.read(&PathBuf::from(&subtitle.file_path)).await {
            Ok(bytes) => Ok(bytes),
            Err(MediaStoreError::NotFound(path)) => Err(SubtitleServiceError::NotFound(path)),
            Err(e) => Err(e.into()),
        }
    }

    /// The stored file when `format` is absent or matches, otherwise a fresh render.
    pub async fn export(
        &self,
        id: SubtitleId,
        format: Option<&str>,
    ) -> Result<SubtitleExport, SubtitleServiceError> {
        let subtitle = self.get(id).await?;
        let requested = format
            .filter(|f| !f.trim().is_empty())
            .map(SubtitleFormat::parse_or_default)
            .unwrap_or(subtitle.format);

        let bytes = if requested == subtitle.format {
            self.get_subtitle_file(id).await?
        } else {
            let segments = subtitle
                .segments()
                .map_err(|e| SubtitleServiceError::Corrupt(e.to_string()))?;
            subtitle_format::render(requested, &segments)
                .map_err(|e| SubtitleServiceError::Corrupt(e.to_string()))?
                .into_bytes()
        };

        Ok(SubtitleExport {
            format: requested,
            file_name: format!("{}.{}", subtitle.id, requested.extension()),
            bytes,
        })
    }

    /// Deletes the rendered file, then the row. A file that cannot be removed is logged
    /// and left behind.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: SubtitleId) -> Result<(), SubtitleServiceError> {
        let subtitle = self.get(id).await?;
        if subtitle.has_file() {
            if let Err(e) = self.store.delete(&PathBuf::from(&subtitle.file_path)).await {
                tracing::warn!(error = %e, subtitle_id = %id, "Failed to delete subtitle file");
            }
        }
        if !self.subtitles.delete(id).await? {
            return Err(SubtitleServiceError::NotFound(format!("subtitle {}", id)));
        }
        tracing::info!(subtitle_id = %id, "Subtitle deleted");
        Ok(())
    }

    /// Marks tasks left Running by a previous process as Failed.
    pub async fn sweep_interrupted(&self) -> Result<usize, SubtitleServiceError> {
        let running = self.tasks.list_by_status(TaskStatus::Running).await?;
        for task in &running {
            self.tasks.mark_failed(task.task_id, "interrupted").await?;
        }
        if !running.is_empty() {
            tracing::warn!(count = running.len(), "Marked interrupted tasks as failed");
        }
        Ok(running.len())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SubtitleServiceError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("service unavailable: {0}")]
    Unavailable(String),
    #[error("stored subtitle is unreadable: {0}")]
    Corrupt(String),
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
    #[error("storage: {0}")]
    Storage(#[from] MediaStoreError),
}
