use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::application::ports::{
    RepositoryError, SubtitleRepository, TaskRepository, VideoRepository,
};
use crate::domain::{Subtitle, SubtitleId, TaskId, TaskRecord, TaskStatus, Video, VideoId};

/// Process-local task store, used when no database is configured and in tests.
#[derive(Default)]
pub struct InMemoryTaskRepository {
    tasks: RwLock<HashMap<TaskId, TaskRecord>>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn with_task<F>(&self, id: TaskId, apply: F) -> Result<(), RepositoryError>
    where
        F: FnOnce(&mut TaskRecord) -> bool + Send,
    {
        let mut tasks = self.tasks.write().await;
        let task = tasks
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::NotFound(format!("task {}", id)))?;
        apply(task);
        Ok(())
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn create(&self, task: &TaskRecord) -> Result<(), RepositoryError> {
        let mut tasks = self.tasks.write().await;
        if tasks.contains_key(&task.task_id) {
            return Err(RepositoryError::ConstraintViolation(format!(
                "task {} already exists",
                task.task_id
            )));
        }
        tasks.insert(task.task_id, task.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: TaskId) -> Result<Option<TaskRecord>, RepositoryError> {
        Ok(self.tasks.read().await.get(&id).cloned())
    }

    async fn update_progress(
        &self,
        id: TaskId,
        progress: u8,
        message: &str,
    ) -> Result<(), RepositoryError> {
        self.with_task(id, |task| task.advance(progress, message))
            .await
    }

    async fn mark_succeeded(&self, id: TaskId, message: &str) -> Result<(), RepositoryError> {
        self.with_task(id, |task| task.succeed(message)).await
    }

    async fn mark_failed(&self, id: TaskId, error_message: &str) -> Result<(), RepositoryError> {
        self.with_task(id, |task| task.fail(error_message)).await
    }

    async fn list_by_status(&self, status: TaskStatus) -> Result<Vec<TaskRecord>, RepositoryError> {
        let mut found: Vec<TaskRecord> = self
            .tasks
            .read()
            .await
            .values()
            .filter(|t| t.status == status)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }
}

#[derive(Default)]
pub struct InMemorySubtitleRepository {
    subtitles: RwLock<HashMap<SubtitleId, Subtitle>>,
}

impl InMemorySubtitleRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubtitleRepository for InMemorySubtitleRepository {
    async fn create(&self, subtitle: &Subtitle) -> Result<(), RepositoryError> {
        self.subtitles
            .write()
            .await
            .insert(subtitle.id, subtitle.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: SubtitleId) -> Result<Option<Subtitle>, RepositoryError> {
        Ok(self.subtitles.read().await.get(&id).cloned())
    }

    async fn list_by_video(&self, video_id: VideoId) -> Result<Vec<Subtitle>, RepositoryError> {
        let mut found: Vec<Subtitle> = self
            .subtitles
            .read()
            .await
            .values()
            .filter(|s| s.video_id == video_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn update_file_path(
        &self,
        id: SubtitleId,
        file_path: &str,
    ) -> Result<(), RepositoryError> {
        let mut subtitles = self.subtitles.write().await;
        let subtitle = subtitles
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::NotFound(format!("subtitle {}", id)))?;
        subtitle.file_path = file_path.to_string();
        subtitle.updated_at = Utc::now();
        Ok(())
    }

    async fn delete(&self, id: SubtitleId) -> Result<bool, RepositoryError> {
        Ok(self.subtitles.write().await.remove(&id).is_some())
    }
}

#[derive(Default)]
pub struct InMemoryVideoRepository {
    videos: RwLock<HashMap<VideoId, Video>>,
}

impl InMemoryVideoRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VideoRepository for InMemoryVideoRepository {
    async fn create(&self, video: &Video) -> Result<(), RepositoryError> {
        self.videos.write().await.insert(video.id, video.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: VideoId) -> Result<Option<Video>, RepositoryError> {
        Ok(self.videos.read().await.get(&id).cloned())
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Video>, RepositoryError> {
        let mut found: Vec<Video> = self
            .videos
            .read()
            .await
            .values()
            .filter(|v| v.owner_id == owner_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn delete(&self, id: VideoId) -> Result<bool, RepositoryError> {
        Ok(self.videos.write().await.remove(&id).is_some())
    }
}
