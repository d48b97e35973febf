use async_trait::async_trait;

use crate::domain::{TaskId, TaskRecord, TaskStatus};

use super::RepositoryError;

/// Storage for task rows. Updates against a terminal task are ignored.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn create(&self, task: &TaskRecord) -> Result<(), RepositoryError>;

    async fn get_by_id(&self, id: TaskId) -> Result<Option<TaskRecord>, RepositoryError>;

    /// Progress never decreases.
    async fn update_progress(
        &self,
        id: TaskId,
        progress: u8,
        message: &str,
    ) -> Result<(), RepositoryError>;

    async fn mark_succeeded(&self, id: TaskId, message: &str) -> Result<(), RepositoryError>;

    async fn mark_failed(&self, id: TaskId, error_message: &str) -> Result<(), RepositoryError>;

    async fn list_by_status(&self, status: TaskStatus) -> Result<Vec<TaskRecord>, RepositoryError>;
}
