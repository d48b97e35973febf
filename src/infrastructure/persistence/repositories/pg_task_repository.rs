use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::application::ports::{RepositoryError, TaskRepository};
use crate::domain::{PROGRESS_DONE, TaskId, TaskRecord, TaskStatus, VideoId};

pub struct PgTaskRepository {
    pool: PgPool,
}

impl PgTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Guarded updates touch zero rows on terminal tasks; only a missing row is an error.
    async fn ensure_exists(&self, id: TaskId) -> Result<(), RepositoryError> {
        let found: Option<(Uuid,)> = sqlx::query_as("SELECT task_id FROM tasks WHERE task_id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;
        match found {
            Some(_) => Ok(()),
            None => Err(RepositoryError::NotFound(format!("task {}", id))),
        }
    }
}

#[derive(sqlx::FromRow)]
struct TaskRow {
    task_id: Uuid,
    task_type: String,
    video_id: Uuid,
    status: i16,
    progress: i16,
    message: String,
    error_message: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TaskRow> for TaskRecord {
    type Error = RepositoryError;

    fn try_from(r: TaskRow) -> Result<Self, Self::Error> {
        let status = TaskStatus::from_code(r.status).ok_or_else(|| {
            RepositoryError::QueryFailed(format!("invalid task status code: {}", r.status))
        })?;
        Ok(TaskRecord {
            task_id: TaskId::from_uuid(r.task_id),
            task_type: r.task_type,
            video_id: VideoId::from_uuid(r.video_id),
            status,
            progress: r.progress.clamp(0, PROGRESS_DONE as i16) as u8,
            message: r.message,
            error_message: r.error_message,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

const SELECT_TASK: &str = r#"
    SELECT task_id, task_type, video_id, status, progress, message, error_message,
           created_at, updated_at
    FROM tasks
"#;

#[async_trait]
impl TaskRepository for PgTaskRepository {
    #[instrument(skip(self, task), fields(task_id = %task.task_id))]
    async fn create(&self, task: &TaskRecord) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO tasks (task_id, task_type, video_id, status, progress, message,
                               error_message, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(task.task_id.as_uuid())
        .bind(&task.task_type)
        .bind(task.video_id.as_uuid())
        .bind(task.status.code())
        .bind(task.progress as i16)
        .bind(&task.message)
        .bind(&task.error_message)
        .bind(task.created_at)
        .bind(task.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepositoryError::ConstraintViolation(db.to_string())
            }
            other => RepositoryError::QueryFailed(other.to_string()),
        })?;

        Ok(())
    }

    #[instrument(skip(self), fields(task_id = %id))]
    async fn get_by_id(&self, id: TaskId) -> Result<Option<TaskRecord>, RepositoryError> {
        let row: Option<TaskRow> = sqlx::query_as(&format!("{} WHERE task_id = $1", SELECT_TASK))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        row.map(TaskRecord::try_from).transpose()
    }

    #[instrument(skip(self, message), fields(task_id = %id, progress))]
    async fn update_progress(
        &self,
        id: TaskId,
        progress: u8,
        message: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET progress = GREATEST(progress, $1), message = $2, updated_at = $3
            WHERE task_id = $4 AND status = $5
            "#,
        )
        .bind(progress.min(PROGRESS_DONE) as i16)
        .bind(message)
        .bind(Utc::now())
        .bind(id.as_uuid())
        .bind(TaskStatus::Running.code())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        if result.rows_affected() == 0 {
            self.ensure_exists(id).await?;
        }
        Ok(())
    }

    #[instrument(skip(self, message), fields(task_id = %id))]
    async fn mark_succeeded(&self, id: TaskId, message: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET status = $1, progress = $2, message = $3, updated_at = $4
            WHERE task_id = $5 AND status = $6
            "#,
        )
        .bind(TaskStatus::Succeeded.code())
        .bind(PROGRESS_DONE as i16)
        .bind(message)
        .bind(Utc::now())
        .bind(id.as_uuid())
        .bind(TaskStatus::Running.code())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        if result.rows_affected() == 0 {
            self.ensure_exists(id).await?;
        }
        Ok(())
    }

    #[instrument(skip(self, error_message), fields(task_id = %id))]
    async fn mark_failed(&self, id: TaskId, error_message: &str) -> Result<(), RepositoryError> {
        let error_message = if error_message.trim().is_empty() {
            "unknown error"
        } else {
            error_message
        };
        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET status = $1, message = $2, error_message = $2, updated_at = $3
            WHERE task_id = $4 AND status = $5
            "#,
        )
        .bind(TaskStatus::Failed.code())
        .bind(error_message)
        .bind(Utc::now())
        .bind(id.as_uuid())
        .bind(TaskStatus::Running.code())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        if result.rows_affected() == 0 {
            self.ensure_exists(id).await?;
        }
        Ok(())
    }

    #[instrument(skip(self), fields(status = %status))]
    async fn list_by_status(&self, status: TaskStatus) -> Result<Vec<TaskRecord>, RepositoryError> {
        let rows: Vec<TaskRow> = sqlx::query_as(&format!(
            "{} WHERE status = $1 ORDER BY created_at DESC",
            SELECT_TASK
        ))
        .bind(status.code())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        rows.into_iter().map(TaskRecord::try_from).collect()
    }
}
