use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::application::ports::{RepositoryError, VideoRepository};
use crate::domain::{Video, VideoId};

pub struct PgVideoRepository {
    pool: PgPool,
}

impl PgVideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct VideoRow {
    id: Uuid,
    owner_id: String,
    title: String,
    file_name: String,
    file_path: String,
    file_size: i64,
    format: String,
    language: String,
    duration: String,
    status: i16,
    progress: i16,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<VideoRow> for Video {
    fn from(r: VideoRow) -> Self {
        Video {
            id: VideoId::from_uuid(r.id),
            owner_id: r.owner_id,
            title: r.title,
            file_name: r.file_name,
            file_path: r.file_path,
            file_size: r.file_size,
            format: r.format,
            language: r.language,
            duration: r.duration,
            status: r.status,
            progress: r.progress,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

const SELECT_VIDEO: &str = r#"
    SELECT id, owner_id, title, file_name, file_path, file_size, format, language, duration,
           status, progress, created_at, updated_at
    FROM videos
"#;

#[async_trait]
impl VideoRepository for PgVideoRepository {
    #[instrument(skip(self, video), fields(video_id = %video.id))]
    async fn create(&self, video: &Video) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO videos (id, owner_id, title, file_name, file_path, file_size, format,
                                language, duration, status, progress, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(video.id.as_uuid())
        .bind(&video.owner_id)
        .bind(&video.title)
        .bind(&video.file_name)
        .bind(&video.file_path)
        .bind(video.file_size)
        .bind(&video.format)
        .bind(&video.language)
        .bind(&video.duration)
        .bind(video.status)
        .bind(video.progress)
        .bind(video.created_at)
        .bind(video.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    #[instrument(skip(self), fields(video_id = %id))]
    async fn get_by_id(&self, id: VideoId) -> Result<Option<Video>, RepositoryError> {
        let row: Option<VideoRow> = sqlx::query_as(&format!("{} WHERE id = $1", SELECT_VIDEO))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(row.map(Video::from))
    }

    #[instrument(skip(self))]
    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Video>, RepositoryError> {
        let rows: Vec<VideoRow> = sqlx::query_as(&format!(
            "{} WHERE owner_id = $1 ORDER BY created_at DESC",
            SELECT_VIDEO
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(rows.into_iter().map(Video::from).collect())
    }

    #[instrument(skip(self), fields(video_id = %id))]
    async fn delete(&self, id: VideoId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM videos WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
