use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::application::ports::{RepositoryError, SubtitleRepository};
use crate::domain::{Subtitle, SubtitleFormat, SubtitleId, VideoId};

pub struct PgSubtitleRepository {
    pool: PgPool,
}

impl PgSubtitleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct SubtitleRow {
    id: Uuid,
    video_id: Uuid,
    language: String,
    format: String,
    segment_count: i32,
    duration: i32,
    content: String,
    file_path: String,
    status: i16,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SubtitleRow> for Subtitle {
    type Error = RepositoryError;

    fn try_from(r: SubtitleRow) -> Result<Self, Self::Error> {
        let format = SubtitleFormat::parse(&r.format).ok_or_else(|| {
            RepositoryError::QueryFailed(format!("invalid subtitle format: {}", r.format))
        })?;
        Ok(Subtitle {
            id: SubtitleId::from_uuid(r.id),
            video_id: VideoId::from_uuid(r.video_id),
            language: r.language,
            format,
            segment_count: r.segment_count,
            duration: r.duration,
            content: r.content,
            file_path: r.file_path,
            status: r.status,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

const SELECT_SUBTITLE: &str = r#"
    SELECT id, video_id, language, format, segment_count, duration, content, file_path,
           status, created_at, updated_at
    FROM subtitles
"#;

#[async_trait]
impl SubtitleRepository for PgSubtitleRepository {
    #[instrument(skip(self, subtitle), fields(subtitle_id = %subtitle.id))]
    async fn create(&self, subtitle: &Subtitle) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO subtitles (id, video_id, language, format, segment_count, duration,
                                   content, file_path, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(subtitle.id.as_uuid())
        .bind(subtitle.video_id.as_uuid())
        .bind(&subtitle.language)
        .bind(subtitle.format.as_str())
        .bind(subtitle.segment_count)
        .bind(subtitle.duration)
        .bind(&subtitle.content)
        .bind(&subtitle.file_path)
        .bind(subtitle.status)
        .bind(subtitle.created_at)
        .bind(subtitle.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    #[instrument(skip(self), fields(subtitle_id = %id))]
    async fn get_by_id(&self, id: SubtitleId) -> Result<Option<Subtitle>, RepositoryError> {
        let row: Option<SubtitleRow> =
            sqlx::query_as(&format!("{} WHERE id = $1", SELECT_SUBTITLE))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        row.map(Subtitle::try_from).transpose()
    }

    #[instrument(skip(self), fields(video_id = %video_id))]
    async fn list_by_video(&self, video_id: VideoId) -> Result<Vec<Subtitle>, RepositoryError> {
        let rows: Vec<SubtitleRow> = sqlx::query_as(&format!(
            "{} WHERE video_id = $1 ORDER BY created_at DESC",
            SELECT_SUBTITLE
        ))
        .bind(video_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        rows.into_iter().map(Subtitle::try_from).collect()
    }

    #[instrument(skip(self, file_path), fields(subtitle_id = %id))]
    async fn update_file_path(
        &self,
        id: SubtitleId,
        file_path: &str,
    ) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE subtitles SET file_path = $1, updated_at = $2 WHERE id = $3")
                .bind(file_path)
                .bind(Utc::now())
                .bind(id.as_uuid())
                .execute(&self.pool)
                .await
                .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("subtitle {}", id)));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(subtitle_id = %id))]
    async fn delete(&self, id: SubtitleId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM subtitles WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
