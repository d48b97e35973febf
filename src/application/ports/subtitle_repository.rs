use async_trait::async_trait;

use crate::domain::{Subtitle, SubtitleId, VideoId};

use super::RepositoryError;

#[async_trait]
pub trait SubtitleRepository: Send + Sync {
    async fn create(&self, subtitle: &Subtitle) -> Result<(), RepositoryError>;

    async fn get_by_id(&self, id: SubtitleId) -> Result<Option<Subtitle>, RepositoryError>;

    async fn list_by_video(&self, video_id: VideoId) -> Result<Vec<Subtitle>, RepositoryError>;

    async fn update_file_path(&self, id: SubtitleId, file_path: &str)
    -> Result<(), RepositoryError>;

    /// Returns whether a row was removed.
    async fn delete(&self, id: SubtitleId) -> Result<bool, RepositoryError>;
}
