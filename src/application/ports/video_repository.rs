use async_trait::async_trait;

use crate::domain::{Video, VideoId};

use super::RepositoryError;

#[async_trait]
pub trait VideoRepository: Send + Sync {
    async fn create(&self, video: &Video) -> Result<(), RepositoryError>;

    async fn get_by_id(&self, id: VideoId) -> Result<Option<Video>, RepositoryError>;

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Video>, RepositoryError>;

    async fn delete(&self, id: VideoId) -> Result<bool, RepositoryError>;
}
