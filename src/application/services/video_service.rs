use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use futures::stream::BoxStream;
use uuid::Uuid;

use crate::application::ports::{
    AudioExtractor, MediaStore, MediaStoreError, RepositoryError, VideoRepository,
};
use crate::domain::{StorageLayout, Video, VideoId, extension_of, stem_of};

pub const DEFAULT_VIDEO_LANGUAGE: &str = "zh-CN";

#[derive(Debug, Clone)]
pub struct UploadPolicy {
    pub allowed_formats: Vec<String>,
    pub max_size: u64,
}

impl UploadPolicy {
    pub fn accepts(&self, file_name: &str) -> bool {
        extension_of(file_name)
            .map(|ext| self.allowed_formats.iter().any(|f| f.eq_ignore_ascii_case(&ext)))
            .unwrap_or(false)
    }
}

pub struct VideoUpload<'a> {
    pub owner_id: String,
    pub file_name: String,
    pub title: Option<String>,
    pub language: Option<String>,
    pub stream: BoxStream<'a, Result<Bytes, io::Error>>,
}

pub struct VideoService {
    videos: Arc<dyn VideoRepository>,
    store: Arc<dyn MediaStore>,
    extractor: Arc<dyn AudioExtractor>,
    layout: StorageLayout,
    policy: UploadPolicy,
}

impl VideoService {
    pub fn new(
        videos: Arc<dyn VideoRepository>,
        store: Arc<dyn MediaStore>,
        extractor: Arc<dyn AudioExtractor>,
        layout: StorageLayout,
        policy: UploadPolicy,
    ) -> Self {
        Self {
            videos,
            store,
            extractor,
            layout,
            policy,
        }
    }

    pub fn validate_format(&self, file_name: &str) -> bool {
        self.policy.accepts(file_name)
    }

    #[tracing::instrument(skip(self, upload), fields(file_name = %upload.file_name, owner = %upload.owner_id))]
    pub async fn upload(&self, upload: VideoUpload<'_>) -> Result<Video, VideoServiceError> {
        let file_name = upload.file_name.trim().to_string();
        if file_name.is_empty() {
            return Err(VideoServiceError::InvalidInput(
                "file name is required".to_string(),
            ));
        }
        let Some(extension) = extension_of(&file_name).filter(|_| self.policy.accepts(&file_name))
        else {
            return Err(VideoServiceError::InvalidInput(format!(
                "unsupported video format: {} (allowed: {})",
                file_name,
                self.policy.allowed_formats.join(",")
            )));
        };

        let path = self.layout.video_file(&Uuid::new_v4(), &extension);
        let size = match self
            .store
            .store_stream(&path, upload.stream, Some(self.policy.max_size))
            .await
        {
            Ok(size) => size,
            Err(MediaStoreError::TooLarge { limit }) => {
                return Err(VideoServiceError::TooLarge { limit });
            }
            Err(e) => return Err(e.into()),
        };
        if size == 0 {
            self.discard(&path).await;
            return Err(VideoServiceError::InvalidInput("uploaded file is empty".to_string()));
        }

        let duration = self.extractor.video_duration(&path).await;
        let title = upload
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| stem_of(&file_name));
        let language = upload
            .language
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_VIDEO_LANGUAGE.to_string());

        let video = Video::new(
            VideoId::new(),
            upload.owner_id,
            title,
            file_name,
            path.to_string_lossy().into_owned(),
            size as i64,
            language,
            duration,
        );

        if let Err(e) = self.videos.create(&video).await {
            self.discard(&path).await;
            return Err(e.into());
        }

        tracing::info!(video_id = %video.id, bytes = size, duration_seconds = duration, "Video uploaded");
        Ok(video)
    }

    pub async fn list(&self, owner_id: &str) -> Result<Vec<Video>, VideoServiceError> {
        Ok(self.videos.list_by_owner(owner_id).await?)
    }

    pub async fn get(&self, id: VideoId) -> Result<Video, VideoServiceError> {
        self.videos
            .get_by_id(id)
            .await?
            .ok_or_else(|| VideoServiceError::NotFound(format!("video {}", id)))
    }

    /// Deletes the stored file, then the row.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: VideoId) -> Result<(), VideoServiceError> {
        let video = self.get(id).await?;
        self.store.delete(&PathBuf::from(&video.file_path)).await?;
        if !self.videos.delete(id).await? {
            return Err(VideoServiceError::NotFound(format!("video {}", id)));
        }
        tracing::info!(video_id = %id, "Video deleted");
        Ok(())
    }

    async fn discard(&self, path: &std::path::Path) {
        if let Err(e) = self.store.delete(path).await {
            tracing::warn!(error = %e, path = %path.display(), "Failed to discard uploaded file");
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum VideoServiceError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("file exceeds the {limit} byte upload limit")]
    TooLarge { limit: u64 },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
    #[error("storage: {0}")]
    Storage(#[from] MediaStoreError),
}
