use std::io;
use std::path::Path;

use bytes::Bytes;
use futures::stream::BoxStream;

/// Local file access for videos, audio and rendered subtitles.
#[async_trait::async_trait]
pub trait MediaStore: Send + Sync {
    /// Streams into `path`, aborting and removing the partial file past `max_bytes`.
    async fn store_stream(
        &self,
        path: &Path,
        stream: BoxStream<'_, Result<Bytes, io::Error>>,
        max_bytes: Option<u64>,
    ) -> Result<u64, MediaStoreError>;

    /// Creates parent directories as needed. Writes raw bytes without a BOM.
    async fn write(&self, path: &Path, data: &[u8]) -> Result<(), MediaStoreError>;

    async fn read(&self, path: &Path) -> Result<Vec<u8>, MediaStoreError>;

    /// Missing files are not an error.
    async fn delete(&self, path: &Path) -> Result<(), MediaStoreError>;

    async fn size(&self, path: &Path) -> Result<u64, MediaStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum MediaStoreError {
    #[error("file not found: {0}")]
    NotFound(String),
    #[error("file exceeds {limit} bytes")]
    TooLarge { limit: u64 },
    #[error("write failed: {0}")]
    WriteFailed(String),
    #[error("delete failed: {0}")]
    DeleteFailed(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
