use std::io;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use futures::StreamExt;
use futures::stream::BoxStream;
use tokio::io::AsyncWriteExt;

use crate::application::ports::{MediaStore, MediaStoreError};
use crate::domain::StorageLayout;

/// `MediaStore` over the local filesystem.
pub struct LocalMediaStore;

impl LocalMediaStore {
    /// Creates every root directory of `layout`.
    pub fn new(layout: &StorageLayout) -> Result<Self, MediaStoreError> {
        for dir in [
            layout.video_dir(),
            layout.audio_dir(),
            layout.subtitle_dir(),
            layout.temp_dir(),
        ] {
            std::fs::create_dir_all(dir).map_err(MediaStoreError::Io)?;
        }
        Ok(Self)
    }
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".part");
    path.with_file_name(name)
}

fn not_found_or_io(path: &Path, err: io::Error) -> MediaStoreError {
    if err.kind() == io::ErrorKind::NotFound {
        MediaStoreError::NotFound(path.display().to_string())
    } else {
        MediaStoreError::Io(err)
    }
}

async fn create_parent(path: &Path) -> Result<(), MediaStoreError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    Ok(())
}

#[async_trait::async_trait]
impl MediaStore for LocalMediaStore {
    async fn store_stream(
        &self,
        path: &Path,
        mut stream: BoxStream<'_, Result<Bytes, io::Error>>,
        max_bytes: Option<u64>,
    ) -> Result<u64, MediaStoreError> {
        create_parent(path).await?;
        let partial = partial_path(path);
        let mut file = tokio::fs::File::create(&partial).await?;

        let mut total_bytes: u64 = 0;
        let outcome: Result<(), MediaStoreError> = async {
            while let Some(chunk) = stream.next().await {
                let bytes = chunk?;
                total_bytes += bytes.len() as u64;
                if let Some(limit) = max_bytes {
                    if total_bytes > limit {
                        return Err(MediaStoreError::TooLarge { limit });
                    }
                }
                file.write_all(&bytes)
                    .await
                    .map_err(|e| MediaStoreError::WriteFailed(e.to_string()))?;
            }
            file.flush()
                .await
                .map_err(|e| MediaStoreError::WriteFailed(e.to_string()))?;
            Ok(())
        }
        .await;
        drop(file);

        if let Err(e) = outcome {
            if let Err(cleanup) = tokio::fs::remove_file(&partial).await {
                tracing::warn!(error = %cleanup, path = %partial.display(), "Failed to remove partial upload");
            }
            return Err(e);
        }

        tokio::fs::rename(&partial, path)
            .await
            .map_err(|e| MediaStoreError::WriteFailed(e.to_string()))?;
        tracing::debug!(path = %path.display(), bytes = total_bytes, "File stored");
        Ok(total_bytes)
    }

    async fn write(&self, path: &Path, data: &[u8]) -> Result<(), MediaStoreError> {
        create_parent(path).await?;
        let partial = partial_path(path);
        tokio::fs::write(&partial, data)
            .await
            .map_err(|e| MediaStoreError::WriteFailed(e.to_string()))?;
        tokio::fs::rename(&partial, path)
            .await
            .map_err(|e| MediaStoreError::WriteFailed(e.to_string()))
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>, MediaStoreError> {
        tokio::fs::read(path)
            .await
            .map_err(|e| not_found_or_io(path, e))
    }

    async fn delete(&self, path: &Path) -> Result<(), MediaStoreError> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(MediaStoreError::DeleteFailed(format!(
                "{}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn size(&self, path: &Path) -> Result<u64, MediaStoreError> {
        tokio::fs::metadata(path)
            .await
            .map(|m| m.len())
            .map_err(|e| not_found_or_io(path, e))
    }
}
