use std::io;
use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use tokio::sync::mpsc;

use crate::domain::{LanguageHint, SubtitleSegment};

/// Limits a provider declares. `None` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ProviderLimits {
    pub max_audio_bytes: Option<u64>,
    pub max_audio_seconds: Option<f64>,
}

#[async_trait]
pub trait TranscriptionEngine: Send + Sync {
    fn name(&self) -> &'static str;

    fn limits(&self) -> ProviderLimits;

    /// Segment times are relative to the start of `audio_path`.
    async fn transcribe_file(
        &self,
        audio_path: &Path,
        language: &LanguageHint,
    ) -> Result<Vec<SubtitleSegment>, TranscriptionError>;

    async fn transcribe_stream(
        &self,
        _audio: BoxStream<'_, Result<Bytes, io::Error>>,
        _language: &LanguageHint,
        _sink: mpsc::Sender<SubtitleSegment>,
    ) -> Result<(), TranscriptionError> {
        Err(TranscriptionError::Unsupported(format!(
            "{} does not support streaming transcription",
            self.name()
        )))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TranscriptionError {
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("audio is {size} bytes, provider limit is {limit}")]
    SizeLimitExceeded { size: u64, limit: u64 },
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("provider misconfigured: {0}")]
    Configuration(String),
    #[error("unsupported: {0}")]
    Unsupported(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
