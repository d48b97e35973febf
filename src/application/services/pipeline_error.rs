use crate::application::ports::{
    AudioExtractionError, MediaStoreError, RepositoryError, TranscriptionError,
};
use crate::domain::subtitle_format::SubtitleFormatError;

/// Failure of a pipeline run. The `Display` text becomes the task's error message.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("invalid input: {0}")]
    InputInvalid(String),
    #[error("media error: {0}")]
    Media(String),
    #[error("provider size limit: {0}")]
    ProviderSizeLimit(String),
    #[error("transcription error: {0}")]
    Transcription(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("timeout: {0}")]
    Timeout(String),
}

impl PipelineError {
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::InputInvalid(_) => "input_invalid",
            PipelineError::Media(_) => "media_error",
            PipelineError::ProviderSizeLimit(_) => "provider_size_limit",
            PipelineError::Transcription(_) => "transcription_error",
            PipelineError::Storage(_) => "storage_error",
            PipelineError::NotFound(_) => "not_found",
            PipelineError::Timeout(_) => "timeout",
        }
    }
}

impl From<AudioExtractionError> for PipelineError {
    fn from(err: AudioExtractionError) -> Self {
        match err {
            AudioExtractionError::InputMissing(_) | AudioExtractionError::InputEmpty(_) => {
                PipelineError::InputInvalid(err.to_string())
            }
            _ => PipelineError::Media(err.to_string()),
        }
    }
}

impl From<TranscriptionError> for PipelineError {
    fn from(err: TranscriptionError) -> Self {
        match err {
            TranscriptionError::SizeLimitExceeded { .. } => {
                PipelineError::ProviderSizeLimit(err.to_string())
            }
            TranscriptionError::Timeout(_) => PipelineError::Timeout(err.to_string()),
            _ => PipelineError::Transcription(err.to_string()),
        }
    }
}

impl From<RepositoryError> for PipelineError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(_) => PipelineError::NotFound(err.to_string()),
            _ => PipelineError::Storage(err.to_string()),
        }
    }
}

impl From<MediaStoreError> for PipelineError {
    fn from(err: MediaStoreError) -> Self {
        match err {
            MediaStoreError::NotFound(_) => PipelineError::NotFound(err.to_string()),
            MediaStoreError::TooLarge { .. } => PipelineError::InputInvalid(err.to_string()),
            _ => PipelineError::Storage(err.to_string()),
        }
    }
}

impl From<SubtitleFormatError> for PipelineError {
    fn from(err: SubtitleFormatError) -> Self {
        PipelineError::Storage(format!("render failed: {}", err))
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::Storage(format!("segment serialization failed: {}", err))
    }
}
