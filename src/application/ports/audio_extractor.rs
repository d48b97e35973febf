use std::path::{Path, PathBuf};

use async_trait::async_trait;

/// Turns media files into canonical mono 16 kHz s16le WAV and answers probe questions.
#[async_trait]
pub trait AudioExtractor: Send + Sync {
    /// Writes `audio_path`, replacing any previous output and creating parent directories.
    async fn extract(&self, video_path: &Path, audio_path: &Path)
    -> Result<(), AudioExtractionError>;

    async fn has_audio(&self, video_path: &Path) -> bool;

    /// Seconds, or 0 when the probe fails.
    async fn video_duration(&self, video_path: &Path) -> f64;

    /// Seconds, or 0 when the probe fails.
    async fn audio_duration(&self, audio_path: &Path) -> f64;

    /// Cuts `audio_path` into contiguous `<base>_part<k>.wav` chunks of `segment_seconds`.
    ///
    /// Returns `[audio_path]` unchanged when the source is not longer than one chunk.
    async fn split(
        &self,
        audio_path: &Path,
        segment_seconds: f64,
    ) -> Result<Vec<PathBuf>, AudioExtractionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AudioExtractionError {
    #[error("input file not found: {0}")]
    InputMissing(String),
    #[error("input file is empty: {0}")]
    InputEmpty(String),
    #[error("no audio stream in {0}")]
    NoAudioStream(String),
    #[error("media tool failed: {0}")]
    ToolFailed(String),
    #[error("audio decoding failed: {0}")]
    Decode(String),
    #[error("invalid chunk length: {0}")]
    InvalidSegmentLength(f64),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
