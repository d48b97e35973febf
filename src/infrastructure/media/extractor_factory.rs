use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::AudioExtractor;

use super::ffmpeg_extractor::FfmpegExtractor;
use super::symphonia_extractor::SymphoniaExtractor;

#[derive(Debug, Clone)]
pub struct MediaToolConfig {
    pub ffmpeg: String,
    pub ffprobe: String,
    pub prefer_external: bool,
    pub timeout: Duration,
}

pub struct AudioExtractorFactory;

impl AudioExtractorFactory {
    /// The `ffmpeg` extractor when preferred and installed, otherwise the in-process one.
    pub async fn create(config: &MediaToolConfig) -> Arc<dyn AudioExtractor> {
        if config.prefer_external {
            if FfmpegExtractor::is_available(&config.ffmpeg).await {
                tracing::info!(ffmpeg = %config.ffmpeg, "Using ffmpeg for audio extraction");
                return Arc::new(FfmpegExtractor::new(
                    config.ffmpeg.clone(),
                    config.ffprobe.clone(),
                    config.timeout,
                ));
            }
            tracing::warn!(
                ffmpeg = %config.ffmpeg,
                "ffmpeg not found, falling back to in-process decoding"
            );
        }
        Arc::new(SymphoniaExtractor::new())
    }
}
