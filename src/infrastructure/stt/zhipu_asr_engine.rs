use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use crate::application::ports::{ProviderLimits, TranscriptionEngine, TranscriptionError};
use crate::domain::{LanguageHint, SubtitleSegment};

use super::multipart_client::{MultipartTranscriber, ProviderAuth};
use super::response_parser::parse_transcription;

pub const ZHIPU_DEFAULT_ENDPOINT: &str =
    "https://open.bigmodel.cn/api/paas/v4/audio/transcriptions";
pub const ZHIPU_DEFAULT_MODEL: &str = "glm-asr";

/// Accepts at most 30 s of audio per call.
pub const ZHIPU_MAX_AUDIO_SECONDS: f64 = 30.0;

/// Zhipu GLM-ASR. Longer audio must be chunked by the caller.
pub struct ZhipuAsrEngine {
    inner: MultipartTranscriber,
}

impl ZhipuAsrEngine {
    pub fn new(
        api_key: String,
        endpoint: Option<String>,
        model: Option<String>,
        timeout: Duration,
    ) -> Result<Self, TranscriptionError> {
        let endpoint = endpoint.unwrap_or_else(|| ZHIPU_DEFAULT_ENDPOINT.to_string());
        let inner = MultipartTranscriber::new(endpoint, ProviderAuth::Bearer(api_key), timeout)?
            .with_model(model.unwrap_or_else(|| ZHIPU_DEFAULT_MODEL.to_string()));
        Ok(Self { inner })
    }
}

#[async_trait]
impl TranscriptionEngine for ZhipuAsrEngine {
    fn name(&self) -> &'static str {
        "zhipu"
    }

    fn limits(&self) -> ProviderLimits {
        ProviderLimits {
            max_audio_bytes: Some(self.inner.max_audio_bytes()),
            max_audio_seconds: Some(ZHIPU_MAX_AUDIO_SECONDS),
        }
    }

    async fn transcribe_file(
        &self,
        audio_path: &Path,
        language: &LanguageHint,
    ) -> Result<Vec<SubtitleSegment>, TranscriptionError> {
        let body = self
            .inner
            .send(self.name(), audio_path, language.provider_code())
            .await?;
        let segments = parse_transcription(&body)?;

        tracing::info!(segments = segments.len(), "Zhipu GLM-ASR transcription completed");
        Ok(segments)
    }
}
