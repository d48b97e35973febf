use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use crate::application::ports::{ProviderLimits, TranscriptionEngine, TranscriptionError};
use crate::domain::{LanguageHint, SubtitleSegment};

use super::multipart_client::{MultipartTranscriber, ProviderAuth};
use super::response_parser::parse_transcription;

pub const WHISPER_DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/audio/transcriptions";
pub const WHISPER_DEFAULT_MODEL: &str = "whisper-1";

/// OpenAI Whisper over `verbose_json`. No duration limit, 25 MiB upload limit.
pub struct OpenAiWhisperEngine {
    inner: MultipartTranscriber,
}

impl OpenAiWhisperEngine {
    pub fn new(
        api_key: String,
        endpoint: Option<String>,
        model: Option<String>,
        timeout: Duration,
    ) -> Result<Self, TranscriptionError> {
        let endpoint = endpoint.unwrap_or_else(|| WHISPER_DEFAULT_ENDPOINT.to_string());
        let inner = MultipartTranscriber::new(endpoint, ProviderAuth::Bearer(api_key), timeout)?
            .with_model(model.unwrap_or_else(|| WHISPER_DEFAULT_MODEL.to_string()))
            .with_field("response_format", "verbose_json");
        Ok(Self { inner })
    }
}

#[async_trait]
impl TranscriptionEngine for OpenAiWhisperEngine {
    fn name(&self) -> &'static str {
        "whisper"
    }

    fn limits(&self) -> ProviderLimits {
        ProviderLimits {
            max_audio_bytes: Some(self.inner.max_audio_bytes()),
            max_audio_seconds: None,
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

        tracing::info!(
            segments = segments.len(),
            "OpenAI Whisper transcription completed"
        );
        Ok(segments)
    }
}
