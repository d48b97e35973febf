use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use crate::application::ports::{ProviderLimits, TranscriptionEngine, TranscriptionError};
use crate::domain::{LanguageHint, SubtitleSegment};

use super::multipart_client::{MultipartTranscriber, ProviderAuth};
use super::response_parser::parse_transcription;

pub const AZURE_DEFAULT_API_VERSION: &str = "2024-06-01";

/// Whisper deployed on Azure OpenAI. Authenticates with an `api-key` header.
pub struct AzureWhisperEngine {
    inner: MultipartTranscriber,
}

impl AzureWhisperEngine {
    pub fn new(
        base_url: &str,
        deployment: &str,
        api_key: &str,
        api_version: &str,
        model: Option<String>,
        timeout: Duration,
    ) -> Result<Self, TranscriptionError> {
        let endpoint = format!(
            "{}/openai/deployments/{}/audio/transcriptions?api-version={}",
            base_url.trim_end_matches('/'),
            deployment,
            api_version,
        );
        let auth = ProviderAuth::Header {
            name: "api-key",
            value: api_key.to_string(),
        };
        let inner = MultipartTranscriber::new(endpoint, auth, timeout)?
            .with_model(model.unwrap_or_default())
            .with_field("response_format", "verbose_json");
        Ok(Self { inner })
    }

    pub fn endpoint(&self) -> &str {
        self.inner.endpoint()
    }
}

#[async_trait]
impl TranscriptionEngine for AzureWhisperEngine {
    fn name(&self) -> &'static str {
        "azure"
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
            "Azure OpenAI Whisper transcription completed"
        );
        Ok(segments)
    }
}
