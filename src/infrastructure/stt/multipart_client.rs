use std::path::Path;
use std::time::Duration;

use reqwest::multipart;

use crate::application::ports::TranscriptionError;

pub const DEFAULT_MAX_AUDIO_BYTES: u64 = 25 * 1024 * 1024;

#[derive(Debug, Clone)]
pub enum ProviderAuth {
    Bearer(String),
    Header { name: &'static str, value: String },
}

/// Uploads a WAV file as `multipart/form-data` and returns the JSON body.
pub struct MultipartTranscriber {
    client: reqwest::Client,
    endpoint: String,
    auth: ProviderAuth,
    model: Option<String>,
    extra_fields: Vec<(&'static str, String)>,
    max_audio_bytes: u64,
}

impl MultipartTranscriber {
    pub fn new(
        endpoint: String,
        auth: ProviderAuth,
        timeout: Duration,
    ) -> Result<Self, TranscriptionError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TranscriptionError::ApiRequestFailed(format!("client: {}", e)))?;
        Ok(Self {
            client,
            endpoint,
            auth,
            model: None,
            extra_fields: Vec::new(),
            max_audio_bytes: DEFAULT_MAX_AUDIO_BYTES,
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        let model = model.into();
        self.model = (!model.trim().is_empty()).then_some(model);
        self
    }

    pub fn with_field(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.extra_fields.push((name, value.into()));
        self
    }

    pub fn with_max_audio_bytes(mut self, max_audio_bytes: u64) -> Self {
        self.max_audio_bytes = max_audio_bytes;
        self
    }

    pub fn max_audio_bytes(&self) -> u64 {
        self.max_audio_bytes
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn send(
        &self,
        provider: &'static str,
        audio_path: &Path,
        language: Option<String>,
    ) -> Result<serde_json::Value, TranscriptionError> {
        let size = tokio::fs::metadata(audio_path).await?.len();
        if size > self.max_audio_bytes {
            return Err(TranscriptionError::SizeLimitExceeded {
                size,
                limit: self.max_audio_bytes,
            });
        }

        let audio = tokio::fs::read(audio_path).await?;
        let file_name = audio_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio.wav")
            .to_string();
        let file_part = multipart::Part::bytes(audio)
            .file_name(file_name)
            .mime_str("audio/wav")
            .map_err(|e| TranscriptionError::ApiRequestFailed(format!("mime: {}", e)))?;

        let mut form = multipart::Form::new().part("file", file_part);
        if let Some(model) = &self.model {
            form = form.text("model", model.clone());
        }
        if let Some(language) = &language {
            form = form.text("language", language.clone());
        }
        for (name, value) in &self.extra_fields {
            form = form.text(*name, value.clone());
        }

        tracing::debug!(
            provider,
            endpoint = %self.endpoint,
            bytes = size,
            language = language.as_deref().unwrap_or("auto"),
            "Sending audio for transcription"
        );

        let request = self.client.post(&self.endpoint).multipart(form);
        let request = match &self.auth {
            ProviderAuth::Bearer(token) => request.bearer_auth(token),
            ProviderAuth::Header { name, value } => request.header(*name, value),
        };

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                TranscriptionError::Timeout(format!("{}: {}", provider, e))
            } else {
                TranscriptionError::ApiRequestFailed(format!("request: {}", e))
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(TranscriptionError::ApiRequestFailed(format!(
                "status {}: {}",
                status, body
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| TranscriptionError::ApiRequestFailed(format!("body: {}", e)))?;
        serde_json::from_str(&body)
            .map_err(|e| TranscriptionError::InvalidResponse(format!("parse response: {}", e)))
    }
}
