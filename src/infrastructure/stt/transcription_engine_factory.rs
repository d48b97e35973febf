use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::application::ports::{TranscriptionEngine, TranscriptionError};

use super::azure_whisper_engine::{AZURE_DEFAULT_API_VERSION, AzureWhisperEngine};
use super::openai_whisper_engine::OpenAiWhisperEngine;
use super::zhipu_asr_engine::ZhipuAsrEngine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptionProvider {
    Whisper,
    Zhipu,
    Azure,
}

impl TranscriptionProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            TranscriptionProvider::Whisper => "whisper",
            TranscriptionProvider::Zhipu => "zhipu",
            TranscriptionProvider::Azure => "azure",
        }
    }
}

impl FromStr for TranscriptionProvider {
    type Err = TranscriptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "whisper" | "openai" => Ok(TranscriptionProvider::Whisper),
            "zhipu" => Ok(TranscriptionProvider::Zhipu),
            "azure" => Ok(TranscriptionProvider::Azure),
            other => Err(TranscriptionError::Configuration(format!(
                "unknown stt provider: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for TranscriptionProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Credentials and defaults for the active provider.
#[derive(Debug, Clone, Default)]
pub struct ProviderConfig {
    pub api_key: String,
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub timeout: Duration,
    pub deployment: Option<String>,
    pub api_version: Option<String>,
}

pub struct TranscriptionEngineFactory;

impl TranscriptionEngineFactory {
    pub fn create(
        provider: TranscriptionProvider,
        config: ProviderConfig,
    ) -> Result<Arc<dyn TranscriptionEngine>, TranscriptionError> {
        if config.api_key.trim().is_empty() {
            return Err(TranscriptionError::Configuration(format!(
                "API key required for {}",
                provider
            )));
        }

        match provider {
            TranscriptionProvider::Whisper => {
                let engine = OpenAiWhisperEngine::new(
                    config.api_key,
                    config.endpoint,
                    config.model,
                    config.timeout,
                )?;
                Ok(Arc::new(engine))
            }
            TranscriptionProvider::Zhipu => {
                let engine = ZhipuAsrEngine::new(
                    config.api_key,
                    config.endpoint,
                    config.model,
                    config.timeout,
                )?;
                Ok(Arc::new(engine))
            }
            TranscriptionProvider::Azure => {
                let base_url = config.endpoint.ok_or_else(|| {
                    TranscriptionError::Configuration("Azure endpoint required".to_string())
                })?;
                let deployment = config.deployment.ok_or_else(|| {
                    TranscriptionError::Configuration("Azure deployment required".to_string())
                })?;
                let api_version = config
                    .api_version
                    .unwrap_or_else(|| AZURE_DEFAULT_API_VERSION.to_string());
                let engine = AzureWhisperEngine::new(
                    &base_url,
                    &deployment,
                    &config.api_key,
                    &api_version,
                    config.model,
                    config.timeout,
                )?;
                Ok(Arc::new(engine))
            }
        }
    }
}
