use std::time::Duration;

use config::Environment as EnvironmentSource;
use config::{Config, ConfigError, File};
use serde::Deserialize;

use crate::application::services::{PipelineConfig, UploadPolicy};
use crate::domain::StorageLayout;
use crate::infrastructure::media::MediaToolConfig;
use crate::infrastructure::stt::{ProviderConfig, TranscriptionProvider};

use super::Environment;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub logging: LoggingSettings,
    pub app: AppSettings,
}

impl Settings {
    /// `config/default.toml`, then `config/<environment>.toml`, then `SUBTITLER__*` variables.
    pub fn load(environment: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(
                File::with_name(&format!("config/{}", environment.as_str().to_lowercase()))
                    .required(false),
            )
            .add_source(
                EnvironmentSource::with_prefix("SUBTITLER")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DatabaseSettings {
    pub url: Option<String>,
    #[serde(alias = "max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: Option<String>,
    pub json: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AppSettings {
    #[serde(alias = "video_path")]
    pub video_path: String,
    #[serde(alias = "audio_path")]
    pub audio_path: String,
    #[serde(alias = "subtitle_path")]
    pub subtitle_path: String,
    #[serde(alias = "temp_path")]
    pub temp_path: String,
    #[serde(alias = "allowed_video_formats")]
    pub allowed_video_formats: String,
    #[serde(alias = "max_video_size")]
    pub max_video_size: u64,
    pub workers: usize,
    #[serde(alias = "queue_capacity")]
    pub queue_capacity: usize,
    #[serde(alias = "keep_extracted_audio")]
    pub keep_extracted_audio: bool,
    pub pipeline: PipelineSettings,
    pub media: MediaSettings,
    pub stt: SttSettings,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            video_path: "./data/videos".to_string(),
            audio_path: "./data/audio".to_string(),
            subtitle_path: "./data/subtitles".to_string(),
            temp_path: "./data/temp".to_string(),
            allowed_video_formats: "mp4,avi,mov,mkv,flv,wmv,webm".to_string(),
            max_video_size: 500 * 1024 * 1024,
            workers: 2,
            queue_capacity: 64,
            keep_extracted_audio: true,
            pipeline: PipelineSettings::default(),
            media: MediaSettings::default(),
            stt: SttSettings::default(),
        }
    }
}

impl AppSettings {
    pub fn layout(&self) -> StorageLayout {
        StorageLayout::new(
            &self.video_path,
            &self.audio_path,
            &self.subtitle_path,
            &self.temp_path,
        )
    }

    pub fn allowed_formats(&self) -> Vec<String> {
        self.allowed_video_formats
            .split(',')
            .map(|f| f.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|f| !f.is_empty())
            .collect()
    }

    pub fn upload_policy(&self) -> UploadPolicy {
        UploadPolicy {
            allowed_formats: self.allowed_formats(),
            max_size: self.max_video_size,
        }
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            layout: self.layout(),
            safety_margin: self.pipeline.safety_margin,
            extract_timeout: Duration::from_secs(self.pipeline.extract_timeout),
            transcribe_timeout: Duration::from_secs(self.pipeline.transcribe_timeout),
            storage_timeout: Duration::from_secs(self.pipeline.storage_timeout),
            keep_extracted_audio: self.keep_extracted_audio,
            default_language: self
                .stt
                .active()
                .language
                .clone()
                .filter(|l| !l.trim().is_empty()),
        }
    }

    pub fn media_config(&self) -> MediaToolConfig {
        MediaToolConfig {
            ffmpeg: self.media.ffmpeg.clone(),
            ffprobe: self.media.ffprobe.clone(),
            prefer_external: self.media.prefer_external,
            timeout: Duration::from_secs(self.media.timeout),
        }
    }
}

/// Stage deadlines, in seconds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PipelineSettings {
    #[serde(alias = "safety_margin")]
    pub safety_margin: f64,
    #[serde(alias = "extract_timeout")]
    pub extract_timeout: u64,
    #[serde(alias = "transcribe_timeout")]
    pub transcribe_timeout: u64,
    #[serde(alias = "storage_timeout")]
    pub storage_timeout: u64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            safety_margin: 5.0,
            extract_timeout: 600,
            transcribe_timeout: 180,
            storage_timeout: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct MediaSettings {
    pub ffmpeg: String,
    pub ffprobe: String,
    #[serde(alias = "prefer_external")]
    pub prefer_external: bool,
    /// Seconds per subprocess.
    pub timeout: u64,
}

impl Default for MediaSettings {
    fn default() -> Self {
        Self {
            ffmpeg: "ffmpeg".to_string(),
            ffprobe: "ffprobe".to_string(),
            prefer_external: true,
            timeout: 600,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SttSettings {
    pub provider: TranscriptionProvider,
    pub whisper: ProviderSettings,
    pub zhipu: ProviderSettings,
    pub azure: ProviderSettings,
}

impl Default for SttSettings {
    fn default() -> Self {
        Self {
            provider: TranscriptionProvider::Whisper,
            whisper: ProviderSettings::with_timeout(120_000),
            zhipu: ProviderSettings::with_timeout(60_000),
            azure: ProviderSettings::with_timeout(120_000),
        }
    }
}

impl SttSettings {
    pub fn active(&self) -> &ProviderSettings {
        match self.provider {
            TranscriptionProvider::Whisper => &self.whisper,
            TranscriptionProvider::Zhipu => &self.zhipu,
            TranscriptionProvider::Azure => &self.azure,
        }
    }
}

/// Per-provider credentials and defaults. `timeout` is in milliseconds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ProviderSettings {
    #[serde(alias = "api_key")]
    pub api_key: String,
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub language: Option<String>,
    pub timeout: u64,
    pub deployment: Option<String>,
    #[serde(alias = "api_version")]
    pub api_version: Option<String>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self::with_timeout(120_000)
    }
}

impl ProviderSettings {
    fn with_timeout(timeout: u64) -> Self {
        Self {
            api_key: String::new(),
            endpoint: None,
            model: None,
            language: None,
            timeout,
            deployment: None,
            api_version: None,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout)
    }

    pub fn to_provider_config(&self) -> ProviderConfig {
        fn non_blank(value: &Option<String>) -> Option<String> {
            value.clone().filter(|v| !v.trim().is_empty())
        }
        ProviderConfig {
            api_key: self.api_key.clone(),
            endpoint: non_blank(&self.endpoint),
            model: non_blank(&self.model),
            timeout: self.timeout(),
            deployment: non_blank(&self.deployment),
            api_version: non_blank(&self.api_version),
        }
    }
}
