mod azure_whisper_engine;
mod multipart_client;
mod openai_whisper_engine;
mod response_parser;
mod transcription_engine_factory;
mod zhipu_asr_engine;

pub use azure_whisper_engine::AzureWhisperEngine;
pub use multipart_client::{DEFAULT_MAX_AUDIO_BYTES, MultipartTranscriber, ProviderAuth};
pub use openai_whisper_engine::{
    OpenAiWhisperEngine, WHISPER_DEFAULT_ENDPOINT, WHISPER_DEFAULT_MODEL,
};
pub use response_parser::parse_transcription;
pub use transcription_engine_factory::{
    ProviderConfig, TranscriptionEngineFactory, TranscriptionProvider,
};
pub use zhipu_asr_engine::{
    ZHIPU_DEFAULT_ENDPOINT, ZHIPU_DEFAULT_MODEL, ZHIPU_MAX_AUDIO_SECONDS, ZhipuAsrEngine,
};
