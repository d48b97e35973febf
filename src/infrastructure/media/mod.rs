mod extractor_factory;
mod ffmpeg_extractor;
mod symphonia_extractor;
pub mod wav_tools;

pub use extractor_factory::{AudioExtractorFactory, MediaToolConfig};
pub use ffmpeg_extractor::FfmpegExtractor;
pub use symphonia_extractor::SymphoniaExtractor;
