mod audio_extractor;
mod media_store;
mod progress_reporter;
mod repository_error;
mod subtitle_repository;
mod task_repository;
mod transcription_engine;
mod video_repository;

pub use audio_extractor::{AudioExtractionError, AudioExtractor};
pub use media_store::{MediaStore, MediaStoreError};
pub use progress_reporter::ProgressReporter;
pub use repository_error::RepositoryError;
pub use subtitle_repository::SubtitleRepository;
pub use task_repository::TaskRepository;
pub use transcription_engine::{ProviderLimits, TranscriptionEngine, TranscriptionError};
pub use video_repository::VideoRepository;
