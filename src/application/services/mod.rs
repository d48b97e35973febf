mod pipeline_error;
mod subtitle_pipeline;
mod subtitle_service;
mod subtitle_worker;
mod video_service;

pub use pipeline_error::PipelineError;
pub use subtitle_pipeline::{
    PipelineConfig, SubtitlePipeline, SubtitleRequest, chunk_seconds, fit_to_chunk,
};
pub use subtitle_service::{SubtitleExport, SubtitleService, SubtitleServiceError};
pub use subtitle_worker::{SubtitleWorkerPool, TaskProgress};
pub use video_service::{
    DEFAULT_VIDEO_LANGUAGE, UploadPolicy, VideoService, VideoServiceError, VideoUpload,
};
