mod language;
mod storage_layout;
mod subtitle;
pub mod subtitle_format;
mod subtitle_id;
mod subtitle_segment;
mod task_id;
mod task_record;
mod task_status;
mod video;
mod video_id;

pub use language::{LanguageHint, normalize_language_code};
pub use storage_layout::{StorageLayout, chunk_file};
pub use subtitle::{SUBTITLE_STATUS_COMPLETED, Subtitle, SubtitleFormat};
pub use subtitle_id::SubtitleId;
pub use subtitle_segment::{SubtitleSegment, renumber, total_duration};
pub use task_id::TaskId;
pub use task_record::{
    PROGRESS_DONE, PROGRESS_EXTRACTING, PROGRESS_RENDERING, PROGRESS_SAVING, PROGRESS_STARTING,
    PROGRESS_TRANSCRIBING, SUBTITLE_GENERATE_TASK, TaskRecord,
};
pub use task_status::TaskStatus;
pub use video::{VIDEO_STATUS_UPLOADED, Video, extension_of, stem_of};
pub use video_id::VideoId;
