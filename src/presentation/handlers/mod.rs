pub mod api_response;
mod health;
mod subtitles;
mod videos;

pub use api_response::{ApiError, ApiResponse};
pub use health::health_handler;
pub use subtitles::{
    ExportQuery, GenerateSubtitleRequest, delete_subtitle_handler, export_subtitle_handler,
    generate_subtitle_handler, get_subtitle_handler, list_video_subtitles_handler,
    task_status_handler,
};
pub use videos::{
    ANONYMOUS_OWNER, USER_ID_HEADER, delete_video_handler, get_video_handler,
    list_videos_handler, upload_video_handler, validate_video_handler,
};
