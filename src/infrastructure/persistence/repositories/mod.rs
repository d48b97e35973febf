mod in_memory_repository;
mod pg_subtitle_repository;
mod pg_task_repository;
mod pg_video_repository;

pub use in_memory_repository::{
    InMemorySubtitleRepository, InMemoryTaskRepository, InMemoryVideoRepository,
};
pub use pg_subtitle_repository::PgSubtitleRepository;
pub use pg_task_repository::PgTaskRepository;
pub use pg_video_repository::PgVideoRepository;
