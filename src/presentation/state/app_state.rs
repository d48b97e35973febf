use std::sync::Arc;

use crate::application::services::{SubtitleService, VideoService};

#[derive(Clone)]
pub struct AppState {
    pub subtitle_service: Arc<SubtitleService>,
    pub video_service: Arc<VideoService>,
}

impl AppState {
    pub fn new(subtitle_service: Arc<SubtitleService>, video_service: Arc<VideoService>) -> Self {
        Self {
            subtitle_service,
            video_service,
        }
    }
}
