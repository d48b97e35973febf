use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::VideoId;

pub const VIDEO_STATUS_UPLOADED: i16 = 1;

/// An uploaded source video. Read-only once stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: VideoId,
    pub owner_id: String,
    pub title: String,
    pub file_name: String,
    pub file_path: String,
    pub file_size: i64,
    pub format: String,
    pub language: String,
    pub duration: String,
    pub status: i16,
    pub progress: i16,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Video {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: VideoId,
        owner_id: String,
        title: String,
        file_name: String,
        file_path: String,
        file_size: i64,
        language: String,
        duration_secs: f64,
    ) -> Self {
        let now = Utc::now();
        let format = extension_of(&file_name).unwrap_or_default();
        Self {
            id,
            owner_id,
            title,
            file_name,
            file_path,
            file_size,
            format,
            language,
            duration: format!("{:.2}", duration_secs.max(0.0)),
            status: VIDEO_STATUS_UPLOADED,
            progress: 100,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration.parse().unwrap_or(0.0)
    }
}

/// Lowercased file extension without the dot.
pub fn extension_of(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(|e| e.to_ascii_lowercase())
}

/// File name without its extension, used as the default title.
pub fn stem_of(file_name: &str) -> String {
    Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name)
        .to_string()
}
