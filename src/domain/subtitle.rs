use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::subtitle_segment::total_duration;
use super::{SubtitleId, SubtitleSegment, VideoId};

pub const SUBTITLE_STATUS_COMPLETED: i16 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SubtitleFormat {
    Srt,
    Vtt,
}

impl SubtitleFormat {
    /// Unrecognized tags fall back to SRT.
    pub fn parse_or_default(tag: &str) -> Self {
        Self::parse(tag).unwrap_or(SubtitleFormat::Srt)
    }

    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "srt" => Some(SubtitleFormat::Srt),
            "vtt" | "webvtt" => Some(SubtitleFormat::Vtt),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SubtitleFormat::Srt => "SRT",
            SubtitleFormat::Vtt => "VTT",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            SubtitleFormat::Srt => "srt",
            SubtitleFormat::Vtt => "vtt",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            SubtitleFormat::Srt => "application/x-subrip; charset=utf-8",
            SubtitleFormat::Vtt => "text/vtt; charset=utf-8",
        }
    }
}

impl fmt::Display for SubtitleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A completed transcription. `content` holds the JSON segment list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subtitle {
    pub id: SubtitleId,
    pub video_id: VideoId,
    pub language: String,
    pub format: SubtitleFormat,
    pub segment_count: i32,
    pub duration: i32,
    pub content: String,
    pub file_path: String,
    pub status: i16,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subtitle {
    pub fn from_segments(
        video_id: VideoId,
        language: String,
        format: SubtitleFormat,
        segments: &[SubtitleSegment],
    ) -> Result<Self, serde_json::Error> {
        let now = Utc::now();
        Ok(Self {
            id: SubtitleId::new(),
            video_id,
            language,
            format,
            segment_count: segments.len() as i32,
            duration: total_duration(segments),
            content: serde_json::to_string(segments)?,
            file_path: String::new(),
            status: SUBTITLE_STATUS_COMPLETED,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn segments(&self) -> Result<Vec<SubtitleSegment>, serde_json::Error> {
        serde_json::from_str(&self.content)
    }

    pub fn has_file(&self) -> bool {
        !self.file_path.trim().is_empty()
    }
}
