use std::path::{Path, PathBuf};

use super::{SubtitleFormat, SubtitleId, TaskId, VideoId};

/// On-disk roots for uploaded videos, extracted audio and rendered subtitles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLayout {
    video_dir: PathBuf,
    audio_dir: PathBuf,
    subtitle_dir: PathBuf,
    temp_dir: PathBuf,
}

impl StorageLayout {
    pub fn new(
        video_dir: impl Into<PathBuf>,
        audio_dir: impl Into<PathBuf>,
        subtitle_dir: impl Into<PathBuf>,
        temp_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            video_dir: video_dir.into(),
            audio_dir: audio_dir.into(),
            subtitle_dir: subtitle_dir.into(),
            temp_dir: temp_dir.into(),
        }
    }

    /// `<video_dir>/<uuid>.<ext>`
    pub fn video_file(&self, stored_name: &uuid::Uuid, extension: &str) -> PathBuf {
        self.video_dir.join(format!("{}.{}", stored_name, extension))
    }

    /// `<audio_dir>/<video_id>_<task_id>.wav`, unique per run.
    pub fn audio_file(&self, video_id: &VideoId, task_id: &TaskId) -> PathBuf {
        self.audio_dir
            .join(format!("{}_{}.wav", video_id, task_id.as_uuid().simple()))
    }

    /// `<subtitle_dir>/<subtitle_id>.<srt|vtt>`
    pub fn subtitle_file(&self, subtitle_id: &SubtitleId, format: SubtitleFormat) -> PathBuf {
        self.subtitle_dir
            .join(format!("{}.{}", subtitle_id, format.extension()))
    }

    pub fn video_dir(&self) -> &Path {
        &self.video_dir
    }

    pub fn audio_dir(&self) -> &Path {
        &self.audio_dir
    }

    pub fn subtitle_dir(&self) -> &Path {
        &self.subtitle_dir
    }

    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }
}

/// `<dir>/<base>_part<k>.wav` for the k-th (0-based) chunk of `source`.
pub fn chunk_file(source: &Path, index: usize) -> PathBuf {
    let base = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("audio");
    let dir = source.parent().unwrap_or_else(|| Path::new("."));
    dir.join(format!("{}_part{}.wav", base, index))
}
