use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::{
    AudioExtractionError, AudioExtractor, MediaStore, ProgressReporter, SubtitleRepository, TranscriptionEngine,
    VideoRepository,
};
use crate::domain::{
    LanguageHint, PROGRESS_EXTRACTING, PROGRESS_RENDERING, PROGRESS_SAVING,
    PROGRESS_TRANSCRIBING, StorageLayout, Subtitle, SubtitleFormat, SubtitleSegment, TaskId,
    VideoId, renumber, subtitle_format,
};

use super::PipelineError;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub layout: StorageLayout,
    pub safety_margin: f64,
    pub extract_timeout: Duration,
    pub transcribe_timeout: Duration,
    pub storage_timeout: Duration,
    pub keep_extracted_audio: bool,
    /// Used when the request leaves the language blank.
    pub default_language: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SubtitleRequest {
    pub task_id: TaskId,
    pub video_id: VideoId,
    pub language: String,
    pub format: SubtitleFormat,
}

/// Runs one video through extract, transcribe, save and render.
pub struct SubtitlePipeline {
    extractor: Arc<dyn AudioExtractor>,
    engine: Arc<dyn TranscriptionEngine>,
    videos: Arc<dyn VideoRepository>,
    subtitles: Arc<dyn SubtitleRepository>,
    store: Arc<dyn MediaStore>,
    config: PipelineConfig,
}

impl SubtitlePipeline {
    pub fn new(
        extractor: Arc<dyn AudioExtractor>,
        engine: Arc<dyn TranscriptionEngine>,
        videos: Arc<dyn VideoRepository>,
        subtitles: Arc<dyn SubtitleRepository>,
        store: Arc<dyn MediaStore>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            extractor,
            engine,
            videos,
            subtitles,
            store,
            config,
        }
    }

    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    pub async fn run(
        &self,
        request: &SubtitleRequest,
        progress: &dyn ProgressReporter,
    ) -> Result<Subtitle, PipelineError> {
        progress.report(PROGRESS_EXTRACTING, "extracting audio").await?;

        let video = self
            .videos
            .get_by_id(request.video_id)
            .await?
            .ok_or_else(|| PipelineError::NotFound(format!("video {}", request.video_id)))?;

        let language = resolve_language(&request.language, self.config.default_language.as_deref());
        let video_path = PathBuf::from(&video.file_path);
        let audio_path = self
            .config
            .layout
            .audio_file(&request.video_id, &request.task_id);

        let mut scratch = ScratchFiles::default();
        if !self.config.keep_extracted_audio {
            scratch.track(audio_path.clone());
        }

        let result = self
            .run_stages(request, progress, language, &video_path, &audio_path, &mut scratch)
            .await;
        scratch.remove_all().await;
        result
    }

    async fn run_stages(
        &self,
        request: &SubtitleRequest,
        progress: &dyn ProgressReporter,
        language: String,
        video_path: &Path,
        audio_path: &Path,
        scratch: &mut ScratchFiles,
    ) -> Result<Subtitle, PipelineError> {
        let hint = LanguageHint::parse(&language);

        let readable = tokio::fs::metadata(video_path)
            .await
            .map(|m| m.len() > 0)
            .unwrap_or(false);
        if readable && !self.extractor.has_audio(video_path).await {
            return Err(AudioExtractionError::NoAudioStream(video_path.display().to_string()).into());
        }

        tracing::debug!(video = %video_path.display(), audio = %audio_path.display(), "Extracting audio");
        within(
            "audio extraction",
            self.config.extract_timeout,
            self.extractor.extract(video_path, audio_path),
        )
        .await?;

        progress
            .report(PROGRESS_TRANSCRIBING, "speech recognition")
            .await?;
        let segments = self.transcribe(audio_path, &hint, scratch).await?;

        progress.report(PROGRESS_SAVING, "saving subtitle").await?;
        let mut subtitle =
            Subtitle::from_segments(request.video_id, language, request.format, &segments)?;
        within(
            "subtitle save",
            self.config.storage_timeout,
            self.subtitles.create(&subtitle),
        )
        .await?;
        tracing::debug!(subtitle_id = %subtitle.id, segments = segments.len(), "Subtitle saved");

        progress.report(PROGRESS_RENDERING, "rendering file").await?;
        match self.render(&subtitle, &segments).await {
            Ok(path) => subtitle.file_path = path,
            Err(e) => {
                if let Err(del_err) = self.subtitles.delete(subtitle.id).await {
                    tracing::warn!(
                        error = %del_err,
                        subtitle_id = %subtitle.id,
                        "Failed to remove subtitle row after render failure"
                    );
                }
                return Err(e);
            }
        }

        Ok(subtitle)
    }

    async fn transcribe(
        &self,
        audio_path: &Path,
        hint: &LanguageHint,
        scratch: &mut ScratchFiles,
    ) -> Result<Vec<SubtitleSegment>, PipelineError> {
        let total = self.extractor.audio_duration(audio_path).await;
        let limit = self.engine.limits().max_audio_seconds;

        let mut segments = match limit {
            Some(limit) if total > limit => {
                let chunk_len = chunk_seconds(limit, self.config.safety_margin);
                tracing::debug!(
                    total_seconds = total,
                    limit_seconds = limit,
                    chunk_seconds = chunk_len,
                    "Audio exceeds provider duration limit, splitting"
                );

                let chunks = within(
                    "audio split",
                    self.config.extract_timeout,
                    self.extractor.split(audio_path, chunk_len),
                )
                .await?;
                for chunk in &chunks {
                    if chunk != audio_path {
                        scratch.track(chunk.clone());
                    }
                }

                let mut stitched = Vec::new();
                let mut offset = 0.0;
                for (k, chunk) in chunks.iter().enumerate() {
                    let chunk_duration = self.extractor.audio_duration(chunk).await;
                    let returned = self.transcribe_one(chunk, hint).await?;
                    tracing::debug!(
                        chunk = k,
                        offset_seconds = offset,
                        segments = returned.len(),
                        "Chunk transcribed"
                    );
                    for mut segment in fit_to_chunk(returned, chunk_duration) {
                        segment.shift(offset);
                        stitched.push(segment);
                    }
                    offset += chunk_duration;
                }
                stitched
            }
            _ => {
                let returned = self.transcribe_one(audio_path, hint).await?;
                fit_to_chunk(returned, total)
            }
        };

        if segments.is_empty() {
            return Err(PipelineError::Transcription(
                "empty transcription".to_string(),
            ));
        }
        renumber(&mut segments);
        Ok(segments)
    }

    async fn transcribe_one(
        &self,
        audio_path: &Path,
        hint: &LanguageHint,
    ) -> Result<Vec<SubtitleSegment>, PipelineError> {
        within(
            "speech recognition",
            self.config.transcribe_timeout,
            self.engine.transcribe_file(audio_path, hint),
        )
        .await
    }

    async fn render(
        &self,
        subtitle: &Subtitle,
        segments: &[SubtitleSegment],
    ) -> Result<String, PipelineError> {
        let text = subtitle_format::render(subtitle.format, segments)?;
        let path = self
            .config
            .layout
            .subtitle_file(&subtitle.id, subtitle.format);

        within(
            "subtitle write",
            self.config.storage_timeout,
            self.store.write(&path, text.as_bytes()),
        )
        .await?;

        let file_path = path.to_string_lossy().into_owned();
        within(
            "subtitle update",
            self.config.storage_timeout,
            self.subtitles.update_file_path(subtitle.id, &file_path),
        )
        .await?;
        Ok(file_path)
    }
}

/// The request language as given; blank falls back to the configured default, then `auto`.
pub fn resolve_language(requested: &str, default: Option<&str>) -> String {
    [Some(requested), default]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("auto")
        .to_string()
}

/// Chunk length for a provider that accepts at most `limit` seconds.
pub fn chunk_seconds(limit: f64, safety_margin: f64) -> f64 {
    let margin = if limit >= 15.0 && safety_margin > 0.0 {
        safety_margin.min(limit / 2.0)
    } else {
        limit / 3.0
    };
    limit - margin
}

/// Drops blank or unplaceable segments and clamps times to `[0, chunk_duration]`.
///
/// Zero-length segments inside the chunk are stretched to its end. A non-positive
/// `chunk_duration` means the probe failed and only the lower bound applies.
pub fn fit_to_chunk(segments: Vec<SubtitleSegment>, chunk_duration: f64) -> Vec<SubtitleSegment> {
    segments
        .into_iter()
        .filter_map(|mut segment| {
            if segment.text.trim().is_empty()
                || !segment.start_time.is_finite()
                || !segment.end_time.is_finite()
            {
                return None;
            }

            let start = segment.start_time.max(0.0);
            let mut end = segment.end_time.max(0.0);
            if chunk_duration > 0.0 {
                if start >= chunk_duration {
                    return None;
                }
                if end <= start {
                    end = chunk_duration;
                }
                end = end.min(chunk_duration);
            } else if end < start {
                end = start;
            }

            segment.set_times(start, end);
            Some(segment)
        })
        .collect()
}

async fn within<T, E>(
    stage: &str,
    limit: Duration,
    fut: impl Future<Output = Result<T, E>>,
) -> Result<T, PipelineError>
where
    PipelineError: From<E>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result.map_err(PipelineError::from),
        Err(_) => Err(PipelineError::Timeout(format!(
            "{} exceeded {}s",
            stage,
            limit.as_secs()
        ))),
    }
}

/// Temporary files owned by one run, removed when the run ends on any path.
#[derive(Default)]
struct ScratchFiles {
    paths: Vec<PathBuf>,
}

impl ScratchFiles {
    fn track(&mut self, path: PathBuf) {
        self.paths.push(path);
    }

    /// Removes everything tracked so far. `Drop` only sees paths left after a cancelled run.
    async fn remove_all(&mut self) {
        for path in std::mem::take(&mut self.paths) {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => tracing::debug!(path = %path.display(), "Removed scratch file"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(error = %e, path = %path.display(), "Failed to remove scratch file")
                }
            }
        }
    }
}

impl Drop for ScratchFiles {
    fn drop(&mut self) {
        for path in &self.paths {
            match std::fs::remove_file(path) {
                Ok(()) => tracing::debug!(path = %path.display(), "Removed scratch file"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(error = %e, path = %path.display(), "Failed to remove scratch file")
                }
            }
        }
    }
}
