use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use crate::application::ports::{AudioExtractionError, AudioExtractor};

use super::wav_tools::{self, CANONICAL_SAMPLE_RATE};

/// Drives the system `ffmpeg`/`ffprobe` binaries. Splitting and WAV durations are done in-process.
pub struct FfmpegExtractor {
    ffmpeg: String,
    ffprobe: String,
    timeout: Duration,
}

impl FfmpegExtractor {
    pub fn new(ffmpeg: impl Into<String>, ffprobe: impl Into<String>, timeout: Duration) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
            timeout,
        }
    }

    /// True when `<ffmpeg> -version` runs successfully.
    pub async fn is_available(ffmpeg: &str) -> bool {
        let probe = Command::new(ffmpeg)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status();
        match tokio::time::timeout(Duration::from_secs(10), probe).await {
            Ok(Ok(status)) => status.success(),
            _ => false,
        }
    }

    async fn run(&self, program: &str, args: &[&str]) -> Result<Output, AudioExtractionError> {
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        match tokio::time::timeout(self.timeout, child).await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) => Err(AudioExtractionError::ToolFailed(format!(
                "failed to start {}: {}",
                program, e
            ))),
            Err(_) => Err(AudioExtractionError::ToolFailed(format!(
                "{} timed out after {}s",
                program,
                self.timeout.as_secs()
            ))),
        }
    }

    async fn probe_duration(&self, path: &Path) -> Option<f64> {
        let path_str = path.to_str()?;
        let output = self
            .run(
                &self.ffprobe,
                &[
                    "-v",
                    "error",
                    "-show_entries",
                    "format=duration",
                    "-of",
                    "default=noprint_wrappers=1:nokey=1",
                    path_str,
                ],
            )
            .await
            .ok()?;
        if !output.status.success() {
            return None;
        }
        parse_probe_duration(&String::from_utf8_lossy(&output.stdout))
    }
}

#[async_trait]
impl AudioExtractor for FfmpegExtractor {
    async fn extract(
        &self,
        video_path: &Path,
        audio_path: &Path,
    ) -> Result<(), AudioExtractionError> {
        check_input(video_path).await?;
        if let Some(parent) = audio_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let input = path_arg(video_path)?;
        let output = path_arg(audio_path)?;
        let sample_rate = CANONICAL_SAMPLE_RATE.to_string();
        let result = self
            .run(
                &self.ffmpeg,
                &[
                    "-hide_banner",
                    "-loglevel",
                    "error",
                    "-y",
                    "-i",
                    input,
                    "-map",
                    "0:a:0",
                    "-vn",
                    "-ac",
                    "1",
                    "-ar",
                    sample_rate.as_str(),
                    "-c:a",
                    "pcm_s16le",
                    "-f",
                    "wav",
                    output,
                ],
            )
            .await?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            if reports_missing_audio(&stderr) {
                return Err(AudioExtractionError::NoAudioStream(
                    video_path.display().to_string(),
                ));
            }
            return Err(AudioExtractionError::ToolFailed(format!(
                "ffmpeg exited with {}: {}",
                result.status,
                stderr.trim()
            )));
        }

        tracing::debug!(
            video = %video_path.display(),
            audio = %audio_path.display(),
            "Audio extracted with ffmpeg"
        );
        Ok(())
    }

    async fn has_audio(&self, video_path: &Path) -> bool {
        let Some(path_str) = video_path.to_str() else {
            return false;
        };
        match self
            .run(
                &self.ffprobe,
                &[
                    "-v",
                    "error",
                    "-select_streams",
                    "a",
                    "-show_entries",
                    "stream=index",
                    "-of",
                    "csv=p=0",
                    path_str,
                ],
            )
            .await
        {
            Ok(output) => {
                output.status.success()
                    && !String::from_utf8_lossy(&output.stdout).trim().is_empty()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Audio stream probe failed");
                false
            }
        }
    }

    async fn video_duration(&self, video_path: &Path) -> f64 {
        self.probe_duration(video_path).await.unwrap_or(0.0)
    }

    async fn audio_duration(&self, audio_path: &Path) -> f64 {
        let path = audio_path.to_path_buf();
        let measured = tokio::task::spawn_blocking(move || wav_tools::wav_duration(&path)).await;
        match measured {
            Ok(Ok(seconds)) => seconds,
            _ => self.probe_duration(audio_path).await.unwrap_or(0.0),
        }
    }

    async fn split(
        &self,
        audio_path: &Path,
        segment_seconds: f64,
    ) -> Result<Vec<PathBuf>, AudioExtractionError> {
        split_blocking(audio_path, segment_seconds).await
    }
}

pub(super) async fn check_input(video_path: &Path) -> Result<(), AudioExtractionError> {
    let meta = tokio::fs::metadata(video_path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            AudioExtractionError::InputMissing(video_path.display().to_string())
        } else {
            AudioExtractionError::Io(e)
        }
    })?;
    if meta.len() == 0 {
        return Err(AudioExtractionError::InputEmpty(
            video_path.display().to_string(),
        ));
    }
    Ok(())
}

pub(super) async fn split_blocking(
    audio_path: &Path,
    segment_seconds: f64,
) -> Result<Vec<PathBuf>, AudioExtractionError> {
    let path = audio_path.to_path_buf();
    tokio::task::spawn_blocking(move || wav_tools::split_wav(&path, segment_seconds))
        .await
        .map_err(|e| AudioExtractionError::ToolFailed(format!("split task: {}", e)))?
}

fn path_arg(path: &Path) -> Result<&str, AudioExtractionError> {
    path.to_str().ok_or_else(|| {
        AudioExtractionError::ToolFailed(format!("non UTF-8 path: {}", path.display()))
    })
}

fn reports_missing_audio(stderr: &str) -> bool {
    stderr.contains("matches no streams")
        || stderr.contains("does not contain any stream")
        || stderr.contains("Output file does not contain any stream")
}

fn parse_probe_duration(stdout: &str) -> Option<f64> {
    stdout
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .and_then(|l| l.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
}
