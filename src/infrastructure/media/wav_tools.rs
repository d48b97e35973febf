use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::application::ports::AudioExtractionError;
use crate::domain::chunk_file;

pub const CANONICAL_SAMPLE_RATE: u32 = 16_000;

pub fn canonical_spec() -> WavSpec {
    WavSpec {
        channels: 1,
        sample_rate: CANONICAL_SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    }
}

/// Exact duration from the WAV header.
pub fn wav_duration(path: &Path) -> Result<f64, AudioExtractionError> {
    let reader = WavReader::open(path).map_err(|e| wav_error(path, e))?;
    let spec = reader.spec();
    if spec.sample_rate == 0 {
        return Err(AudioExtractionError::Decode(format!(
            "{}: zero sample rate",
            path.display()
        )));
    }
    Ok(reader.duration() as f64 / spec.sample_rate as f64)
}

/// Writes mono f32 samples in `[-1, 1]` as canonical s16le WAV.
pub fn write_canonical_wav(path: &Path, samples: &[f32]) -> Result<(), AudioExtractionError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = WavWriter::create(path, canonical_spec()).map_err(|e| wav_error(path, e))?;
    for &sample in samples {
        let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16;
        writer.write_sample(value).map_err(|e| wav_error(path, e))?;
    }
    writer.finalize().map_err(|e| wav_error(path, e))
}

/// Splits an integer-PCM WAV on frame boundaries into `<base>_part<k>.wav` files.
///
/// Chunk `k` holds frames `[k * n, (k + 1) * n)` where `n = round(segment_seconds * rate)`.
/// A source no longer than one chunk is returned unchanged.
pub fn split_wav(path: &Path, segment_seconds: f64) -> Result<Vec<PathBuf>, AudioExtractionError> {
    if !segment_seconds.is_finite() || segment_seconds <= 0.0 {
        return Err(AudioExtractionError::InvalidSegmentLength(segment_seconds));
    }

    let mut reader = WavReader::open(path).map_err(|e| wav_error(path, e))?;
    let spec = reader.spec();
    if spec.sample_format != SampleFormat::Int {
        return Err(AudioExtractionError::Decode(format!(
            "{}: only integer PCM can be split",
            path.display()
        )));
    }

    let total_frames = reader.duration() as u64;
    let frames_per_chunk = ((segment_seconds * spec.sample_rate as f64).round() as u64).max(1);
    if total_frames <= frames_per_chunk {
        return Ok(vec![path.to_path_buf()]);
    }

    let channels = spec.channels.max(1) as u64;
    let samples_per_chunk = frames_per_chunk * channels;
    let chunk_count = total_frames.div_ceil(frames_per_chunk) as usize;

    let mut chunks = Vec::with_capacity(chunk_count);
    let mut samples = reader.samples::<i32>();
    for index in 0..chunk_count {
        let chunk_path = chunk_file(path, index);
        let mut writer = WavWriter::create(&chunk_path, spec).map_err(|e| wav_error(&chunk_path, e))?;
        for sample in samples.by_ref().take(samples_per_chunk as usize) {
            let sample = sample.map_err(|e| wav_error(path, e))?;
            writer
                .write_sample(sample)
                .map_err(|e| wav_error(&chunk_path, e))?;
        }
        writer.finalize().map_err(|e| wav_error(&chunk_path, e))?;
        chunks.push(chunk_path);
    }

    tracing::debug!(
        source = %path.display(),
        chunks = chunks.len(),
        segment_seconds,
        "Audio split into chunks"
    );
    Ok(chunks)
}

fn wav_error(path: &Path, err: hound::Error) -> AudioExtractionError {
    match err {
        hound::Error::IoError(e) if e.kind() == std::io::ErrorKind::NotFound => {
            AudioExtractionError::InputMissing(path.display().to_string())
        }
        hound::Error::IoError(e) => AudioExtractionError::Io(e),
        other => AudioExtractionError::Decode(format!("{}: {}", path.display(), other)),
    }
}
