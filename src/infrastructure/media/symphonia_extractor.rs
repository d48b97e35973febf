use std::fs::File;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::application::ports::{AudioExtractionError, AudioExtractor};

use super::ffmpeg_extractor::{check_input, split_blocking};
use super::wav_tools::{self, CANONICAL_SAMPLE_RATE};

/// In-process fallback used when no `ffmpeg` binary is installed.
///
/// Handles the containers and codecs symphonia ships with (WAV, MP4/AAC, MKV, MP3,
/// FLAC, OGG/Vorbis).
#[derive(Debug, Default)]
pub struct SymphoniaExtractor;

impl SymphoniaExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AudioExtractor for SymphoniaExtractor {
    async fn extract(
        &self,
        video_path: &Path,
        audio_path: &Path,
    ) -> Result<(), AudioExtractionError> {
        check_input(video_path).await?;

        let input = video_path.to_path_buf();
        let output = audio_path.to_path_buf();
        tokio::task::spawn_blocking(move || {
            let samples = decode_to_canonical_pcm(&input)?;
            wav_tools::write_canonical_wav(&output, &samples)
        })
        .await
        .map_err(|e| AudioExtractionError::Decode(format!("decode task: {}", e)))??;

        tracing::debug!(
            video = %video_path.display(),
            audio = %audio_path.display(),
            "Audio extracted in-process"
        );
        Ok(())
    }

    async fn has_audio(&self, video_path: &Path) -> bool {
        let path = video_path.to_path_buf();
        tokio::task::spawn_blocking(move || {
            open_format(&path)
                .map(|format| audio_track(format.as_ref()).is_some())
                .unwrap_or(false)
        })
        .await
        .unwrap_or(false)
    }

    async fn video_duration(&self, video_path: &Path) -> f64 {
        let path = video_path.to_path_buf();
        tokio::task::spawn_blocking(move || track_duration(&path).unwrap_or(0.0))
            .await
            .unwrap_or(0.0)
    }

    async fn audio_duration(&self, audio_path: &Path) -> f64 {
        let path = audio_path.to_path_buf();
        tokio::task::spawn_blocking(move || {
            wav_tools::wav_duration(&path)
                .ok()
                .or_else(|| track_duration(&path))
                .unwrap_or(0.0)
        })
        .await
        .unwrap_or(0.0)
    }

    async fn split(
        &self,
        audio_path: &Path,
        segment_seconds: f64,
    ) -> Result<Vec<PathBuf>, AudioExtractionError> {
        split_blocking(audio_path, segment_seconds).await
    }
}

fn open_format(path: &Path) -> Result<Box<dyn FormatReader>, AudioExtractionError> {
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| AudioExtractionError::Decode(format!("probe: {}", e)))?;
    Ok(probed.format)
}

/// First track that decodes to audio samples.
fn audio_track(format: &dyn FormatReader) -> Option<&symphonia::core::formats::Track> {
    format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL && t.codec_params.sample_rate.is_some())
}

fn track_duration(path: &Path) -> Option<f64> {
    let format = open_format(path).ok()?;
    let track = audio_track(format.as_ref())?;
    let frames = track.codec_params.n_frames?;
    let rate = track.codec_params.sample_rate?;
    Some(frames as f64 / rate as f64)
}

fn decode_to_canonical_pcm(path: &Path) -> Result<Vec<f32>, AudioExtractionError> {
    let mut format = open_format(path)?;
    let track = audio_track(format.as_ref())
        .ok_or_else(|| AudioExtractionError::NoAudioStream(path.display().to_string()))?;

    let track_id = track.id;
    let codec_params = track.codec_params.clone();
    let source_rate = codec_params
        .sample_rate
        .ok_or_else(|| AudioExtractionError::Decode("unknown sample rate".to_string()))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| AudioExtractionError::Decode(format!("codec: {}", e)))?;

    let mut mono: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(symphonia::core::errors::Error::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => {
                return Err(AudioExtractionError::Decode(format!("packet: {}", e)));
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(symphonia::core::errors::Error::DecodeError(e)) => {
                tracing::warn!(error = %e, "Skipping corrupt audio frame");
                continue;
            }
            Err(e) => {
                return Err(AudioExtractionError::Decode(format!("decode: {}", e)));
            }
        };

        let spec = *decoded.spec();
        let frames = decoded.frames();
        if frames == 0 {
            continue;
        }
        let channels = spec.channels.count().max(1);

        let mut sample_buf = SampleBuffer::<f32>::new(frames as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);
        for frame in sample_buf.samples().chunks(channels) {
            mono.push(frame.iter().sum::<f32>() / channels as f32);
        }
    }

    if mono.is_empty() {
        return Err(AudioExtractionError::NoAudioStream(format!(
            "{}: no audio samples decoded",
            path.display()
        )));
    }

    if source_rate != CANONICAL_SAMPLE_RATE {
        mono = resample(&mono, source_rate, CANONICAL_SAMPLE_RATE)?;
    }

    tracing::debug!(
        samples = mono.len(),
        duration_secs = mono.len() as f32 / CANONICAL_SAMPLE_RATE as f32,
        "Audio decoded to 16kHz mono PCM"
    );
    Ok(mono)
}

fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>, AudioExtractionError> {
    use rubato::{
        Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
    };

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let ratio = to_rate as f64 / from_rate as f64;
    let chunk_size = 1024;

    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, chunk_size, 1)
        .map_err(|e| AudioExtractionError::Decode(format!("resampler init: {}", e)))?;

    let mut output = Vec::with_capacity((samples.len() as f64 * ratio) as usize + chunk_size);
    for chunk in samples.chunks(chunk_size) {
        let mut input = chunk.to_vec();
        input.resize(chunk_size, 0.0);

        let result = resampler
            .process(&[input], None)
            .map_err(|e| AudioExtractionError::Decode(format!("resample: {}", e)))?;
        if let Some(channel) = result.first() {
            output.extend_from_slice(channel);
        }
    }

    output.truncate((samples.len() as f64 * ratio) as usize);
    Ok(output)
}
