use serde_json::Value;

use crate::application::ports::TranscriptionError;
use crate::domain::SubtitleSegment;

/// Normalizes a provider's JSON body into segments.
///
/// A `segments` array yields one segment per element (blank text dropped). A bare
/// `text` yields a single segment at `0..0` that the caller stretches. Anything else
/// yields nothing.
pub fn parse_transcription(body: &Value) -> Result<Vec<SubtitleSegment>, TranscriptionError> {
    if let Some(items) = body.get("segments").and_then(Value::as_array) {
        let mut segments = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            if let Some(segment) = parse_segment(i, item)? {
                segments.push(segment);
            }
        }
        return Ok(segments);
    }

    if let Some(text) = body.get("text").and_then(Value::as_str) {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Vec::new());
        }
        return Ok(vec![SubtitleSegment::new(0.0, 0.0, text)]);
    }

    Ok(Vec::new())
}

fn parse_segment(i: usize, item: &Value) -> Result<Option<SubtitleSegment>, TranscriptionError> {
    let text = item
        .get("text")
        .and_then(Value::as_str)
        .ok_or_else(|| missing(i, "text"))?;
    let start = item
        .get("start")
        .and_then(Value::as_f64)
        .ok_or_else(|| missing(i, "start"))?;
    let end = item
        .get("end")
        .and_then(Value::as_f64)
        .ok_or_else(|| missing(i, "end"))?;

    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    if end < start || start < 0.0 {
        tracing::warn!(segment = i, start, end, "Skipping segment with invalid times");
        return Ok(None);
    }

    let mut segment = SubtitleSegment::new(start, end, text);
    if let Some(confidence) = item.get("confidence").and_then(Value::as_f64) {
        segment = segment.with_confidence(confidence);
    }
    match item.get("speaker") {
        Some(Value::String(tag)) if !tag.trim().is_empty() => {
            segment = segment.with_speaker(tag.trim());
        }
        Some(Value::Number(tag)) => segment = segment.with_speaker(tag.to_string()),
        _ => {}
    }
    if let Some(alternatives) = item.get("alternatives").and_then(Value::as_array) {
        let alternatives: Vec<String> = alternatives
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect();
        if !alternatives.is_empty() {
            segment = segment.with_alternatives(alternatives);
        }
    }
    Ok(Some(segment))
}

fn missing(i: usize, field: &str) -> TranscriptionError {
    TranscriptionError::InvalidResponse(format!("segment {} is missing `{}`", i, field))
}
