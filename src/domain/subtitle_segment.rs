use serde::{Deserialize, Serialize};

/// A single timed caption. Times are seconds from the start of the source video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubtitleSegment {
    pub index: usize,
    pub start_time: f64,
    pub end_time: f64,
    pub text: String,
    pub duration: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternatives: Option<Vec<String>>,
}

impl SubtitleSegment {
    pub fn new(start_time: f64, end_time: f64, text: impl Into<String>) -> Self {
        Self {
            index: 0,
            start_time,
            end_time,
            text: text.into(),
            duration: end_time - start_time,
            confidence: None,
            speaker: None,
            alternatives: None,
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence.clamp(0.0, 1.0));
        self
    }

    pub fn with_speaker(mut self, speaker: impl Into<String>) -> Self {
        self.speaker = Some(speaker.into());
        self
    }

    pub fn with_alternatives(mut self, alternatives: Vec<String>) -> Self {
        self.alternatives = Some(alternatives);
        self
    }

    pub fn set_times(&mut self, start_time: f64, end_time: f64) {
        self.start_time = start_time;
        self.end_time = end_time;
        self.duration = end_time - start_time;
    }

    pub fn shift(&mut self, offset: f64) {
        self.set_times(self.start_time + offset, self.end_time + offset);
    }

    pub fn is_valid(&self) -> bool {
        self.start_time.is_finite()
            && self.end_time.is_finite()
            && self.start_time >= 0.0
            && self.end_time >= self.start_time
            && !self.text.trim().is_empty()
    }
}

/// Sorts by start time (stable) and assigns 1-based indices.
pub fn renumber(segments: &mut [SubtitleSegment]) {
    segments.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
    for (i, segment) in segments.iter_mut().enumerate() {
        segment.index = i + 1;
    }
}

/// Rounded maximum end time, in whole seconds.
pub fn total_duration(segments: &[SubtitleSegment]) -> i32 {
    segments
        .iter()
        .map(|s| s.end_time.round() as i32)
        .max()
        .unwrap_or(0)
}
