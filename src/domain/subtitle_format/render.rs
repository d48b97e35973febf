use std::borrow::Cow;
use std::fmt::Write;

use super::SubtitleFormatError;
use super::timestamp::format_timestamp;
use crate::domain::{SubtitleFormat, SubtitleSegment};

pub fn render(
    format: SubtitleFormat,
    segments: &[SubtitleSegment],
) -> Result<String, SubtitleFormatError> {
    match format {
        SubtitleFormat::Srt => render_srt(segments),
        SubtitleFormat::Vtt => render_vtt(segments),
    }
}

pub fn render_srt(segments: &[SubtitleSegment]) -> Result<String, SubtitleFormatError> {
    let mut out = String::new();
    write_cues(&mut out, segments, ',')?;
    Ok(out)
}

/// `WEBVTT` header, then SRT-shaped cues with `.` as the millisecond separator.
pub fn render_vtt(segments: &[SubtitleSegment]) -> Result<String, SubtitleFormatError> {
    let mut out = String::from("WEBVTT\n\n");
    write_cues(&mut out, segments, '.')?;
    Ok(out)
}

fn write_cues(
    out: &mut String,
    segments: &[SubtitleSegment],
    separator: char,
) -> Result<(), SubtitleFormatError> {
    for (i, segment) in segments.iter().enumerate() {
        let number = i + 1;
        if segment.end_time < segment.start_time {
            return Err(SubtitleFormatError::InvertedRange {
                index: number,
                start: segment.start_time,
                end: segment.end_time,
            });
        }
        let start = format_timestamp(segment.start_time, separator).ok_or(
            SubtitleFormatError::InvalidTime {
                index: number,
                value: segment.start_time,
            },
        )?;
        let end = format_timestamp(segment.end_time, separator).ok_or(
            SubtitleFormatError::InvalidTime {
                index: number,
                value: segment.end_time,
            },
        )?;

        // Writing into a String cannot fail.
        let _ = write!(
            out,
            "{}\n{} --> {}\n{}\n\n",
            number,
            start,
            end,
            normalize_line_breaks(&segment.text)
        );
    }
    Ok(())
}

/// Cue text lines are always separated by a bare `\n`.
fn normalize_line_breaks(text: &str) -> Cow<'_, str> {
    if text.contains('\r') {
        Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(text)
    }
}
