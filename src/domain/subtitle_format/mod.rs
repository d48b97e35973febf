mod parse;
mod render;
mod timestamp;

pub use parse::parse;
pub use render::{render, render_srt, render_vtt};
pub use timestamp::{format_timestamp, parse_timestamp};

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SubtitleFormatError {
    #[error("segment {index}: invalid time {value}")]
    InvalidTime { index: usize, value: f64 },
    #[error("segment {index}: end {end} is before start {start}")]
    InvertedRange { index: usize, start: f64, end: f64 },
}
