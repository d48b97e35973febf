use super::timestamp::parse_timestamp;
use crate::domain::SubtitleSegment;

/// Parses SRT (or VTT) text into segments.
///
/// Blocks are separated by blank lines. A block is an optional index line, a
/// `start --> end` timing line and one or more text lines. Malformed blocks are
/// logged and skipped.
pub fn parse(text: &str) -> Vec<SubtitleSegment> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut segments = Vec::new();

    for (block_no, block) in blocks(text).into_iter().enumerate() {
        match parse_block(&block) {
            BlockOutcome::Cue(segment) => segments.push(segment),
            BlockOutcome::Metadata => {}
            BlockOutcome::Malformed(reason) => {
                tracing::warn!(block = block_no + 1, reason, "Skipping malformed subtitle block");
            }
        }
    }

    for (i, segment) in segments.iter_mut().enumerate() {
        if segment.index == 0 {
            segment.index = i + 1;
        }
    }
    segments
}

enum BlockOutcome {
    Cue(SubtitleSegment),
    Metadata,
    Malformed(&'static str),
}

fn blocks(text: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();

    for line in text.lines() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

fn parse_block(lines: &[&str]) -> BlockOutcome {
    let first = lines[0].trim();
    if first.starts_with("WEBVTT") || first.starts_with("NOTE") || first.starts_with("STYLE") {
        return BlockOutcome::Metadata;
    }

    let (index, timing_at) = if first.contains("-->") {
        (0, 0)
    } else {
        match lines.get(1) {
            Some(line) if line.contains("-->") => (first.parse::<usize>().unwrap_or(0), 1),
            _ => return BlockOutcome::Malformed("missing timing line"),
        }
    };

    let Some((start, end)) = parse_timing(lines[timing_at]) else {
        return BlockOutcome::Malformed("unparseable timing line");
    };
    if end < start {
        return BlockOutcome::Malformed("end before start");
    }

    let text_lines = &lines[timing_at + 1..];
    if text_lines.is_empty() {
        return BlockOutcome::Malformed("missing text");
    }

    let mut segment = SubtitleSegment::new(start, end, text_lines.join("\n").replace('\r', "\n"));
    segment.index = index;
    BlockOutcome::Cue(segment)
}

fn parse_timing(line: &str) -> Option<(f64, f64)> {
    let (start, rest) = line.split_once("-->")?;
    // VTT cue settings may follow the end timestamp.
    let end = rest.split_whitespace().next()?;
    Some((parse_timestamp(start)?, parse_timestamp(end)?))
}
