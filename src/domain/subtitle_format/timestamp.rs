/// Absorbs binary representation error (`5.1 * 1000 = 5099.999…`) before truncating.
const MILLIS_EPSILON: f64 = 1e-6;

/// Formats seconds as `HH:MM:SS<sep>mmm`, truncating to whole milliseconds.
///
/// Hours are not wrapped at 24. Returns `None` for negative or non-finite input.
pub fn format_timestamp(seconds: f64, separator: char) -> Option<String> {
    if !seconds.is_finite() || seconds < 0.0 {
        return None;
    }

    let total_ms = (seconds * 1000.0 + MILLIS_EPSILON).floor() as u64;
    let ms = total_ms % 1000;
    let total_secs = total_ms / 1000;
    let secs = total_secs % 60;
    let total_mins = total_secs / 60;
    let mins = total_mins % 60;
    let hours = total_mins / 60;

    Some(format!(
        "{:02}:{:02}:{:02}{}{:03}",
        hours, mins, secs, separator, ms
    ))
}

/// Parses `HH:MM:SS,mmm`, `HH:MM:SS.mmm` or `MM:SS.mmm` into seconds.
pub fn parse_timestamp(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    let (clock, fraction) = match raw.rfind([',', '.']) {
        Some(pos) => (&raw[..pos], &raw[pos + 1..]),
        None => (raw, ""),
    };

    let parts: Vec<&str> = clock.split(':').collect();
    let (hours, mins, secs) = match parts.as_slice() {
        [h, m, s] => (parse_field(h)?, parse_field(m)?, parse_field(s)?),
        [m, s] => (0, parse_field(m)?, parse_field(s)?),
        _ => return None,
    };
    if mins >= 60 || secs >= 60 {
        return None;
    }

    let millis = if fraction.is_empty() {
        0.0
    } else {
        if fraction.len() > 3 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let value: u32 = fraction.parse().ok()?;
        value as f64 * 10f64.powi(3 - fraction.len() as i32)
    };

    Some((hours * 3600 + mins * 60 + secs) as f64 + millis / 1000.0)
}

fn parse_field(field: &str) -> Option<u64> {
    let field = field.trim();
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}
