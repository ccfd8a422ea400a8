//! `HH:MM:SS,mmm` timestamp rendering and parsing.

/// Round seconds to whole milliseconds. Negative and non-finite inputs clamp to 0.
fn to_millis(seconds: f64) -> u64 {
    if !seconds.is_finite() || seconds <= 0.0 {
        return 0;
    }
    (seconds * 1000.0).round() as u64
}

fn split_millis(ms: u64) -> (u64, u64, u64, u64) {
    let hours = ms / 3_600_000;
    let mins = (ms % 3_600_000) / 60_000;
    let secs = (ms % 60_000) / 1_000;
    let millis = ms % 1_000;
    (hours, mins, secs, millis)
}

/// Render seconds as an SRT timestamp. Hours grow past two digits instead of saturating.
pub fn format_srt_time(seconds: f64) -> String {
    let (hours, mins, secs, millis) = split_millis(to_millis(seconds));
    format!("{:02}:{:02}:{:02},{:03}", hours, mins, secs, millis)
}

/// Render seconds as a WebVTT timestamp (`.` before the milliseconds).
pub fn format_vtt_time(seconds: f64) -> String {
    let (hours, mins, secs, millis) = split_millis(to_millis(seconds));
    format!("{:02}:{:02}:{:02}.{:03}", hours, mins, secs, millis)
}

/// Parse `HH:MM:SS,mmm` (or `HH:MM:SS.mmm`) back into seconds.
/// Returns `None` for anything that is not a well-formed timestamp.
pub fn parse_timestamp(value: &str) -> Option<f64> {
    let value = value.trim();
    let (clock, fraction) = match value.rsplit_once([',', '.']) {
        Some((clock, fraction)) => (clock, fraction),
        None => (value, "0"),
    };

    let mut parts = clock.split(':');
    let hours: u64 = parts.next()?.trim().parse().ok()?;
    let mins: u64 = parts.next()?.trim().parse().ok()?;
    let secs: u64 = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() || mins >= 60 || secs >= 60 {
        return None;
    }

    if fraction.is_empty() || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    // "5" means 500ms, "05" means 50ms; digits past the third are dropped.
    let mut digits: String = fraction.chars().take(3).collect();
    while digits.len() < 3 {
        digits.push('0');
    }
    let millis: u64 = digits.parse().ok()?;

    let total_ms = ((hours * 60 + mins) * 60 + secs) * 1000 + millis;
    Some(total_ms as f64 / 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_zero_padded_fields() {
        assert_eq!(format_srt_time(0.0), "00:00:00,000");
        assert_eq!(format_srt_time(5.0), "00:00:05,000");
        assert_eq!(format_srt_time(3723.045), "01:02:03,045");
        assert_eq!(format_vtt_time(3723.045), "01:02:03.045");
    }

    #[test]
    fn rounding_carries_into_seconds() {
        assert_eq!(format_srt_time(0.9996), "00:00:01,000");
        assert_eq!(format_srt_time(59.9999), "00:01:00,000");
    }

    #[test]
    fn ten_hours_and_beyond() {
        assert_eq!(format_srt_time(35_999.999), "09:59:59,999");
        assert_eq!(format_srt_time(360_000.0), "100:00:00,000");
    }

    #[test]
    fn negative_and_nan_clamp_to_zero() {
        assert_eq!(format_srt_time(-1.5), "00:00:00,000");
        assert_eq!(format_srt_time(f64::NAN), "00:00:00,000");
    }

    #[test]
    fn parse_accepts_comma_and_dot() {
        assert_eq!(parse_timestamp("00:00:02,727"), Some(2.727));
        assert_eq!(parse_timestamp("01:02:03.045"), Some(3723.045));
        assert_eq!(parse_timestamp("00:00:01,5"), Some(1.5));
        assert_eq!(parse_timestamp("00:00:07"), Some(7.0));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("not a time"), None);
        assert_eq!(parse_timestamp("00:61:00,000"), None);
        assert_eq!(parse_timestamp("00:00:00,abc"), None);
        assert_eq!(parse_timestamp("1:2:3:4,000"), None);
    }

    #[test]
    fn render_then_parse_stays_within_a_millisecond() {
        for &secs in &[0.0, 0.0004, 1.2345, 2.727_272_7, 59.999, 3600.5, 35_999.999] {
            let parsed = parse_timestamp(&format_srt_time(secs)).unwrap();
            assert!((parsed - secs).abs() <= 0.001, "{} -> {}", secs, parsed);
        }
    }
}
