//! Display helpers for remaining time and progress

/// Format milliseconds as `HH:MM:SS`.
///
/// Fields are derived by integer division and zero-padded to two digits;
/// hours are not capped, so a full day renders as `24:00:00`.
pub fn display_time(ms: u64) -> String {
    if ms == 0 {
        return "00:00:00".to_string();
    }
    let h = ms / 1000 / 3600;
    let m = ms / 1000 % 3600 / 60;
    let s = ms / 1000 % 60;
    format!("{:02}:{:02}:{:02}", h, m, s)
}

/// Fraction of the configured duration that has elapsed, in `[0.0, 1.0]`
pub fn progress_fraction(remaining_ms: u64, duration_ms: u64) -> f64 {
    if duration_ms == 0 {
        return 1.0;
    }
    let remaining = remaining_ms.min(duration_ms) as f64;
    1.0 - remaining / duration_ms as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_zero_padded_fields() {
        assert_eq!(display_time(0), "00:00:00");
        assert_eq!(display_time(999), "00:00:00");
        assert_eq!(display_time(61_000), "00:01:01");
        assert_eq!(display_time(3_661_000), "01:01:01");
        assert_eq!(display_time(86_400_000), "24:00:00");
    }

    #[test]
    fn truncates_partial_seconds() {
        assert_eq!(display_time(59_999), "00:00:59");
    }

    #[test]
    fn progress_covers_whole_range() {
        assert_eq!(progress_fraction(60_000, 60_000), 0.0);
        assert_eq!(progress_fraction(30_000, 60_000), 0.5);
        assert_eq!(progress_fraction(0, 60_000), 1.0);
        assert_eq!(progress_fraction(90_000, 60_000), 0.0);
    }
}
