use std::time::{Duration, Instant};

pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

/// Seconds at microsecond precision, without trailing zeros (`5`, `2.5`, `0.125`).
/// Rounding only strips float noise such as `3 * 0.1 == 0.30000000000000004`.
pub fn format_timestamp(secs: f64) -> String {
    let rounded = (secs * 1_000_000.0).round() / 1_000_000.0;
    format!("{}", rounded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0.0), "0");
        assert_eq!(format_timestamp(5.0), "5");
        assert_eq!(format_timestamp(2.5), "2.5");
        assert_eq!(format_timestamp(1.0 / 3.0), "0.333333");
        assert_eq!(format_timestamp(0.1 * 3.0), "0.3");
        assert_eq!(format_timestamp(0.125), "0.125");
        assert_eq!(format_timestamp(7.0 * 0.015), "0.105");
    }

    #[test]
    fn test_format_timestamp_keeps_fine_intervals_distinct() {
        let stamps: Vec<String> = (0..200).map(|k| format_timestamp(k as f64 * 0.01)).collect();
        let parsed: Vec<f64> = stamps.iter().map(|s| s.parse().unwrap()).collect();
        assert!(parsed.windows(2).all(|w| w[0] < w[1]), "{:?}", stamps);
    }
}
