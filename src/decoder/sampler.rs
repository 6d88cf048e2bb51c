use super::frame_data::{EncodedImage, Frame};
use crate::error::PipelineResult;

/// Absorbs float noise such as `0.3 / 0.1 == 2.9999999999999996`.
const BOUNDARY_EPSILON: f64 = 1e-9;

/// Anything that can report a duration and hand back a still at a given offset.
pub trait FrameSource {
    fn duration_secs(&self) -> f64;
    fn grab_at(&mut self, timestamp: f64) -> PipelineResult<EncodedImage>;
}

/// Number of boundaries `k * interval` that fit in `[0, duration]`.
pub fn sample_count(duration: f64, interval: f64) -> u64 {
    if !duration.is_finite() || duration < 0.0 || !interval.is_finite() || interval <= 0.0 {
        return 0;
    }
    let steps = (duration / interval + BOUNDARY_EPSILON).floor();
    if steps >= u64::MAX as f64 {
        return u64::MAX;
    }
    (steps as u64).saturating_add(1)
}

/// The k-th boundary. Multiplied, never accumulated, so no drift on long videos.
pub fn timestamp_at(index: u64, interval: f64) -> f64 {
    index as f64 * interval
}

/// Lazy walk over the interval boundaries of one source.
///
/// Each item is either a frame or the per-frame `MediaRead` error for that boundary; the
/// sampler keeps going after a failed boundary. Dropping the sampler drops the source.
pub struct FrameSampler<S: FrameSource> {
    source: S,
    interval: f64,
    next_index: u64,
    total: u64,
}

impl<S: FrameSource> FrameSampler<S> {
    pub fn new(source: S, interval: f64) -> Self {
        let total = sample_count(source.duration_secs(), interval);
        Self {
            source,
            interval,
            next_index: 0,
            total,
        }
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn remaining(&self) -> u64 {
        self.total - self.next_index
    }
}

impl<S: FrameSource> Iterator for FrameSampler<S> {
    type Item = PipelineResult<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_index >= self.total {
            return None;
        }
        let timestamp = timestamp_at(self.next_index, self.interval);
        self.next_index += 1;

        Some(
            self.source
                .grab_at(timestamp)
                .map(|image| Frame::new(timestamp, image)),
        )
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.remaining() as usize;
        (left, Some(left))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::PipelineError;

    /// In-memory video: every grab succeeds unless its timestamp is listed as broken.
    pub(crate) struct SyntheticSource {
        pub duration: f64,
        pub broken: Vec<f64>,
        pub grabbed: Vec<f64>,
    }

    impl SyntheticSource {
        pub(crate) fn new(duration: f64) -> Self {
            Self { duration, broken: Vec::new(), grabbed: Vec::new() }
        }

        pub(crate) fn with_broken(duration: f64, broken: Vec<f64>) -> Self {
            Self { duration, broken, grabbed: Vec::new() }
        }
    }

    impl FrameSource for SyntheticSource {
        fn duration_secs(&self) -> f64 {
            self.duration
        }

        fn grab_at(&mut self, timestamp: f64) -> PipelineResult<EncodedImage> {
            self.grabbed.push(timestamp);
            if self.broken.iter().any(|b| (b - timestamp).abs() < 1e-9) {
                return Err(PipelineError::MediaRead {
                    timestamp,
                    reason: "synthetic decode failure".to_string(),
                });
            }
            let marker = (timestamp * 10.0) as u8;
            Ok(EncodedImage::new(vec![0xFF, 0xD8, marker, 0xFF, 0xD9], 64, 48))
        }
    }

    fn timestamps(duration: f64, interval: f64) -> Vec<f64> {
        FrameSampler::new(SyntheticSource::new(duration), interval)
            .map(|f| f.unwrap().timestamp)
            .collect()
    }

    #[test]
    fn test_twelve_seconds_every_five() {
        assert_eq!(timestamps(12.0, 5.0), vec![0.0, 5.0, 10.0]);
    }

    #[test]
    fn test_boundary_equal_to_duration_is_included() {
        assert_eq!(timestamps(10.0, 5.0), vec![0.0, 5.0, 10.0]);
    }

    #[test]
    fn test_interval_longer_than_video_yields_single_frame() {
        assert_eq!(timestamps(3.2, 5.0), vec![0.0]);
    }

    #[test]
    fn test_count_matches_floor_plus_one() {
        for (duration, interval) in [(12.0, 5.0), (59.9, 2.5), (0.3, 0.1), (7.0, 7.0), (100.0, 0.75)] {
            let ts = timestamps(duration, interval);
            let expected = (duration / interval + BOUNDARY_EPSILON).floor() as usize + 1;
            assert_eq!(ts.len(), expected, "duration={} interval={}", duration, interval);

            for (k, t) in ts.iter().enumerate() {
                assert_eq!(*t, k as f64 * interval);
                assert!(*t <= duration + BOUNDARY_EPSILON * interval);
            }
            assert!(ts.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_degenerate_inputs_sample_nothing() {
        assert_eq!(sample_count(-1.0, 5.0), 0);
        assert_eq!(sample_count(f64::NAN, 5.0), 0);
        assert_eq!(sample_count(10.0, 0.0), 0);
        assert_eq!(sample_count(10.0, -2.0), 0);
    }

    #[test]
    fn test_tiny_interval_saturates_instead_of_overflowing() {
        assert_eq!(sample_count(12.0, 1e-300), u64::MAX);
        assert_eq!(sample_count(f64::MAX, f64::MIN_POSITIVE), u64::MAX);
        assert_eq!(sample_count(12.0, 0.01), 1201);
    }

    #[test]
    fn test_broken_frame_is_reported_and_sampling_continues() {
        let source = SyntheticSource::with_broken(12.0, vec![5.0]);
        let results: Vec<_> = FrameSampler::new(source, 5.0).collect();

        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(matches!(
            results[1],
            Err(PipelineError::MediaRead { timestamp, .. }) if timestamp == 5.0
        ));
        assert_eq!(results[2].as_ref().unwrap().timestamp, 10.0);
    }

    #[test]
    fn test_sampler_is_lazy() {
        let mut sampler = FrameSampler::new(SyntheticSource::new(20.0), 5.0);
        assert_eq!(sampler.total(), 5);
        assert!(sampler.source.grabbed.is_empty());

        sampler.next();
        sampler.next();
        assert_eq!(sampler.source.grabbed, vec![0.0, 5.0]);
        assert_eq!(sampler.remaining(), 3);
        assert_eq!(sampler.size_hint(), (3, Some(3)));
    }
}
