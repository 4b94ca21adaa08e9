//! Moving-average frame rate estimation

use ring_buffer::TimestampWindow;
use tracing::{debug, trace};

/// Frame rate reported before a measurement is available
pub const FPS_UNKNOWN: f64 = -1.0;

/// Frames-per-second estimate over a bounded window of arrival timestamps
#[derive(Debug, Clone)]
pub struct FrameRateEstimator {
    window: TimestampWindow,
    frames_per_second: f64,
}

impl FrameRateEstimator {
    /// Create an estimator with the given window bound (at least 2)
    pub fn new(window: usize) -> Self {
        Self {
            window: TimestampWindow::new(window),
            frames_per_second: FPS_UNKNOWN,
        }
    }

    /// Record a frame arrival and return the updated estimate.
    ///
    /// The estimate is `window length / window span`. A span of zero or less
    /// (first frame, repeated timestamps, clock stepping back) keeps the
    /// previous value.
    pub fn record_frame(&mut self, timestamp_ms: i64) -> f64 {
        self.window.push(timestamp_ms);

        match self.window.span_ms() {
            Some(span) if span > 0 => {
                self.frames_per_second = 1000.0 * self.window.len() as f64 / span as f64;
                trace!(
                    "FPS {:.2} over {} frames ({} ms)",
                    self.frames_per_second,
                    self.window.len(),
                    span
                );
            }
            span => {
                debug!("Window span {:?} ms, keeping FPS {}", span, self.frames_per_second);
            }
        }

        self.frames_per_second
    }

    /// Last computed estimate, or `FPS_UNKNOWN`
    pub fn frames_per_second(&self) -> f64 {
        self.frames_per_second
    }

    /// Current timestamp window
    pub fn window(&self) -> &TimestampWindow {
        &self.window
    }

    /// Forget all timestamps and the last estimate
    pub fn reset(&mut self) {
        self.window.clear();
        self.frames_per_second = FPS_UNKNOWN;
    }
}

impl Default for FrameRateEstimator {
    fn default() -> Self {
        Self::new(ring_buffer::DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_first_frame_keeps_sentinel() {
        let mut estimator = FrameRateEstimator::default();

        let fps = estimator.record_frame(1_000);
        assert_eq!(fps, FPS_UNKNOWN);
        assert!(fps.is_finite());
    }

    #[test]
    fn test_steady_rate() {
        let mut estimator = FrameRateEstimator::default();

        estimator.record_frame(0);
        // Two frames over 100 ms
        assert!((estimator.record_frame(100) - 20.0).abs() < 1e-9);

        for i in 2..20 {
            estimator.record_frame(i * 100);
        }
        // Window holds 7 frames spanning 600 ms
        assert_eq!(estimator.window().len(), 7);
        assert!((estimator.frames_per_second() - 7.0 / 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_span_keeps_previous() {
        let mut estimator = FrameRateEstimator::default();

        // Repeated instant: nothing to measure yet
        estimator.record_frame(100);
        assert_eq!(estimator.record_frame(100), FPS_UNKNOWN);

        // Three frames over 100 ms
        assert_eq!(estimator.record_frame(200), 30.0);

        // Clock stepped back below the oldest entry: negative span
        assert_eq!(estimator.record_frame(50), 30.0);
    }

    #[test]
    fn test_window_of_two_never_measures() {
        // A bound of 2 retains a single timestamp after eviction
        let mut estimator = FrameRateEstimator::new(2);
        for ts in [0, 10, 20, 30] {
            assert_eq!(estimator.record_frame(ts), FPS_UNKNOWN);
        }
    }

    #[test]
    fn test_reset() {
        let mut estimator = FrameRateEstimator::default();
        estimator.record_frame(0);
        estimator.record_frame(40);
        estimator.reset();

        assert!(estimator.window().is_empty());
        assert_eq!(estimator.frames_per_second(), FPS_UNKNOWN);
    }

    proptest! {
        #[test]
        fn prop_fps_finite_and_matches_window(
            deltas in proptest::collection::vec(-50i64..500, 1..100),
        ) {
            let mut estimator = FrameRateEstimator::default();
            let mut now = 10_000i64;

            for delta in deltas {
                now += delta;
                let previous = estimator.frames_per_second();
                let fps = estimator.record_frame(now);
                let window = estimator.window();

                prop_assert!(fps.is_finite());
                prop_assert!(window.len() < 8);

                let span = window.span_ms().unwrap();
                if span > 0 {
                    prop_assert_eq!(fps, 1000.0 * window.len() as f64 / span as f64);
                } else {
                    prop_assert_eq!(fps, previous);
                }
            }
        }
    }
}
