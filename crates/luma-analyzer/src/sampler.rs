//! Throttled average luminance sampling

use crate::listener::{ListenerHandle, ListenerRegistry, LumaListener};
use camera_capture::{ImageFrame, LUMA_PLANE};
use tracing::{debug, trace, warn};

/// Mean of the samples in a luma plane, each byte read as unsigned 0..=255.
///
/// Returns `None` for an empty plane.
pub fn mean_luma(data: &[u8]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    let sum: u64 = data.iter().map(|&b| b as u64).sum();
    Some(sum as f64 / data.len() as f64)
}

/// Computes average luminance no more often than once per interval and
/// pushes each value to its listeners.
#[derive(Debug)]
pub struct LuminanceSampler {
    listeners: ListenerRegistry,
    interval_ms: i64,
    last_analyzed_ms: i64,
    last_luma: Option<f64>,
    samples_emitted: u64,
}

impl LuminanceSampler {
    pub fn new(interval_ms: i64) -> Self {
        Self {
            listeners: ListenerRegistry::new(),
            interval_ms,
            last_analyzed_ms: 0,
            last_luma: None,
            samples_emitted: 0,
        }
    }

    /// Sample the frame's luma plane if a listener is registered and the
    /// interval since the last sample has elapsed.
    ///
    /// Listeners run before the throttle timestamp advances, so a panicking
    /// listener leaves the sampler due again on the next frame.
    pub fn maybe_sample<F>(&mut self, frame: &F, now_ms: i64) -> Option<f64>
    where
        F: ImageFrame + ?Sized,
    {
        if self.listeners.is_empty() {
            return None;
        }

        let elapsed = now_ms.saturating_sub(self.last_analyzed_ms);
        if elapsed < self.interval_ms {
            trace!("Luma throttled: {} ms since last sample", elapsed);
            return None;
        }

        let Some(plane) = frame.plane(LUMA_PLANE) else {
            warn!("Frame has no luma plane ({} planes)", frame.plane_count());
            return None;
        };

        // The frame is reclaimed by its source once analysis returns
        let data = plane.to_vec();

        let Some(luma) = mean_luma(&data) else {
            warn!("Empty luma plane on {}x{} frame", frame.width(), frame.height());
            return None;
        };

        self.listeners.notify(luma);

        self.last_analyzed_ms = now_ms;
        self.last_luma = Some(luma);
        self.samples_emitted += 1;
        debug!("Luma sample {:.2} at {} ms", luma, now_ms);

        Some(luma)
    }

    pub fn register(&mut self, listener: impl LumaListener + 'static) -> ListenerHandle {
        self.listeners.register(listener)
    }

    pub fn unregister(&mut self, handle: ListenerHandle) -> bool {
        self.listeners.unregister(handle)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Reference timestamp of the last computed sample (0 before the first)
    pub fn last_analyzed_ms(&self) -> i64 {
        self.last_analyzed_ms
    }

    pub fn last_luma(&self) -> Option<f64> {
        self.last_luma
    }

    pub fn samples_emitted(&self) -> u64 {
        self.samples_emitted
    }

    pub fn interval_ms(&self) -> i64 {
        self.interval_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camera_capture::VideoFrame;
    use std::sync::{Arc, Mutex};

    fn frame(data: Vec<u8>) -> VideoFrame {
        let len = data.len() as u32;
        VideoFrame::gray(data, len, 1).unwrap()
    }

    #[test]
    fn test_mean_luma() {
        assert_eq!(mean_luma(&[0, 128, 255, 255]), Some(159.5));
        assert_eq!(mean_luma(&[]), None);
    }

    #[test]
    fn test_signed_bytes_read_unsigned() {
        let signed: [i8; 4] = [-1, -1, -128, 0];
        let bytes: Vec<u8> = signed.iter().map(|&b| b as u8).collect();

        // 255 + 255 + 128 + 0
        assert_eq!(mean_luma(&bytes), Some(638.0 / 4.0));
    }

    #[test]
    fn test_no_listeners_no_sample() {
        let mut sampler = LuminanceSampler::new(1000);
        assert_eq!(sampler.maybe_sample(&frame(vec![10; 4]), 5_000), None);
        assert_eq!(sampler.samples_emitted(), 0);
    }

    #[test]
    fn test_throttle() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut sampler = LuminanceSampler::new(1000);
        let sink = Arc::clone(&seen);
        sampler.register(move |luma: f64| sink.lock().unwrap().push(luma));

        assert_eq!(sampler.maybe_sample(&frame(vec![10; 4]), 1_000), Some(10.0));
        assert_eq!(sampler.maybe_sample(&frame(vec![20; 4]), 1_999), None);
        assert_eq!(sampler.maybe_sample(&frame(vec![30; 4]), 2_000), Some(30.0));

        assert_eq!(*seen.lock().unwrap(), vec![10.0, 30.0]);
        assert_eq!(sampler.last_analyzed_ms(), 2_000);
        assert_eq!(sampler.last_luma(), Some(30.0));
    }

    #[test]
    fn test_first_sample_needs_full_interval() {
        let mut sampler = LuminanceSampler::new(1000);
        sampler.register(|_: f64| {});

        // Last analyzed starts at 0
        assert_eq!(sampler.maybe_sample(&frame(vec![1]), 999), None);
        assert_eq!(sampler.maybe_sample(&frame(vec![1]), 1000), Some(1.0));
    }

    #[test]
    fn test_empty_plane_emits_nothing() {
        let mut sampler = LuminanceSampler::new(1000);
        sampler.register(|_: f64| panic!("listener must not run"));

        let empty = VideoFrame {
            planes: vec![camera_capture::Plane::new(vec![], 0)],
            width: 1,
            height: 1,
            format: camera_capture::PixelFormat::Gray8,
            sequence: 0,
        };

        assert_eq!(sampler.maybe_sample(&empty, 5_000), None);
        // Throttle not consumed
        assert_eq!(sampler.last_analyzed_ms(), 0);
    }

    #[test]
    fn test_unregister_last_listener_stops_sampling() {
        let mut sampler = LuminanceSampler::new(0);
        let handle = sampler.register(|_: f64| {});

        assert!(sampler.maybe_sample(&frame(vec![5]), 10).is_some());
        assert!(sampler.unregister(handle));
        assert_eq!(sampler.maybe_sample(&frame(vec![5]), 20), None);
    }
}
