//! Luminosity analyzer: per-frame orchestration

use crate::clock::{Clock, SystemClock};
use crate::error::AnalyzerError;
use crate::estimator::FrameRateEstimator;
use crate::listener::{ListenerHandle, LumaListener};
use crate::sampler::LuminanceSampler;
use crate::settings::AnalyzerConfig;
use camera_capture::ImageFrame;
use ring_buffer::TimestampWindow;
use serde::{Deserialize, Serialize};
use tracing::{info, trace};

/// Snapshot of analyzer counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerStats {
    /// Frames that went through timestamp tracking
    pub frames_analyzed: u64,
    /// Luminance samples delivered to listeners
    pub samples_emitted: u64,
    /// Last FPS estimate (-1.0 before the first measurement)
    pub frames_per_second: f64,
    /// Last luminance sample
    pub last_luma: Option<f64>,
    /// Registered listeners
    pub listeners: usize,
}

/// Computes a moving-average frame rate and a throttled average luminance
/// for each frame handed to `analyze`.
///
/// Frames are only borrowed for the duration of the call.
pub struct LuminosityAnalyzer {
    estimator: FrameRateEstimator,
    sampler: LuminanceSampler,
    clock: Box<dyn Clock>,
    frames_analyzed: u64,
}

impl LuminosityAnalyzer {
    /// Create an analyzer timestamping frames with the wall clock
    pub fn new(config: &AnalyzerConfig) -> Result<Self, AnalyzerError> {
        Self::with_clock(config, SystemClock)
    }

    /// Create an analyzer with a custom timestamp source.
    ///
    /// Fails with `AnalyzerError::InvalidConfig` if `config` does not validate.
    pub fn with_clock(
        config: &AnalyzerConfig,
        clock: impl Clock + 'static,
    ) -> Result<Self, AnalyzerError> {
        config.validate()?;
        info!(
            "Creating luminosity analyzer (window {}, interval {} ms)",
            config.frame_rate_window, config.sample_interval_ms
        );
        Ok(Self::build(config, Box::new(clock)))
    }

    /// Assemble an analyzer from an already validated config
    fn build(config: &AnalyzerConfig, clock: Box<dyn Clock>) -> Self {
        Self {
            estimator: FrameRateEstimator::new(config.frame_rate_window),
            sampler: LuminanceSampler::new(config.sample_interval()),
            clock,
            frames_analyzed: 0,
        }
    }

    /// Register a listener for luminance samples
    pub fn register(&mut self, listener: impl LumaListener + 'static) -> ListenerHandle {
        self.sampler.register(listener)
    }

    /// Remove a listener. Returns false if the handle is unknown.
    pub fn unregister(&mut self, handle: ListenerHandle) -> bool {
        self.sampler.unregister(handle)
    }

    /// Analyze a frame arriving now. Returns the luminance sample if one was
    /// computed and delivered.
    pub fn analyze<F>(&mut self, frame: &F, rotation_degrees: i32) -> Option<f64>
    where
        F: ImageFrame + ?Sized,
    {
        let now = self.clock.now_ms();
        self.analyze_at(frame, rotation_degrees, now)
    }

    /// Analyze a frame with an explicit arrival timestamp.
    ///
    /// Nothing is tracked while no listener is registered. Otherwise the
    /// timestamp always feeds the FPS window, and the luminance throttle is
    /// checked against the window's newest entry.
    pub fn analyze_at<F>(
        &mut self,
        frame: &F,
        rotation_degrees: i32,
        timestamp_ms: i64,
    ) -> Option<f64>
    where
        F: ImageFrame + ?Sized,
    {
        if self.sampler.listener_count() == 0 {
            return None;
        }

        self.frames_analyzed += 1;
        trace!(
            "Frame {}x{} at {} ms, rotation {}",
            frame.width(),
            frame.height(),
            timestamp_ms,
            rotation_degrees
        );

        self.estimator.record_frame(timestamp_ms);

        let reference = self.estimator.window().newest().unwrap_or(timestamp_ms);
        self.sampler.maybe_sample(frame, reference)
    }

    /// Last FPS estimate, or `FPS_UNKNOWN` before the first measurement
    pub fn frames_per_second(&self) -> f64 {
        self.estimator.frames_per_second()
    }

    /// Current timestamp window
    pub fn window(&self) -> &TimestampWindow {
        self.estimator.window()
    }

    pub fn listener_count(&self) -> usize {
        self.sampler.listener_count()
    }

    /// Frames that went through timestamp tracking
    pub fn frames_analyzed(&self) -> u64 {
        self.frames_analyzed
    }

    pub fn last_analyzed_timestamp(&self) -> i64 {
        self.sampler.last_analyzed_ms()
    }

    pub fn stats(&self) -> AnalyzerStats {
        AnalyzerStats {
            frames_analyzed: self.frames_analyzed,
            samples_emitted: self.sampler.samples_emitted(),
            frames_per_second: self.estimator.frames_per_second(),
            last_luma: self.sampler.last_luma(),
            listeners: self.sampler.listener_count(),
        }
    }
}

impl Default for LuminosityAnalyzer {
    fn default() -> Self {
        Self::build(&AnalyzerConfig::default(), Box::new(SystemClock))
    }
}

impl std::fmt::Debug for LuminosityAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LuminosityAnalyzer")
            .field("estimator", &self.estimator)
            .field("sampler", &self.sampler)
            .field("frames_analyzed", &self.frames_analyzed)
            .finish()
    }
}
