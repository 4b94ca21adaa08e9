//! Frame Luminosity Analyzer
//!
//! Consumes a stream of camera frames and produces:
//! - A moving-average frames-per-second estimate over the last few frames
//! - An average luminance sample from the Y plane, at most once per interval
//!
//! Samples are pushed synchronously to registered listeners. The analyzer is
//! single-writer; `SharedAnalyzer` and `AnalysisWorker` cover multi-producer
//! and dedicated-worker delivery.

mod analyzer;
mod clock;
mod error;
mod estimator;
mod listener;
mod sampler;
mod settings;
mod shared;
mod worker;

pub use analyzer::{AnalyzerStats, LuminosityAnalyzer};
pub use clock::{Clock, ManualClock, SteppedClock, SystemClock};
pub use error::AnalyzerError;
pub use estimator::{FrameRateEstimator, FPS_UNKNOWN};
pub use listener::{ForwardingListener, ListenerHandle, ListenerRegistry, LumaListener};
pub use sampler::{mean_luma, LuminanceSampler};
pub use settings::{AnalyzerConfig, ReaderMode};
pub use shared::SharedAnalyzer;
pub use worker::{AnalysisWorker, SubmitOutcome};
