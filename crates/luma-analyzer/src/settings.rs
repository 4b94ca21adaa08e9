//! Analyzer configuration

use crate::AnalyzerError;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Environment variable prefix for overrides (e.g. `LUMA_SAMPLE_INTERVAL_MS`)
const ENV_PREFIX: &str = "LUMA";

/// How the analysis worker treats frames arriving while it is busy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReaderMode {
    /// Never block the producer; frames that find the queue full are dropped
    #[default]
    AcquireLatestImage,
    /// Block the producer until the worker has room for the frame
    AcquireNextImage,
}

/// Analyzer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Timestamp window bound used for the FPS moving average (default: 8)
    pub frame_rate_window: usize,

    /// Minimum time between luminance computations (milliseconds)
    pub sample_interval_ms: u64,

    /// Worker behaviour when frames arrive faster than they are analyzed
    pub reader_mode: ReaderMode,

    /// Worker queue depth (frames)
    pub queue_depth: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            frame_rate_window: ring_buffer::DEFAULT_CAPACITY,
            sample_interval_ms: 1000,
            reader_mode: ReaderMode::AcquireLatestImage,
            queue_depth: 1,
        }
    }
}

impl AnalyzerConfig {
    /// Create responsive config (4 samples per second)
    pub fn responsive() -> Self {
        Self {
            sample_interval_ms: 250,
            ..Default::default()
        }
    }

    /// Create smooth config (longer FPS window)
    pub fn smooth() -> Self {
        Self {
            frame_rate_window: 16,
            ..Default::default()
        }
    }

    /// Load configuration from an optional TOML file, then `LUMA_*`
    /// environment variables. Missing keys fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, AnalyzerError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            info!("Loading analyzer config from {}", path.display());
            builder = builder.add_source(File::from(path).required(true));
        }

        let config: Self = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML document
    pub fn from_toml_str(toml: &str) -> Result<Self, AnalyzerError> {
        let config: Self = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Reject values the analyzer cannot run with
    pub fn validate(&self) -> Result<(), AnalyzerError> {
        if self.frame_rate_window < 2 {
            return Err(AnalyzerError::InvalidConfig {
                field: "frame_rate_window",
                reason: format!("must be at least 2, got {}", self.frame_rate_window),
            });
        }
        if self.queue_depth == 0 {
            return Err(AnalyzerError::InvalidConfig {
                field: "queue_depth",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Sample interval as a signed millisecond delta
    pub(crate) fn sample_interval(&self) -> i64 {
        i64::try_from(self.sample_interval_ms).unwrap_or(i64::MAX)
    }
}
