//! Analyzer Error Types

use thiserror::Error;

/// Errors raised around the analysis core
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// Configuration value rejected by validation
    #[error("Invalid configuration: {field} {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: String,
    },

    /// Configuration sources could not be read or deserialized
    #[error("Failed to load configuration: {0}")]
    ConfigLoad(#[from] config::ConfigError),

    /// Frame submitted after the worker stopped
    #[error("Analysis worker has shut down")]
    WorkerClosed,

    /// Worker task ended abnormally (listener panic)
    #[error("Analysis worker failed: {0}")]
    WorkerFailed(String),
}
