//! Bounded Timestamp Ring
//!
//! Provides the newest-first window of frame arrival timestamps used by the
//! frame rate estimator.

mod buffer;

pub use buffer::{TimestampWindow, DEFAULT_CAPACITY};
