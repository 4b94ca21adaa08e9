//! Analyzer shared between producer threads

use crate::analyzer::{AnalyzerStats, LuminosityAnalyzer};
use crate::listener::{ListenerHandle, LumaListener};
use camera_capture::ImageFrame;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Cloneable handle serializing all analyzer access behind one mutex.
///
/// A listener panic poisons the lock; later calls keep using the state as it
/// was left.
#[derive(Debug, Clone)]
pub struct SharedAnalyzer {
    inner: Arc<Mutex<LuminosityAnalyzer>>,
}

impl SharedAnalyzer {
    pub fn new(analyzer: LuminosityAnalyzer) -> Self {
        Self {
            inner: Arc::new(Mutex::new(analyzer)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LuminosityAnalyzer> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn analyze<F>(&self, frame: &F, rotation_degrees: i32) -> Option<f64>
    where
        F: ImageFrame + ?Sized,
    {
        self.lock().analyze(frame, rotation_degrees)
    }

    pub fn analyze_at<F>(&self, frame: &F, rotation_degrees: i32, timestamp_ms: i64) -> Option<f64>
    where
        F: ImageFrame + ?Sized,
    {
        self.lock().analyze_at(frame, rotation_degrees, timestamp_ms)
    }

    pub fn register(&self, listener: impl LumaListener + 'static) -> ListenerHandle {
        self.lock().register(listener)
    }

    pub fn unregister(&self, handle: ListenerHandle) -> bool {
        self.lock().unregister(handle)
    }

    pub fn frames_per_second(&self) -> f64 {
        self.lock().frames_per_second()
    }

    pub fn stats(&self) -> AnalyzerStats {
        self.lock().stats()
    }
}

impl From<LuminosityAnalyzer> for SharedAnalyzer {
    fn from(analyzer: LuminosityAnalyzer) -> Self {
        Self::new(analyzer)
    }
}
