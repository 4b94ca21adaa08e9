//! Dedicated analysis worker
//!
//! Runs a `LuminosityAnalyzer` on its own blocking thread, fed by a bounded
//! channel, so frame producers never execute listener callbacks themselves.

use crate::analyzer::LuminosityAnalyzer;
use crate::settings::{AnalyzerConfig, ReaderMode};
use crate::AnalyzerError;
use camera_capture::VideoFrame;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Result of handing a frame to the worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Frame queued for analysis
    Queued,
    /// Queue was full; frame discarded
    Dropped,
}

struct Job {
    frame: VideoFrame,
    rotation_degrees: i32,
}

/// Handle to a running analysis worker
pub struct AnalysisWorker {
    tx: mpsc::Sender<Job>,
    task: JoinHandle<LuminosityAnalyzer>,
    mode: ReaderMode,
    dropped: Arc<AtomicU64>,
    analyzed: Arc<AtomicU64>,
}

impl AnalysisWorker {
    /// Move the analyzer onto a worker thread. Must be called from within a
    /// tokio runtime.
    pub fn spawn(mut analyzer: LuminosityAnalyzer, config: &AnalyzerConfig) -> Self {
        let (tx, mut rx) = mpsc::channel::<Job>(config.queue_depth.max(1));

        info!(
            "Starting analysis worker ({:?}, queue depth {})",
            config.reader_mode, config.queue_depth
        );

        let analyzed = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&analyzed);
        let task = tokio::task::spawn_blocking(move || {
            while let Some(job) = rx.blocking_recv() {
                process(&mut analyzer, &job, &counter);
            }
            debug!("Analysis worker channel closed");
            analyzer
        });

        Self {
            tx,
            task,
            mode: config.reader_mode,
            dropped: Arc::new(AtomicU64::new(0)),
            analyzed,
        }
    }

    /// Hand a frame to the worker according to the configured reader mode
    pub async fn submit(
        &self,
        frame: VideoFrame,
        rotation_degrees: i32,
    ) -> Result<SubmitOutcome, AnalyzerError> {
        let job = Job {
            frame,
            rotation_degrees,
        };

        match self.mode {
            ReaderMode::AcquireNextImage => {
                self.tx.send(job).await.map_err(|_| AnalyzerError::WorkerClosed)?;
                Ok(SubmitOutcome::Queued)
            }
            ReaderMode::AcquireLatestImage => match self.tx.try_send(job) {
                Ok(()) => Ok(SubmitOutcome::Queued),
                Err(mpsc::error::TrySendError::Full(job)) => {
                    let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                    metrics::counter!("luma_frames_dropped_total").increment(1);
                    warn!(
                        "Analyzer busy, dropped frame {} ({} total)",
                        job.frame.sequence, dropped
                    );
                    Ok(SubmitOutcome::Dropped)
                }
                Err(mpsc::error::TrySendError::Closed(_)) => Err(AnalyzerError::WorkerClosed),
            },
        }
    }

    /// Frames discarded because the queue was full
    pub fn frames_dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Frames the analyzer has tracked so far (none while no listener is
    /// registered)
    pub fn frames_analyzed(&self) -> u64 {
        self.analyzed.load(Ordering::Relaxed)
    }

    /// Stop accepting frames, drain the queue and return the analyzer
    pub async fn shutdown(self) -> Result<LuminosityAnalyzer, AnalyzerError> {
        drop(self.tx);
        let analyzer = self
            .task
            .await
            .map_err(|e| AnalyzerError::WorkerFailed(e.to_string()))?;
        info!("Analysis worker stopped: {:?}", analyzer.stats());
        Ok(analyzer)
    }
}

/// Analyze one queued frame and update the worker counters
fn process(analyzer: &mut LuminosityAnalyzer, job: &Job, analyzed: &AtomicU64) -> Option<f64> {
    let before = analyzer.frames_analyzed();
    let sample = analyzer.analyze(&job.frame, job.rotation_degrees);

    let tracked = analyzer.frames_analyzed() - before;
    if tracked > 0 {
        analyzed.fetch_add(tracked, Ordering::Relaxed);
        metrics::counter!("luma_frames_analyzed_total").increment(tracked);
    }

    if let Some(luma) = sample {
        metrics::counter!("luma_samples_emitted_total").increment(1);
        info!(
            "Average luminosity: {}. Frames per second: {:.1}",
            luma,
            analyzer.frames_per_second()
        );
    }
    sample
}
