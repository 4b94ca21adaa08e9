//! Frame Luminosity Monitor
//!
//! Feeds frames from a synthetic pattern or image files through an analysis
//! worker and reports the resulting frame rate and luminance samples.

use anyhow::Context;
use camera_capture::{FrameSource, ImageSequenceSource, SyntheticSource};
use clap::Parser;
use luma_analyzer::{
    AnalysisWorker, AnalyzerConfig, AnalyzerStats, Clock, ForwardingListener, LuminosityAnalyzer,
    ReaderMode, SteppedClock, SubmitOutcome, SystemClock,
};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Command line arguments
#[derive(Debug, Parser)]
#[command(name = "luma-monitor", version, about = "Average luminance and frame rate monitor")]
pub struct Args {
    /// TOML configuration file (LUMA_* environment variables override it)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Image files to analyze instead of the synthetic pattern
    #[arg(long = "image", value_name = "FILE")]
    pub images: Vec<PathBuf>,

    /// Replay the image files until the frame limit is reached
    #[arg(long = "loop")]
    pub looping: bool,

    /// Number of frames to feed
    #[arg(short = 'n', long, default_value_t = 300)]
    pub frames: u32,

    /// Nominal frame rate of the source
    #[arg(long, default_value_t = 30.0, value_parser = parse_fps)]
    pub fps: f64,

    /// Synthetic frame width
    #[arg(long, default_value_t = 640)]
    pub width: u32,

    /// Synthetic frame height
    #[arg(long, default_value_t = 480)]
    pub height: u32,

    /// Synthetic brightness increment per frame
    #[arg(long, default_value_t = 1)]
    pub step: u8,

    /// Rotation reported alongside each frame
    #[arg(long, default_value_t = 0)]
    pub rotation: i32,

    /// Override the luminance sample interval (milliseconds)
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Deliver frames at the nominal rate using the wall clock
    #[arg(long)]
    pub realtime: bool,

    /// Print the run summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Aggregate of the luminance samples seen during a run
#[derive(Debug, Clone, Default, Serialize)]
pub struct LumaSummary {
    pub count: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub samples: Vec<f64>,
}

impl LumaSummary {
    fn push(&mut self, luma: f64) {
        self.count += 1;
        self.min = Some(self.min.map_or(luma, |m| m.min(luma)));
        self.max = Some(self.max.map_or(luma, |m| m.max(luma)));
        self.samples.push(luma);
        self.mean = Some(self.samples.iter().sum::<f64>() / self.count as f64);
    }
}

/// Result of a monitor run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub source: String,
    pub frames_submitted: u64,
    pub frames_dropped: u64,
    pub analyzer: AnalyzerStats,
    pub luma: LumaSummary,
}

/// Initialize logging
pub fn init_logging(verbose: u8) -> anyhow::Result<()> {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

/// Frame period of a nominal frame rate. Rejects rates that are not finite
/// and positive, or whose period is too short to represent.
pub fn frame_period(fps: f64) -> anyhow::Result<Duration> {
    if !fps.is_finite() || fps <= 0.0 {
        anyhow::bail!("Frame rate must be a positive finite number, got {}", fps);
    }
    let period = Duration::try_from_secs_f64(1.0 / fps)
        .with_context(|| format!("Frame rate {} has no representable period", fps))?;
    if period.is_zero() {
        anyhow::bail!("Frame rate {} is too high, its period rounds to zero", fps);
    }
    Ok(period)
}

fn parse_fps(value: &str) -> Result<f64, String> {
    let fps: f64 = value.parse().map_err(|e: std::num::ParseFloatError| e.to_string())?;
    frame_period(fps).map_err(|e| e.to_string())?;
    Ok(fps)
}

fn build_source(args: &Args) -> Box<dyn FrameSource + Send> {
    if args.images.is_empty() {
        Box::new(
            SyntheticSource::new(args.width, args.height)
                .with_step(args.step)
                .with_limit(args.frames),
        )
    } else {
        Box::new(ImageSequenceSource::new(args.images.clone()).looping(args.looping))
    }
}

/// Run the monitor to completion
pub async fn run(args: Args) -> anyhow::Result<RunSummary> {
    let config = AnalyzerConfig::load(args.config.as_deref())?;
    run_with_config(args, config).await
}

/// Run the monitor with an already loaded analyzer configuration.
///
/// Command line overrides (`--interval-ms`, replay reader mode) are applied
/// on top of `config`.
pub async fn run_with_config(args: Args, mut config: AnalyzerConfig) -> anyhow::Result<RunSummary> {
    let period = frame_period(args.fps)?;
    if let Some(interval) = args.interval_ms {
        config.sample_interval_ms = interval;
    }
    if !args.realtime && config.reader_mode == ReaderMode::AcquireLatestImage {
        info!("Replay mode: waiting for the analyzer instead of dropping frames");
        config.reader_mode = ReaderMode::AcquireNextImage;
    }
    config.validate()?;

    let mut analyzer = if args.realtime {
        LuminosityAnalyzer::new(&config)?
    } else {
        let clock = SteppedClock::at_fps(SystemClock.now_ms(), args.fps);
        LuminosityAnalyzer::with_clock(&config, clock)?
    };

    // Unbounded so the summary sees every sample the analyzer emits
    let (forward, mut samples_rx) = ForwardingListener::unbounded();
    analyzer.register(forward);

    let collector = tokio::spawn(async move {
        let mut summary = LumaSummary::default();
        while let Some(luma) = samples_rx.recv().await {
            summary.push(luma);
        }
        summary
    });

    let mut source = build_source(&args);
    let description = source.describe();
    info!("Analyzing {} frames from {}", args.frames, description);

    let worker = AnalysisWorker::spawn(analyzer, &config);
    let mut ticker = args.realtime.then(|| tokio::time::interval(period));
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut submitted = 0u64;
    for _ in 0..args.frames {
        let Some(next) = source.next_frame() else {
            break;
        };
        let frame = match next {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Skipping frame: {}", e);
                continue;
            }
        };

        if let Some(ticker) = ticker.as_mut() {
            tokio::select! {
                _ = &mut ctrl_c => {
                    info!("Interrupted, stopping frame delivery");
                    break;
                }
                _ = ticker.tick() => {}
            }
        }

        if worker.submit(frame, args.rotation).await? == SubmitOutcome::Queued {
            submitted += 1;
        }
    }

    let frames_dropped = worker.frames_dropped();
    let analyzer = worker.shutdown().await?;
    let stats = analyzer.stats();
    // Dropping the analyzer closes the forwarding channel
    drop(analyzer);
    let luma = collector.await.context("Sample collector failed")?;

    Ok(RunSummary {
        source: description,
        frames_submitted: submitted,
        frames_dropped,
        analyzer: stats,
        luma,
    })
}
