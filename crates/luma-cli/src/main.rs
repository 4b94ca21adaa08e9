//! Frame Luminosity Monitor - Main Entry Point

use clap::Parser;
use luma_cli::{init_logging, run, Args};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose)?;

    info!("=== Luma Monitor v{} ===", env!("CARGO_PKG_VERSION"));

    let json = args.json;
    let summary = run(args).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        info!(
            "Analyzed {} frames ({} dropped), {} luma samples, {:.1} fps",
            summary.analyzer.frames_analyzed,
            summary.frames_dropped,
            summary.luma.count,
            summary.analyzer.frames_per_second
        );
    }

    Ok(())
}
