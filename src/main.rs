use anyhow::Result;
use clap::{Arg, Command};
use std::path::PathBuf;
use tracing::{error, info, warn};

mod config;
mod detection;
mod placements;
mod processing;
mod segments;

use crate::config::Config;
use crate::processing::AnalysisRunner;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter("adbreak_analyzer=info,warn")
        .init();

    let matches = Command::new("Ad Break Analyzer")
        .version("0.1.0")
        .about("Finds ad-insertion windows from video text-detection results")
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("PATH")
                .help("Detection dump file, or directory of dumps, to analyze")
                .required(true)
        )
        .arg(
            Arg::new("report-dir")
                .short('o')
                .long("report-dir")
                .value_name("DIR")
                .help("Directory for reports (default: next to each input)")
        )
        .arg(
            Arg::new("min-ad-duration")
                .short('d')
                .long("min-ad-duration")
                .value_name("SECS")
                .help("Minimum ad duration in seconds")
        )
        .arg(
            Arg::new("min-word-width")
                .short('w')
                .long("min-word-width")
                .value_name("FRACTION")
                .help("Minimum word width as a fraction of frame width")
        )
        .arg(
            Arg::new("force")
                .short('f')
                .long("force")
                .help("Re-analyze inputs whose report already exists")
                .action(clap::ArgAction::SetTrue)
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue)
        )
        .get_matches();

    let input = PathBuf::from(matches.get_one::<String>("input").unwrap());
    let verbose = matches.get_flag("verbose");

    if verbose {
        info!("Verbose logging enabled");
    }

    // Load configuration
    let mut config = Config::load().unwrap_or_else(|e| {
        warn!("Failed to load config, using defaults: {}", e);
        Config::default()
    });

    // CLI flags take precedence over file/env configuration
    if let Some(dir) = matches.get_one::<String>("report-dir") {
        config.output.report_dir = Some(PathBuf::from(dir));
    }
    if let Some(secs) = matches.get_one::<String>("min-ad-duration") {
        config.analysis.min_ad_duration_secs = secs.parse()?;
    }
    if let Some(width) = matches.get_one::<String>("min-word-width") {
        config.analysis.min_word_width = width.parse()?;
    }
    if matches.get_flag("force") {
        config.output.skip_existing = false;
    }

    info!("🚀 Ad Break Analyzer starting...");
    info!("📁 Input: {}", input.display());
    info!("⏱️  Minimum ad duration: {}s", config.analysis.min_ad_duration_secs);
    info!("🔤 Minimum word width: {}", config.analysis.min_word_width);

    if !input.exists() {
        error!("Input path does not exist: {}", input.display());
        return Err(anyhow::anyhow!("Input path not found"));
    }

    if let Some(dir) = &config.output.report_dir {
        tokio::fs::create_dir_all(dir).await?;
    }

    let runner = AnalysisRunner::new(config)?;
    let summary = runner.run(&input).await?;

    // Print results
    info!("🎉 Analysis completed in {:.2}s", summary.total_time.as_secs_f64());
    info!("✅ Successful: {}", summary.successful);
    info!("❌ Failed: {}", summary.failed);
    info!("📺 Ad slots found: {}", summary.slots_found);

    if summary.failed > 0 {
        return Err(anyhow::anyhow!("{} input(s) failed to analyze", summary.failed));
    }

    Ok(())
}
