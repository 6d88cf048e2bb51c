mod annotator;
mod core;
mod decoder;
mod error;
mod output;
mod shared;
mod utils;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use crate::core::{pipeline, RunConfig};
use crate::shared::constants;

/// Annotate a video by sampling keyframes and describing each one with a local multimodal model.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the input video file
    #[arg(short, long)]
    video: PathBuf,

    /// Model identifier as loaded in the server (e.g. 'llava-hf/llava-1.5-7b-hf')
    #[arg(short, long)]
    model: String,

    /// Seconds between keyframes
    #[arg(short, long, default_value_t = constants::DEFAULT_INTERVAL_SECS)]
    interval: f64,

    /// Base URL of the OpenAI-compatible API
    #[arg(short = 'u', long, alias = "api_url", default_value = constants::DEFAULT_API_URL)]
    api_url: String,

    /// Output CSV path (default: next to the video, with a .csv extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = constants::DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    #[arg(long, default_value_t = constants::DEFAULT_MAX_TOKENS)]
    max_tokens: u32,

    #[arg(long, default_value_t = constants::DEFAULT_TEMPERATURE)]
    temperature: f32,

    /// Downscale frames so the longest side is at most this many pixels (0 = native)
    #[arg(long, default_value_t = 0)]
    max_dimension: u32,

    /// Do not check that the server is reachable before starting
    #[arg(long, default_value_t = false)]
    skip_health_check: bool,
}

impl From<Cli> for RunConfig {
    fn from(cli: Cli) -> Self {
        let mut config = RunConfig::new(cli.video, cli.model);
        config.interval = cli.interval;
        config.api_url = cli.api_url;
        config.output = cli.output;
        config.timeout_secs = cli.timeout;
        config.max_tokens = cli.max_tokens;
        config.temperature = cli.temperature;
        config.max_dimension = cli.max_dimension;
        config.health_check = !cli.skip_health_check;
        config
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    crate::utils::logger::init();
    crate::utils::logger::info(&format!("{} {} starting: {:?}", constants::APP_NAME, env!("CARGO_PKG_VERSION"), cli));

    let config = RunConfig::from(cli);
    let summary = pipeline::run(&config).map_err(|e| {
        crate::utils::logger::error(&format!("Run aborted: {}", e));
        e
    })?;

    pipeline::print_summary(&summary);
    Ok(())
}
