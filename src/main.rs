use clap::Parser;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

mod assets;
mod auth;
mod error;
mod manifest;
mod pipeline;
mod utils;

use pipeline::{AssetOutcome, PipelineConfig};
use utils::http::HttpSource;

/// Download and optimize game artwork for the account viewer
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Output directory for images
    #[arg(short, long, default_value = "images")]
    output: PathBuf,

    /// Comma-separated hero names to fetch (defaults to the canonical roster)
    #[arg(long, value_delimiter = ',')]
    heroes: Option<Vec<String>>,

    /// Number of background images to fetch
    #[arg(long, default_value_t = 3)]
    backgrounds: usize,

    /// Security key for verification
    #[arg(long)]
    security_key: Option<String>,

    /// Number of concurrent downloads (defaults to number of CPU cores)
    #[arg(short, long, default_value_t = thread::available_parallelism().map_or(1, |p| p.get()))]
    threads: usize,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,
}

#[tokio::main]
async fn main() -> Result<(), error::PipelineError> {
    let args = Args::parse();

    println!("Output: {}", args.output.display());

    let config = PipelineConfig {
        output_root: args.output,
        hero_names: args.heroes,
        background_count: args.backgrounds,
        security_key: args.security_key,
        concurrency: args.threads,
        request_timeout: Duration::from_secs(args.timeout),
    };

    let source = HttpSource::new(config.request_timeout)?;
    let report = pipeline::run(&config, &source).await?;

    // Per-asset failures are reported, not fatal
    println!();
    if report.verified {
        println!("Security key verified");
    }
    if report.fetched() > 0 {
        println!("Fetched {} new assets", report.fetched());
    }
    if report.skipped() > 0 {
        println!("Skipped {} assets (already existed)", report.skipped());
    }
    if report.failed() > 0 {
        println!("Failed to process {} assets:", report.failed());
        for asset in &report.assets {
            if let AssetOutcome::Failed(reason) = &asset.outcome {
                println!("  {}/{}: {}", asset.kind.subdir(), asset.name, reason);
            }
        }
    }
    println!("Manifest: {}", report.manifest_path.display());

    Ok(())
}
