//! # Client Binary Entry Point
//!
//! Command-line client for the detection service.
//!
//! ## Usage
//!
//! ```bash
//! # Analyze images one at a time
//! cargo run --bin client -- --config config/client.toml photo1.jpg photo2.jpg
//!
//! # Submit all images as one batch request
//! cargo run --bin client -- --config config/client.toml --batch *.jpg
//!
//! # Check service status once, or keep watching it
//! cargo run --bin client -- --config config/client.toml --status
//! cargo run --bin client -- --config config/client.toml --watch
//! ```
//!
//! Images are submitted sequentially, one request in flight at a time, and
//! every verdict lands in the bounded in-memory history printed at the end.

use anyhow::{Context, Result};
use clap::Parser;
use colorful::Colorful;
use env_logger::Builder;
use log::{info, LevelFilter};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use originscan::client::status::poll_once;
use originscan::client::{
    report, ClientConfig, DetectClient, DetectionHistory, StatusPoller, SystemStatus,
};
use originscan::common::types::DetectionResult;

/// Command-line arguments for the client binary
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the client configuration file (TOML format)
    ///
    /// Example: config/client.toml
    #[arg(short, long)]
    config: String,

    /// Image files to analyze
    images: Vec<PathBuf>,

    /// Submit all images as one batch request instead of one by one
    #[arg(long)]
    batch: bool,

    /// Print the current system status and exit
    #[arg(long)]
    status: bool,

    /// Keep polling system status at the configured interval
    #[arg(long)]
    watch: bool,
}

/// Initialize the logging system with timestamp, level, and message formatting.
fn init_logger() {
    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] [{}] {}",
                chrono::Local::now().format("%H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter_level(LevelFilter::Info)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logger();

    let args = Args::parse();
    let config = ClientConfig::from_file(&args.config)?;
    let client = Arc::new(DetectClient::new(config.client.server_url.clone()));

    if args.status {
        let status = poll_once(&client).await;
        print_status(&status);
        return Ok(());
    }

    if args.watch {
        let interval = Duration::from_secs(config.polling.interval_secs);
        let poller = StatusPoller::new(client.clone(), interval);
        let status = poller.status();
        let _poll_task = poller.spawn();
        loop {
            tokio::time::sleep(interval).await;
            print_status(&*status.read().await);
            println!();
        }
    }

    if args.images.is_empty() {
        println!("{}", "No images to analyze".yellow());
        return Ok(());
    }

    info!(
        "Client '{}' submitting {} image(s) to {}",
        config.client.name,
        args.images.len(),
        config.client.server_url
    );

    let mut history = DetectionHistory::new();

    if args.batch {
        run_batch(&client, &args.images, &mut history).await?;
    } else {
        run_sequential(&client, &args.images, &mut history).await?;
    }

    if history.len() > 1 {
        print_history(&history);
    }

    Ok(())
}

/// Submit images one by one; the next request starts only after the previous
/// one resolved.
async fn run_sequential(
    client: &DetectClient,
    images: &[PathBuf],
    history: &mut DetectionHistory,
) -> Result<()> {
    for path in images {
        let (data, filename) = read_image(path)?;
        match client.analyze(data, &filename).await {
            Ok(result) => {
                print_result(&filename, &result);
                history.record(filename, result);
            }
            Err(e) => println!("{}", format!("{}: {}", filename, e).red()),
        }
    }
    Ok(())
}

async fn run_batch(
    client: &DetectClient,
    images: &[PathBuf],
    history: &mut DetectionHistory,
) -> Result<()> {
    let mut payload = Vec::with_capacity(images.len());
    for path in images {
        payload.push(read_image(path)?);
    }

    match client.analyze_batch(payload).await {
        Ok(batch) => {
            for item in batch.results {
                let name = item
                    .filename
                    .unwrap_or_else(|| format!("image #{}", item.index));
                match (item.result, item.error) {
                    (Some(result), _) => {
                        print_result(&name, &result);
                        history.record(name, result);
                    }
                    (None, Some(error)) => {
                        println!("{}", format!("{}: {}", name, error).red())
                    }
                    (None, None) => {
                        println!("{}", format!("{}: missing result", name).red())
                    }
                }
            }
        }
        Err(e) => println!("{}", format!("Batch failed: {}", e).red()),
    }
    Ok(())
}

fn read_image(path: &PathBuf) -> Result<(Vec<u8>, String)> {
    let data =
        std::fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("image")
        .to_string();
    Ok((data, filename))
}

fn print_result(name: &str, result: &DetectionResult) {
    println!("{}", name.to_string().cyan());
    for (i, line) in report::render_lines(result).iter().enumerate() {
        if i == 0 {
            let styled = if result.is_israeli_product {
                format!("✗ {}", line).red()
            } else {
                format!("✓ {}", line).green()
            };
            println!("  {}", styled);
        } else {
            println!("  {}", line);
        }
    }
    println!();
}

fn print_status(status: &SystemStatus) {
    if status.healthy {
        println!("Status: {}", "healthy".green());
    } else {
        println!("Status: {}", "unreachable or degraded".red());
    }
    println!("Model ready: {}", status.model_ready);
    if let Some(count) = status.brands_count {
        println!("Brands in database: {}", count);
    }
    if let Some(error) = &status.last_error {
        println!("Last error: {}", error.to_string().yellow());
    }
    println!("Checked at: {}", status.checked_at.format("%H:%M:%S"));
}

fn print_history(history: &DetectionHistory) {
    println!("{}", "Recent history (most recent first):".cyan());
    for entry in history.iter() {
        let band = report::ConfidenceBand::from_confidence(entry.result.confidence);
        let verdict = if entry.result.is_israeli_product {
            "affiliated"
        } else {
            "clear"
        };
        println!(
            "  {} -> {} ({:.0}%, {})",
            entry.filename,
            verdict,
            entry.result.confidence * 100.0,
            band.label()
        );
    }
}
