//! # Server Binary Entry Point
//!
//! Thin wrapper that configures and runs the detection service.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin server -- --config config/server.toml
//! ```
//!
//! The server will:
//! 1. Load configuration from the specified TOML file
//! 2. Build the detection engine (image processing, brand database, model)
//! 3. Serve the detection API on the configured address

use clap::Parser;
use env_logger::Builder;
use log::{info, LevelFilter};
use std::io::Write;
use std::sync::Arc;

use originscan::detection::{DetectionEngine, SignalModel};
use originscan::server::{router, AppState, ServerConfig};

/// Command-line arguments for the server binary
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the server configuration file (TOML format)
    ///
    /// Example: config/server.toml
    #[arg(short, long)]
    config: String,
}

/// Initialize the logging system with timestamp, level, and message formatting.
///
/// Logs are printed to stdout with INFO level by default.
/// Format: `[HH:MM:SS] [LEVEL] message`
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
async fn main() -> anyhow::Result<()> {
    init_logger();

    let args = Args::parse();
    let config = ServerConfig::from_file(&args.config)?;

    let model = SignalModel::new(config.model.weights.clone(), config.model.threshold);
    let engine = DetectionEngine::new(model, config.limits.max_image_bytes);
    let state = Arc::new(AppState::new(engine, config.limits.clone()));
    let app = router(state);

    info!(
        "🚀 Detection service starting on http://{}",
        config.server.address
    );
    info!(
        "📡 Analysis endpoint: http://{}/analyze",
        config.server.address
    );

    let listener = tokio::net::TcpListener::bind(&config.server.address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
