/// Main entry point for the Addiction Tracker MCP server
///
/// This file sets up logging, parses command line arguments, and starts the MCP server.
/// The server listens for JSON-RPC requests over stdin/stdout following the MCP protocol.

use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use addiction_tracker::{AddictionTrackerServer, AppConfig, ConfigOverrides, Platform};

/// Command line arguments for the Addiction Tracker MCP server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the SQLite database file
    /// If not provided, uses a default location in the user's home directory
    #[arg(long)]
    database: Option<PathBuf>,

    /// Local user ID to act as (a stable one is created next to the database otherwise)
    #[arg(long)]
    user: Option<String>,

    /// Reminder delivery: "native" OS notifications or in-process "web" timers
    #[arg(long)]
    platform: Option<Platform>,

    /// Directory where copies of entry photos are kept
    #[arg(long)]
    photo_dir: Option<PathBuf>,

    /// Offset from UTC, in minutes, at which calendar days start for streaks
    #[arg(long, allow_negative_numbers = true)]
    utc_offset_minutes: Option<i32>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable verbose output (implies debug)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let log_level = if args.verbose {
        "debug"
    } else if args.debug {
        "info"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(format!("addiction_tracker={}", log_level))
        .with_writer(std::io::stderr) // stdout carries JSON-RPC
        .init();

    info!("Starting Addiction Tracker MCP server");

    let config = AppConfig::resolve(ConfigOverrides {
        database: args.database,
        user: args.user,
        platform: args.platform,
        photo_dir: args.photo_dir,
        utc_offset_minutes: args.utc_offset_minutes,
    })?;

    info!("Using database at: {}", config.database_path.display());
    info!(
        "Acting as user {} on the {} platform",
        config.user_id,
        config.platform.as_str()
    );

    let server = AddictionTrackerServer::new(config).await?;

    // Blocks until stdin is closed
    server.run().await?;

    info!("Addiction Tracker MCP server shutdown complete");
    Ok(())
}
