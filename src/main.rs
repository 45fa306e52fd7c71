//! castready
//!
//! Makes video files playable on Chromecast by re-encoding only what has to
//! change.
//!
//! # Usage
//!
//! ```bash
//! castready movie.avi
//! castready --mp4 --delete-on-success ~/Videos
//! castready --config ~/.config/castready --stereo -- ./-odd-name.mkv
//! ```

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use castready::cli::{commands, Cli};
use castready::error::CastError;

/// Main entry point for the castready CLI application
fn main() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    // RUST_LOG wins over --log-level; logs go to stderr, status lines to stdout
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    match runtime.block_on(commands::convert(cli)) {
        Ok(summary) => {
            info!(%summary, "castready completed");
            Ok(())
        }
        Err(e @ CastError::Interrupted) => {
            error!("{}", e);
            eprintln!("castready: {}", e);
            std::process::exit(e.exit_code());
        }
        Err(e) => Err(e.into()),
    }
}
