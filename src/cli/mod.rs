//! CLI module for castready
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{ArgAction, Parser};

pub mod args;
pub mod commands;

/// castready - make video files playable on Chromecast
///
/// Probes each file, copies whatever streams are already playable and
/// re-encodes the rest. Directories are processed recursively.
#[derive(Parser, Debug)]
#[command(name = "castready")]
#[command(about = "Make video files playable on Chromecast")]
#[command(version)]
#[command(disable_help_flag = true)]
pub struct Cli {
    #[command(flatten)]
    pub plan: args::PlanArgs,

    #[command(flatten)]
    pub policy: args::PolicyArgs,

    /// Configuration directory (settings file and processed-files ledger)
    #[arg(long, value_name = "DIR", env = "CASTREADY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Logging level used when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    pub log_level: String,

    /// Print help
    #[arg(short = 'h', long, short_alias = '?', action = ArgAction::Help)]
    pub help: Option<bool>,

    /// Files or directories to process
    #[arg(required = true, value_name = "PATH")]
    pub paths: Vec<PathBuf>,
}
