//! Configuration initialization and hierarchy management
//!
//! Precedence for the config directory: `--config` > `CASTREADY_CONFIG` >
//! `$HOME/.castready`. Settings come from `config.toml` inside that
//! directory, then command-line switches are folded in.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::adapters::ledger_file::LEDGER_FILE_NAME;
use crate::adapters::TomlConfigAdapter;
use crate::cli::Cli;
use crate::domain::errors::DomainError;
use crate::domain::model::Configuration;

/// Directory name used under `$HOME` when nothing else is given
pub const DEFAULT_CONFIG_DIR_NAME: &str = ".castready";

/// Pick the config directory and make sure it exists
pub fn resolve_config_dir(
    explicit: Option<&Path>,
    home: Option<OsString>,
) -> Result<PathBuf, DomainError> {
    let dir = match explicit {
        Some(dir) => dir.to_path_buf(),
        None => match home {
            Some(home) if !home.is_empty() => PathBuf::from(home).join(DEFAULT_CONFIG_DIR_NAME),
            _ => {
                return Err(DomainError::ConfigDir(
                    "HOME is not set; pass --config <DIR> or set CASTREADY_CONFIG".to_string(),
                ))
            }
        },
    };

    fs::create_dir_all(&dir)
        .map_err(|e| DomainError::ConfigDir(format!("cannot create {}: {}", dir.display(), e)))?;
    Ok(dir)
}

/// Build the immutable run configuration from settings and CLI switches
pub fn build_configuration(cli: &Cli) -> Result<Configuration, DomainError> {
    let config_dir = resolve_config_dir(cli.config.as_deref(), std::env::var_os("HOME"))?;
    configuration_from_dir(cli, config_dir)
}

/// Same as `build_configuration` for an already resolved directory
pub fn configuration_from_dir(cli: &Cli, config_dir: PathBuf) -> Result<Configuration, DomainError> {
    let settings = TomlConfigAdapter::new(&config_dir).load()?;

    let config = Configuration {
        registry: settings.registry(),
        defaults: settings.plan_defaults(),
        flags: cli.plan.flags(),
        on_success: cli.policy.resolve(settings.output.on_success),
        ledger_path: config_dir.join(LEDGER_FILE_NAME),
        config_dir,
        probe_tool: settings.tools.probe,
        encoder_tool: settings.tools.encoder,
    };

    info!(
        config_dir = %config.config_dir.display(),
        on_success = %config.on_success,
        flags = ?config.flags,
        "configuration ready"
    );
    Ok(config)
}
