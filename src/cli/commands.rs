//! Command implementations

use tracing::{info, warn};

use crate::app::container::{AppContainer, DefaultAppContainer};
use crate::cli::Cli;
use crate::config_initialization::build_configuration;
use crate::domain::model::RunSummary;
use crate::error::{CastError, CastResult};
use crate::ports::{InterruptSignal, InterruptTrigger};

/// Execute the conversion run for every path on the command line
pub async fn convert(cli: Cli) -> CastResult<RunSummary> {
    let config = build_configuration(&cli)?;

    let (trigger, interrupt) = InterruptSignal::pair();
    tokio::spawn(watch_ctrl_c(trigger));

    let container = DefaultAppContainer::new(config, interrupt)?;
    info!(paths = cli.paths.len(), "starting run");

    let summary = container.convert_interactor().run(&cli.paths).await?;
    if summary.interrupted {
        return Err(CastError::Interrupted);
    }
    Ok(summary)
}

/// Raise the interrupt signal on the first Ctrl-C
async fn watch_ctrl_c(trigger: InterruptTrigger) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            warn!("interrupt received, aborting the running encode and stopping");
            trigger.raise();
        }
        Err(e) => warn!("cannot listen for Ctrl-C: {}", e),
    }
}
