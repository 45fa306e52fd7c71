use std::sync::Arc;

use crate::adapters::{
    ConsoleReporter, FfmpegAdapter, FlatFileLedger, LocalFsAdapter, MediainfoAdapter,
};
use crate::app::convert_interactor::ConvertInteractor;
use crate::domain::errors::DomainError;
use crate::domain::model::Configuration;
use crate::ports::{EncodePort, FsPort, InterruptSignal, LedgerPort, ProbePort, ReportPort};

pub trait AppContainer: Send + Sync {
    fn convert_interactor(&self) -> Arc<ConvertInteractor>;
}

pub struct DefaultAppContainer {
    convert_interactor: Arc<ConvertInteractor>,
}

impl DefaultAppContainer {
    /// Wire the real adapters. Fails when a tool is missing or the ledger
    /// cannot be opened, before any file is touched.
    pub fn new(config: Configuration, interrupt: InterruptSignal) -> Result<Self, DomainError> {
        let probe_port = Arc::new(MediainfoAdapter::locate(&config.probe_tool)?);
        let encode_port = Arc::new(FfmpegAdapter::locate(&config.encoder_tool, interrupt.clone())?);
        let fs_port = Arc::new(LocalFsAdapter::new());
        let ledger_port = Arc::new(FlatFileLedger::open(&config.ledger_path)?);
        let report_port = Arc::new(ConsoleReporter::new());

        let convert_interactor = Arc::new(ConvertInteractor::new(
            Arc::new(config),
            probe_port as Arc<dyn ProbePort>,
            encode_port as Arc<dyn EncodePort>,
            fs_port as Arc<dyn FsPort>,
            ledger_port as Arc<dyn LedgerPort>,
            report_port as Arc<dyn ReportPort>,
            interrupt,
        ));

        Ok(Self { convert_interactor })
    }
}

impl AppContainer for DefaultAppContainer {
    fn convert_interactor(&self) -> Arc<ConvertInteractor> {
        Arc::clone(&self.convert_interactor)
    }
}
