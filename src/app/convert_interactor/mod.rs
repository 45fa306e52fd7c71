// Convert interactor - Orchestrates the classify, transcode, record pipeline

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::app::executor::TranscodeExecutor;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::ports::*;

/// Interactor for the batch conversion use case
pub struct ConvertInteractor {
    config: Arc<Configuration>,
    probe_port: Arc<dyn ProbePort>,
    fs_port: Arc<dyn FsPort>,
    ledger_port: Arc<dyn LedgerPort>,
    report_port: Arc<dyn ReportPort>,
    executor: TranscodeExecutor,
    interrupt: InterruptSignal,
}

impl ConvertInteractor {
    /// Create new convert interactor with injected ports
    pub fn new(
        config: Arc<Configuration>,
        probe_port: Arc<dyn ProbePort>,
        encode_port: Arc<dyn EncodePort>,
        fs_port: Arc<dyn FsPort>,
        ledger_port: Arc<dyn LedgerPort>,
        report_port: Arc<dyn ReportPort>,
        interrupt: InterruptSignal,
    ) -> Self {
        let executor =
            TranscodeExecutor::new(encode_port, Arc::clone(&fs_port), config.on_success);
        Self {
            config,
            probe_port,
            fs_port,
            ledger_port,
            report_port,
            executor,
            interrupt,
        }
    }

    /// Process every path in order; directories are walked recursively.
    ///
    /// Per-file failures and skips are counted and reported. A `DomainError`
    /// stops the run at once. After an interrupt no further file is started.
    pub async fn run(&self, paths: &[PathBuf]) -> Result<RunSummary, DomainError> {
        let mut summary = RunSummary::default();

        for path in paths {
            if self.stop_requested(&mut summary) {
                break;
            }

            match self.fs_port.path_kind(path) {
                PathKind::Directory => {
                    for entry in self.walk(path) {
                        if self.stop_requested(&mut summary) {
                            break;
                        }
                        let outcome = match entry {
                            Ok(file) => self.process_file(&file).await?,
                            Err((file, reason)) => {
                                let outcome = FileOutcome::Skipped(SkipNotice::Unreadable(reason));
                                self.settle(&mut summary, &file, &outcome);
                                continue;
                            }
                        };
                        summary.record(&outcome);
                    }
                }
                _ => {
                    let outcome = self.process_file(path).await?;
                    summary.record(&outcome);
                }
            }
        }

        info!(%summary, interrupted = summary.interrupted, "run finished");
        self.report_port.summary(&summary);
        Ok(summary)
    }

    /// Classify, plan and (if needed) convert a single file.
    ///
    /// The outcome is reported before it is returned.
    pub async fn process_file(&self, path: &Path) -> Result<FileOutcome, DomainError> {
        let outcome = self.process_file_inner(path).await?;
        self.report_port.finished(path, &outcome);
        Ok(outcome)
    }

    async fn process_file_inner(&self, path: &Path) -> Result<FileOutcome, DomainError> {
        match self.fs_port.path_kind(path) {
            PathKind::File => {}
            PathKind::Missing => return Ok(FileOutcome::Skipped(SkipNotice::NotFound)),
            PathKind::Directory | PathKind::Other => {
                return Ok(FileOutcome::Skipped(SkipNotice::NotFileOrDirectory))
            }
        }

        if !self.config.registry.is_video_file(path) {
            return Ok(FileOutcome::Skipped(SkipNotice::UnsupportedExtension));
        }

        let probe = match probe_media(self.probe_port.as_ref(), path).await {
            Ok(probe) => probe,
            Err(e) if !e.is_fatal() => {
                warn!(path = %path.display(), "probe failed: {}", e);
                return Ok(FileOutcome::Skipped(SkipNotice::Unreadable(e.to_string())));
            }
            Err(e) => return Err(e),
        };
        self.report_port.probed(path, &probe);

        let plan = PlanBuilder::from_config(&self.config).build(path, &probe)?;
        debug!(path = %path.display(), ?plan, "plan built");
        self.report_port.planned(path, &plan);

        match plan {
            TranscodePlan::NoOpCompatible => {
                let ledger_entry = self.record(path)?;
                Ok(FileOutcome::Compatible { ledger_entry })
            }
            TranscodePlan::Transcode(spec) => match self.executor.execute(path, &spec).await {
                Ok(converted) => {
                    self.record(&converted.output)?;
                    Ok(FileOutcome::Converted(converted))
                }
                Err(failure) => Ok(FileOutcome::Failed(failure)),
            },
        }
    }

    /// Append the absolute form of `path` to the ledger
    fn record(&self, path: &Path) -> Result<PathBuf, DomainError> {
        let absolute = self.fs_port.resolve_path(path)?;
        if self.ledger_port.contains(&absolute) {
            debug!(path = %absolute.display(), "already in ledger");
        }
        self.ledger_port.record(&absolute)?;
        Ok(absolute)
    }

    /// Regular files below `dir`, sorted by name, symlinks not followed.
    /// Collected up front so outputs written during the run are not picked up.
    fn walk(&self, dir: &Path) -> Vec<Result<PathBuf, (PathBuf, String)>> {
        WalkDir::new(dir)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) if entry.file_type().is_file() => Some(Ok(entry.into_path())),
                Ok(_) => None,
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| dir.to_path_buf());
                    warn!(path = %path.display(), "cannot walk: {}", e);
                    Some(Err((path, e.to_string())))
                }
            })
            .collect()
    }

    fn stop_requested(&self, summary: &mut RunSummary) -> bool {
        if self.interrupt.is_raised() {
            summary.interrupted = true;
        }
        summary.interrupted
    }

    /// Report and count an outcome produced outside `process_file`
    fn settle(&self, summary: &mut RunSummary, path: &Path, outcome: &FileOutcome) {
        self.report_port.finished(path, outcome);
        summary.record(outcome);
    }
}
