//! Shared fakes for integration tests
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use castready::adapters::{FlatFileLedger, LocalFsAdapter, Settings};
use castready::app::ConvertInteractor;
use castready::domain::errors::DomainError;
use castready::domain::model::*;
use castready::ports::*;

/// Probe answers keyed by file name
#[derive(Default)]
pub struct FakeProbe {
    answers: HashMap<String, HashMap<ProbeField, String>>,
}

impl FakeProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file: container, video codec, audio codec, channels
    pub fn with(mut self, file_name: &str, container: &str, video: &str, audio: &str, channels: &str) -> Self {
        let fields = HashMap::from([
            (ProbeField::ContainerFormat, container.to_string()),
            (ProbeField::VideoCodec, video.to_string()),
            (ProbeField::VideoProfile, String::new()),
            (ProbeField::AudioCodec, audio.to_string()),
            (ProbeField::AudioChannels, channels.to_string()),
            (ProbeField::Duration, "00:01:00.000".to_string()),
        ]);
        self.answers.insert(file_name.to_string(), fields);
        self
    }
}

#[async_trait]
impl ProbePort for FakeProbe {
    async fn query(&self, file: &Path, field: ProbeField) -> Result<String, DomainError> {
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        self.answers
            .get(&name)
            .and_then(|fields| fields.get(&field).cloned())
            .ok_or_else(|| DomainError::ProbeFailed(format!("no media info for {}", name)))
    }
}

/// Encoder that writes a fixed payload and reports a fixed status
pub struct FakeEncoder {
    status: EncodeStatus,
    calls: AtomicUsize,
    jobs: Mutex<Vec<EncodeJob>>,
}

pub const ENCODED: &[u8] = b"converted payload";

impl FakeEncoder {
    pub fn new(status: EncodeStatus) -> Self {
        Self {
            status,
            calls: AtomicUsize::new(0),
            jobs: Mutex::new(Vec::new()),
        }
    }

    pub fn succeeding() -> Self {
        Self::new(EncodeStatus::Succeeded)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn jobs(&self) -> Vec<EncodeJob> {
        self.jobs.lock().unwrap().clone()
    }
}

#[async_trait]
impl EncodePort for FakeEncoder {
    async fn encode(&self, job: &EncodeJob) -> Result<EncodeStatus, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.jobs.lock().unwrap().push(job.clone());
        // Partial output is written even when the encode "fails"
        std::fs::write(&job.output, ENCODED).unwrap();
        Ok(self.status)
    }
}

/// Reporter that remembers every outcome
#[derive(Default)]
pub struct RecordingReporter {
    pub outcomes: Mutex<Vec<(PathBuf, FileOutcome)>>,
    pub summaries: Mutex<Vec<RunSummary>>,
}

impl RecordingReporter {
    pub fn outcomes(&self) -> Vec<(PathBuf, FileOutcome)> {
        self.outcomes.lock().unwrap().clone()
    }
}

impl ReportPort for RecordingReporter {
    fn probed(&self, _path: &Path, _probe: &ProbeResult) {}

    fn planned(&self, _path: &Path, _plan: &TranscodePlan) {}

    fn finished(&self, path: &Path, outcome: &FileOutcome) {
        self.outcomes
            .lock()
            .unwrap()
            .push((path.to_path_buf(), outcome.clone()));
    }

    fn summary(&self, summary: &RunSummary) {
        self.summaries.lock().unwrap().push(summary.clone());
    }
}

/// Default settings with the given policy and flags, ledger under `config_dir`
pub fn configuration(config_dir: &Path, on_success: OnSuccess, flags: PlanFlags) -> Configuration {
    let settings = Settings::default();
    Configuration {
        registry: settings.registry(),
        defaults: settings.plan_defaults(),
        flags,
        on_success,
        config_dir: config_dir.to_path_buf(),
        ledger_path: config_dir.join("processed_files"),
        probe_tool: settings.tools.probe,
        encoder_tool: settings.tools.encoder,
    }
}

/// Everything a test needs to drive and inspect one run
pub struct Harness {
    pub interactor: ConvertInteractor,
    pub encoder: Arc<FakeEncoder>,
    pub reporter: Arc<RecordingReporter>,
    pub ledger_path: PathBuf,
}

pub fn harness(
    config: Configuration,
    probe: FakeProbe,
    encoder: FakeEncoder,
    interrupt: InterruptSignal,
) -> Harness {
    let encoder = Arc::new(encoder);
    let reporter = Arc::new(RecordingReporter::default());
    let ledger_path = config.ledger_path.clone();
    let ledger = FlatFileLedger::open(&ledger_path).unwrap();

    let interactor = ConvertInteractor::new(
        Arc::new(config),
        Arc::new(probe),
        Arc::clone(&encoder) as Arc<dyn EncodePort>,
        Arc::new(LocalFsAdapter::new()),
        Arc::new(ledger),
        Arc::clone(&reporter) as Arc<dyn ReportPort>,
        interrupt,
    );

    Harness {
        interactor,
        encoder,
        reporter,
        ledger_path,
    }
}

pub fn ledger_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}
