// Ports - Interface definitions (contracts)

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::watch;

use crate::domain::errors::*;
use crate::domain::model::*;

/// Single attribute the probe tool can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeField {
    ContainerFormat,
    VideoCodec,
    VideoProfile,
    AudioCodec,
    AudioChannels,
    Duration,
}

impl ProbeField {
    pub const ALL: [ProbeField; 6] = [
        ProbeField::ContainerFormat,
        ProbeField::VideoCodec,
        ProbeField::VideoProfile,
        ProbeField::AudioCodec,
        ProbeField::AudioChannels,
        ProbeField::Duration,
    ];
}

/// Port for media file probing
#[async_trait]
pub trait ProbePort: Send + Sync {
    /// Query one attribute; an empty string means the attribute is absent
    async fn query(&self, file: &Path, field: ProbeField) -> Result<String, DomainError>;
}

/// Query every field once and assemble the immutable probe result
pub async fn probe_media(probe: &dyn ProbePort, file: &Path) -> Result<ProbeResult, DomainError> {
    let mut result = ProbeResult::default();
    for field in ProbeField::ALL {
        let raw = probe.query(file, field).await?;
        match field {
            ProbeField::ContainerFormat => result.container_format = ProbeResult::field(&raw),
            ProbeField::VideoCodec => result.video_codec = ProbeResult::field(&raw),
            ProbeField::VideoProfile => result.video_profile = ProbeResult::field(&raw),
            ProbeField::AudioCodec => result.audio_codec = ProbeResult::field(&raw),
            ProbeField::AudioChannels => result.audio_channels = ProbeResult::parse_channels(&raw),
            ProbeField::Duration => result.duration = ProbeResult::field(&raw),
        }
    }
    Ok(result)
}

/// Everything the encoder needs for one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeJob {
    pub input: PathBuf,
    pub output: PathBuf,
    pub video: StreamAction,
    pub audio: StreamAction,
}

/// How the encoder process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeStatus {
    Succeeded,
    Failed { code: Option<i32> },
    Interrupted,
}

/// Port for running the external encoder
#[async_trait]
pub trait EncodePort: Send + Sync {
    /// Run the encoder to completion. Blocks for as long as the encode takes.
    async fn encode(&self, job: &EncodeJob) -> Result<EncodeStatus, DomainError>;
}

/// What a path points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    File,
    Directory,
    Other,
    Missing,
}

/// Port for file system operations
pub trait FsPort: Send + Sync {
    /// Classify a path without following it further
    fn path_kind(&self, path: &Path) -> PathKind;

    /// Check if a file exists
    fn file_exists(&self, path: &Path) -> bool {
        self.path_kind(path) == PathKind::File
    }

    /// Rename a file, replacing the destination if present
    fn move_file(&self, from: &Path, to: &Path) -> Result<(), DomainError>;

    /// Delete a file; a missing file is not an error
    fn delete_file(&self, path: &Path) -> Result<(), DomainError>;

    /// Resolve a path to an absolute, normalized path
    fn resolve_path(&self, path: &Path) -> Result<PathBuf, DomainError>;
}

/// Port for the processed-files ledger
pub trait LedgerPort: Send + Sync {
    /// Record an absolute path; recording the same path twice is a no-op
    fn record(&self, path: &Path) -> Result<(), DomainError>;

    /// Whether the path was recorded in this or an earlier run
    fn contains(&self, path: &Path) -> bool;
}

/// Port for operator-facing status lines
pub trait ReportPort: Send + Sync {
    /// A file was probed
    fn probed(&self, path: &Path, probe: &ProbeResult);

    /// A plan was chosen for a file
    fn planned(&self, path: &Path, plan: &TranscodePlan);

    /// A path finished processing
    fn finished(&self, path: &Path, outcome: &FileOutcome);

    /// The whole run finished
    fn summary(&self, summary: &RunSummary);
}

/// Shared Ctrl-C flag, raised once and never cleared
#[derive(Debug, Clone)]
pub struct InterruptSignal {
    rx: watch::Receiver<bool>,
}

/// Raising side of an `InterruptSignal`
#[derive(Debug)]
pub struct InterruptTrigger {
    tx: watch::Sender<bool>,
}

impl InterruptSignal {
    /// Create a connected trigger/signal pair
    pub fn pair() -> (InterruptTrigger, InterruptSignal) {
        let (tx, rx) = watch::channel(false);
        (InterruptTrigger { tx }, InterruptSignal { rx })
    }

    /// A signal that is never raised
    pub fn never() -> InterruptSignal {
        let (trigger, signal) = Self::pair();
        // The receiver keeps working after the sender is gone
        drop(trigger);
        signal
    }

    pub fn is_raised(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the signal is raised; pending forever otherwise
    pub async fn raised(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|raised| *raised).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

impl InterruptTrigger {
    pub fn raise(&self) {
        self.tx.send_replace(true);
    }
}
