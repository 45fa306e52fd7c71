// Domain models - Core types and data structures

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::errors::DomainError;

/// Channel count assumed when the probe reports none ("assume multichannel")
pub const DEFAULT_CHANNEL_COUNT: u32 = 3;

/// Probed attribute that is classified against an allow/deny pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    ContainerFormat,
    VideoCodec,
    AudioCodec,
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeKind::ContainerFormat => write!(f, "container format"),
            AttributeKind::VideoCodec => write!(f, "video codec"),
            AttributeKind::AudioCodec => write!(f, "audio codec"),
        }
    }
}

/// Result of classifying a probed value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Supported,
    Unsupported,
}

/// A (supported, unsupported) pair of exact-match value sets
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowDenyList {
    pub supported: BTreeSet<String>,
    pub unsupported: BTreeSet<String>,
}

impl AllowDenyList {
    /// Create a list pair from any string iterables
    pub fn new<S, U>(supported: S, unsupported: U) -> Self
    where
        S: IntoIterator,
        S::Item: Into<String>,
        U: IntoIterator,
        U::Item: Into<String>,
    {
        Self {
            supported: supported.into_iter().map(Into::into).collect(),
            unsupported: unsupported.into_iter().map(Into::into).collect(),
        }
    }

    /// Every value may live in at most one of the two sets
    pub fn validate(&self, kind: AttributeKind) -> Result<(), DomainError> {
        match self.supported.intersection(&self.unsupported).next() {
            Some(value) => Err(DomainError::AmbiguousValue {
                kind,
                value: value.clone(),
            }),
            None => Ok(()),
        }
    }
}

/// Allow/deny registry for everything the plan builder classifies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registry {
    pub containers: AllowDenyList,
    pub video_codecs: AllowDenyList,
    pub audio_codecs: AllowDenyList,
    /// Lower-cased file extensions treated as video files
    pub extensions: BTreeSet<String>,
}

impl Registry {
    /// Create a registry; extensions are lower-cased on the way in
    pub fn new<E>(
        containers: AllowDenyList,
        video_codecs: AllowDenyList,
        audio_codecs: AllowDenyList,
        extensions: E,
    ) -> Self
    where
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        Self {
            containers,
            video_codecs,
            audio_codecs,
            extensions: extensions
                .into_iter()
                .map(|ext| ext.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// Check all three pairs for overlapping entries
    pub fn validate(&self) -> Result<(), DomainError> {
        self.containers.validate(AttributeKind::ContainerFormat)?;
        self.video_codecs.validate(AttributeKind::VideoCodec)?;
        self.audio_codecs.validate(AttributeKind::AudioCodec)
    }

    /// Extension check, case-insensitive
    pub fn is_video_file(&self, path: &Path) -> bool {
        lowercase_extension(path)
            .map(|ext| self.extensions.contains(&ext))
            .unwrap_or(false)
    }
}

/// Lower-cased extension of a path, if it has one
pub fn lowercase_extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
}

/// Encoder name plus the raw arguments passed after it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderPreset {
    pub codec: String,
    #[serde(default)]
    pub options: Vec<String>,
}

impl EncoderPreset {
    pub fn new<I, S>(codec: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            codec: codec.into(),
            options: options.into_iter().map(Into::into).collect(),
        }
    }
}

/// Targets used whenever something has to be re-encoded or re-wrapped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanDefaults {
    pub container: String,
    pub video: EncoderPreset,
    pub audio: EncoderPreset,
}

/// Operator switches that influence planning
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanFlags {
    pub force_video_encode: bool,
    pub force_audio_encode: bool,
    pub downmix_stereo: bool,
    pub container_override: Option<String>,
}

/// What happens to the original file after a successful conversion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnSuccess {
    /// Rename the original to `<stem>.bak` (or `<original>.bak` if taken)
    #[default]
    Archive,
    /// Remove the original
    Delete,
    /// Leave the original and write `<original>-chromecast.<container>`
    Keep,
}

impl fmt::Display for OnSuccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OnSuccess::Archive => write!(f, "archive"),
            OnSuccess::Delete => write!(f, "delete"),
            OnSuccess::Keep => write!(f, "keep"),
        }
    }
}

/// Immutable run configuration, built once at startup
#[derive(Debug, Clone)]
pub struct Configuration {
    pub registry: Registry,
    pub defaults: PlanDefaults,
    pub flags: PlanFlags,
    pub on_success: OnSuccess,
    pub config_dir: PathBuf,
    pub ledger_path: PathBuf,
    pub probe_tool: String,
    pub encoder_tool: String,
}

/// Everything the probe tool reported about one file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeResult {
    pub container_format: Option<String>,
    pub video_codec: Option<String>,
    /// Informational only
    pub video_profile: Option<String>,
    pub audio_codec: Option<String>,
    pub audio_channels: Option<u32>,
    /// Human-readable duration, informational only
    pub duration: Option<String>,
}

impl ProbeResult {
    /// Empty or whitespace-only probe output means "absent"
    pub fn field(raw: &str) -> Option<String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    /// Parse a channel count such as "6" or "8 / 6"; the leading number wins
    pub fn parse_channels(raw: &str) -> Option<u32> {
        let digits: String = raw
            .trim()
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        digits.parse().ok()
    }

    /// Channel count with the multichannel default applied
    pub fn channel_count(&self) -> u32 {
        self.audio_channels.unwrap_or(DEFAULT_CHANNEL_COUNT)
    }
}

/// Per-stream decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamAction {
    Copy,
    Encode(EncoderPreset),
}

impl StreamAction {
    pub fn is_copy(&self) -> bool {
        matches!(self, StreamAction::Copy)
    }
}

impl fmt::Display for StreamAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamAction::Copy => write!(f, "copy"),
            StreamAction::Encode(preset) => write!(f, "encode with {}", preset.codec),
        }
    }
}

/// Concrete conversion to run for one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeSpec {
    /// Output container, used as file extension and muxer hint
    pub container: String,
    pub video: StreamAction,
    pub audio: StreamAction,
}

/// Outcome of planning
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscodePlan {
    /// Container, video and audio are already playable
    NoOpCompatible,
    Transcode(TranscodeSpec),
}

/// Lifecycle of a file while it is being converted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileState {
    Untouched,
    Converting { temp_output: PathBuf },
    Converted { output: PathBuf },
    Failed,
}

/// Result of a successful conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedFile {
    pub source: PathBuf,
    pub output: PathBuf,
    /// Where the original went under the archive policy
    pub backup: Option<PathBuf>,
    pub policy: OnSuccess,
}

/// Per-file conversion failure; the original is left untouched
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionFailure {
    #[error("encoder exited with status {}", exit_code_text(.code))]
    EncoderExited { code: Option<i32> },

    #[error("conversion interrupted")]
    Interrupted,

    #[error("encoder could not run: {0}")]
    EncoderUnavailable(String),

    #[error("encoder reported success but {0} is missing")]
    MissingOutput(PathBuf),

    #[error("destination {0} already exists")]
    DestinationExists(PathBuf),

    /// Every backup name is occupied; existing backups are never replaced
    #[error("backup {0} already exists")]
    BackupExists(PathBuf),

    #[error("could not move files into place: {0}")]
    Finalize(String),
}

fn exit_code_text(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "unknown (killed by signal)".to_string(),
    }
}

/// Reason a path was not processed; informational
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipNotice {
    UnsupportedExtension,
    NotFound,
    NotFileOrDirectory,
    Unreadable(String),
}

impl fmt::Display for SkipNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipNotice::UnsupportedExtension => write!(f, "not a video file extension"),
            SkipNotice::NotFound => write!(f, "file not found"),
            SkipNotice::NotFileOrDirectory => write!(f, "neither a file nor a directory"),
            SkipNotice::Unreadable(reason) => write!(f, "could not probe: {}", reason),
        }
    }
}

/// Final state of one input path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Already playable; the ledger entry is attached
    Compatible { ledger_entry: PathBuf },
    Converted(ConvertedFile),
    Failed(ConversionFailure),
    Skipped(SkipNotice),
}

/// Counters for the end-of-run status line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub compatible: usize,
    pub converted: usize,
    pub failed: usize,
    pub skipped: usize,
    pub interrupted: bool,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &FileOutcome) {
        match outcome {
            FileOutcome::Compatible { .. } => self.compatible += 1,
            FileOutcome::Converted(_) => self.converted += 1,
            FileOutcome::Failed(ConversionFailure::Interrupted) => {
                self.failed += 1;
                self.interrupted = true;
            }
            FileOutcome::Failed(_) => self.failed += 1,
            FileOutcome::Skipped(_) => self.skipped += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.compatible + self.converted + self.failed + self.skipped
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} files: {} compatible, {} converted, {} failed, {} skipped",
            self.total(),
            self.compatible,
            self.converted,
            self.failed,
            self.skipped
        )
    }
}
