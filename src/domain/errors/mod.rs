// Domain errors - Error types for the domain layer

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::model::AttributeKind;

/// Domain-specific error types
///
/// Every variant except `ProbeFailed` aborts the whole run. Per-file encode
/// problems are not errors at this level, see `ConversionFailure`.
#[derive(Debug, Clone, Error)]
pub enum DomainError {
    /// Probed value is in neither the supported nor the unsupported list
    #[error("unknown {kind} '{value}': add it to the supported or unsupported {kind} list")]
    UnknownValue { kind: AttributeKind, value: String },

    /// A value appears in both lists of one pair
    #[error("{kind} '{value}' is listed as both supported and unsupported")]
    AmbiguousValue { kind: AttributeKind, value: String },

    /// Required external tool is not installed
    #[error("required tool '{0}' was not found in PATH")]
    ToolMissing(String),

    /// Configuration directory could not be determined or created
    #[error("config directory unavailable: {0}")]
    ConfigDir(String),

    /// Settings file exists but cannot be read or parsed
    #[error("invalid configuration in {path}: {reason}")]
    BadConfig { path: PathBuf, reason: String },

    /// Ledger file cannot be opened or appended to
    #[error("ledger {path} is not writable: {reason}")]
    LedgerUnwritable { path: PathBuf, reason: String },

    /// Probe tool failed on a single file
    #[error("probe failed: {0}")]
    ProbeFailed(String),

    /// Encoder process could not be started or awaited
    #[error("encoder error: {0}")]
    EncoderFailed(String),

    /// File system operation failed
    #[error("file system error: {0}")]
    FsFail(String),
}

impl DomainError {
    /// Build an unknown-value error for the given attribute
    pub fn unknown(kind: AttributeKind, value: impl Into<String>) -> Self {
        Self::UnknownValue {
            kind,
            value: value.into(),
        }
    }

    /// Whether this error must stop the run instead of skipping one file
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::ProbeFailed(_))
    }
}
