//! Error handling module for castready

use thiserror::Error;

use crate::domain::errors::DomainError;

/// Exit status for a run stopped by Ctrl-C
pub const EXIT_INTERRUPTED: i32 = 130;

/// Main error type for castready runs
#[derive(Error, Debug)]
pub enum CastError {
    /// Configuration, tool or ledger problem that stops the run
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The operator pressed Ctrl-C
    #[error("Interrupted, remaining files were not processed")]
    Interrupted,
}

impl CastError {
    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CastError::Interrupted => EXIT_INTERRUPTED,
            CastError::Domain(_) => 1,
        }
    }
}

/// Result type alias for castready operations
pub type CastResult<T> = std::result::Result<T, CastError>;
