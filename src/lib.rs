//! castready library
//!
//! Batch re-encoder that makes video files playable on Chromecast. Each file
//! is probed, classified against allow/deny lists, and either recorded as
//! compatible or converted with only the incompatible streams re-encoded.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::errors::DomainError;
pub use domain::model::{Configuration, FileOutcome, RunSummary, TranscodePlan};
pub use error::{CastError, CastResult};
