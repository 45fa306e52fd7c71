//! File-state manager
//!
//! Moves a finished temporary output into place according to the on-success
//! policy. Every step that touches the original is undone if a later step
//! fails, so the worst state a crash can leave behind is "old and new file
//! both present".

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::model::*;
use crate::domain::rules::*;
use crate::ports::*;

/// Applies the on-success policy to a converted file
pub struct FileStateManager {
    fs_port: Arc<dyn FsPort>,
    policy: OnSuccess,
}

impl FileStateManager {
    pub fn new(fs_port: Arc<dyn FsPort>, policy: OnSuccess) -> Self {
        Self { fs_port, policy }
    }

    /// Where the promoted output will end up
    pub fn final_output(&self, original: &Path, container: &str) -> PathBuf {
        final_output_path(original, container, self.policy)
    }

    /// Fail early when promotion or archiving would overwrite some other file
    pub fn check_destination(
        &self,
        original: &Path,
        container: &str,
    ) -> Result<PathBuf, ConversionFailure> {
        let destination = self.final_output(original, container);
        if destination != original && self.fs_port.path_kind(&destination) != PathKind::Missing {
            return Err(ConversionFailure::DestinationExists(destination));
        }
        if self.policy == OnSuccess::Archive {
            self.free_backup(original)?;
        }
        Ok(destination)
    }

    /// First backup name not taken by an existing file
    fn free_backup(&self, original: &Path) -> Result<PathBuf, ConversionFailure> {
        let [preferred, fallback] = backup_paths(original);
        if self.fs_port.path_kind(&preferred) == PathKind::Missing {
            Ok(preferred)
        } else if self.fs_port.path_kind(&fallback) == PathKind::Missing {
            debug!(taken = %preferred.display(), "backup name taken, using full file name");
            Ok(fallback)
        } else {
            Err(ConversionFailure::BackupExists(fallback))
        }
    }

    /// Promote `temp_output` and dispose of `original` per policy.
    ///
    /// Only called once the encoder reported success and the temporary
    /// output exists. On error the original is back where it started.
    pub fn finalize(
        &self,
        original: &Path,
        temp_output: &Path,
        container: &str,
    ) -> Result<ConvertedFile, ConversionFailure> {
        let destination = self.check_destination(original, container)?;

        let backup = match self.policy {
            OnSuccess::Archive => Some(self.archive(original, temp_output, &destination)?),
            OnSuccess::Delete => {
                self.promote(temp_output, &destination)?;
                if destination != original {
                    if let Err(e) = self.fs_port.delete_file(original) {
                        warn!(path = %original.display(), "could not delete original: {}", e);
                    }
                }
                None
            }
            OnSuccess::Keep => {
                self.promote(temp_output, &destination)?;
                None
            }
        };

        info!(
            source = %original.display(),
            output = %destination.display(),
            policy = %self.policy,
            "finalized"
        );
        Ok(ConvertedFile {
            source: original.to_path_buf(),
            output: destination,
            backup,
            policy: self.policy,
        })
    }

    /// Best-effort removal of a temporary output
    pub fn discard(&self, temp_output: &Path) {
        match self.fs_port.delete_file(temp_output) {
            Ok(()) => debug!(path = %temp_output.display(), "temporary output removed"),
            Err(e) => warn!(path = %temp_output.display(), "could not remove temporary output: {}", e),
        }
    }

    fn promote(&self, temp_output: &Path, destination: &Path) -> Result<(), ConversionFailure> {
        self.fs_port
            .move_file(temp_output, destination)
            .map_err(|e| ConversionFailure::Finalize(e.to_string()))
    }

    fn archive(
        &self,
        original: &Path,
        temp_output: &Path,
        destination: &Path,
    ) -> Result<PathBuf, ConversionFailure> {
        let backup = self.free_backup(original)?;

        self.fs_port
            .move_file(original, &backup)
            .map_err(|e| ConversionFailure::Finalize(e.to_string()))?;

        if let Err(e) = self.fs_port.move_file(temp_output, destination) {
            if let Err(undo) = self.fs_port.move_file(&backup, original) {
                warn!(
                    original = %original.display(),
                    backup = %backup.display(),
                    "could not restore original: {}",
                    undo
                );
            }
            return Err(ConversionFailure::Finalize(e.to_string()));
        }
        Ok(backup)
    }
}
