// Local filesystem adapter - File system operations through std::fs

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::errors::*;
use crate::ports::*;

/// Local filesystem adapter
#[derive(Debug, Default, Clone)]
pub struct LocalFsAdapter;

impl LocalFsAdapter {
    /// Create new local filesystem adapter
    pub fn new() -> Self {
        Self
    }
}

impl FsPort for LocalFsAdapter {
    fn path_kind(&self, path: &Path) -> PathKind {
        // symlink_metadata: links are reported as Other instead of followed
        match fs::symlink_metadata(path) {
            Ok(meta) if meta.is_file() => PathKind::File,
            Ok(meta) if meta.is_dir() => PathKind::Directory,
            Ok(meta) if meta.file_type().is_symlink() => match fs::metadata(path) {
                Ok(target) if target.is_file() => PathKind::File,
                Ok(target) if target.is_dir() => PathKind::Directory,
                Ok(_) => PathKind::Other,
                Err(_) => PathKind::Missing,
            },
            Ok(_) => PathKind::Other,
            Err(_) => PathKind::Missing,
        }
    }

    fn move_file(&self, from: &Path, to: &Path) -> Result<(), DomainError> {
        debug!(from = %from.display(), to = %to.display(), "rename");
        fs::rename(from, to).map_err(|e| {
            DomainError::FsFail(format!(
                "Failed to move {} to {}: {}",
                from.display(),
                to.display(),
                e
            ))
        })
    }

    fn delete_file(&self, path: &Path) -> Result<(), DomainError> {
        match fs::remove_file(path) {
            Ok(()) => {
                debug!(path = %path.display(), "deleted");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DomainError::FsFail(format!(
                "Failed to delete {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn resolve_path(&self, path: &Path) -> Result<PathBuf, DomainError> {
        fs::canonicalize(path).map_err(|e| {
            DomainError::FsFail(format!("Failed to resolve {}: {}", path.display(), e))
        })
    }
}
