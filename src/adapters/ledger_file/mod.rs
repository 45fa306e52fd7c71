//! Flat-file ledger adapter
//!
//! One absolute path per line, append-only. Existing entries are loaded when
//! the file is opened so `contains` works and duplicates are never appended.
//! Appends are not locked against a second concurrent run.

use std::collections::HashSet;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, info};

use crate::domain::errors::*;
use crate::ports::*;

/// File name of the ledger inside the config directory
pub const LEDGER_FILE_NAME: &str = "processed_files";

struct LedgerState {
    file: File,
    entries: HashSet<PathBuf>,
}

/// Flat-file ledger
pub struct FlatFileLedger {
    path: PathBuf,
    state: Mutex<LedgerState>,
}

impl FlatFileLedger {
    /// Open (creating if needed) the ledger at `path`
    pub fn open(path: &Path) -> Result<Self, DomainError> {
        let unwritable = |reason: String| DomainError::LedgerUnwritable {
            path: path.to_path_buf(),
            reason,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| unwritable(e.to_string()))?;
        }

        let entries: HashSet<PathBuf> = match fs::read(path) {
            Ok(content) => content
                .split(|&byte| byte == b'\n')
                .filter(|line| !line.is_empty())
                .map(|line| PathBuf::from(line_to_os(line)))
                .collect(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashSet::new(),
            Err(e) => return Err(unwritable(e.to_string())),
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| unwritable(e.to_string()))?;

        info!(path = %path.display(), entries = entries.len(), "ledger opened");
        Ok(Self {
            path: path.to_path_buf(),
            state: Mutex::new(LedgerState { file, entries }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Paths are stored byte for byte so distinct non-UTF-8 names stay distinct
#[cfg(unix)]
fn line_to_os(line: &[u8]) -> OsString {
    use std::os::unix::ffi::OsStrExt;
    std::ffi::OsStr::from_bytes(line).to_os_string()
}

#[cfg(not(unix))]
fn line_to_os(line: &[u8]) -> OsString {
    OsString::from(String::from_utf8_lossy(line).into_owned())
}

#[cfg(unix)]
fn path_to_line(path: &Path) -> Vec<u8> {
    use std::os::unix::ffi::OsStrExt;
    path.as_os_str().as_bytes().to_vec()
}

#[cfg(not(unix))]
fn path_to_line(path: &Path) -> Vec<u8> {
    path.to_string_lossy().into_owned().into_bytes()
}

impl LedgerPort for FlatFileLedger {
    fn record(&self, path: &Path) -> Result<(), DomainError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| DomainError::LedgerUnwritable {
                path: self.path.clone(),
                reason: "ledger lock poisoned".to_string(),
            })?;

        if state.entries.contains(path) {
            debug!(path = %path.display(), "already in ledger");
            return Ok(());
        }

        let mut line = path_to_line(path);
        line.push(b'\n');
        state
            .file
            .write_all(&line)
            .and_then(|_| state.file.flush())
            .map_err(|e| DomainError::LedgerUnwritable {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;
        state.entries.insert(path.to_path_buf());
        Ok(())
    }

    fn contains(&self, path: &Path) -> bool {
        self.state
            .lock()
            .map(|state| state.entries.contains(path))
            .unwrap_or(false)
    }
}
