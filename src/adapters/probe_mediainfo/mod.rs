//! MediaInfo probe adapter
//!
//! Shells out to `mediainfo --Inform=<section>;<parameter>\n <file>` once per
//! queried field. MediaInfo prints one line per track, the first non-empty line
//! is taken as the value.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::domain::errors::*;
use crate::ports::*;

/// MediaInfo-based probe adapter
pub struct MediainfoAdapter {
    mediainfo_path: PathBuf,
}

impl MediainfoAdapter {
    /// Create adapter for a resolved mediainfo binary
    pub fn new(mediainfo_path: PathBuf) -> Self {
        Self { mediainfo_path }
    }

    /// Locate the tool on `PATH` (or accept an explicit path)
    pub fn locate(tool: &str) -> Result<Self, DomainError> {
        which::which(tool)
            .map(Self::new)
            .map_err(|_| DomainError::ToolMissing(tool.to_string()))
    }

    /// `--Inform` template for a field
    pub fn inform_template(field: ProbeField) -> &'static str {
        match field {
            ProbeField::ContainerFormat => "General;%Format%\\n",
            ProbeField::VideoCodec => "Video;%Format%\\n",
            ProbeField::VideoProfile => "Video;%Format_Profile%\\n",
            ProbeField::AudioCodec => "Audio;%Format%\\n",
            ProbeField::AudioChannels => "Audio;%Channels%\\n",
            ProbeField::Duration => "General;%Duration/String3%\\n",
        }
    }

    /// First non-empty line of the tool output
    pub fn first_value(stdout: &str) -> String {
        stdout
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or_default()
            .to_string()
    }
}

#[async_trait]
impl ProbePort for MediainfoAdapter {
    async fn query(&self, file: &Path, field: ProbeField) -> Result<String, DomainError> {
        let inform = format!("--Inform={}", Self::inform_template(field));
        let output = Command::new(&self.mediainfo_path)
            .arg(&inform)
            .arg(file)
            .output()
            .await
            .map_err(|e| DomainError::ProbeFailed(format!("failed to run mediainfo: {}", e)))?;

        if !output.status.success() {
            return Err(DomainError::ProbeFailed(format!(
                "mediainfo exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let value = Self::first_value(&String::from_utf8_lossy(&output.stdout));
        debug!(path = %file.display(), ?field, %value, "probed");
        Ok(value)
    }
}
