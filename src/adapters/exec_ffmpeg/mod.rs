//! FFmpeg execution adapter
//!
//! Runs one ffmpeg process per conversion. All input streams are mapped
//! except data streams, subtitles are always written as SRT, and video and
//! audio are copied or re-encoded independently. The process inherits the
//! terminal so ffmpeg's own `-stats` line is the progress display.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// FFmpeg-based execution adapter
pub struct FfmpegAdapter {
    ffmpeg_path: PathBuf,
    interrupt: InterruptSignal,
}

impl FfmpegAdapter {
    /// Create adapter for a resolved ffmpeg binary
    pub fn new(ffmpeg_path: PathBuf, interrupt: InterruptSignal) -> Self {
        Self {
            ffmpeg_path,
            interrupt,
        }
    }

    /// Locate the tool on `PATH` (or accept an explicit path)
    pub fn locate(tool: &str, interrupt: InterruptSignal) -> Result<Self, DomainError> {
        which::which(tool)
            .map(|path| Self::new(path, interrupt))
            .map_err(|_| DomainError::ToolMissing(tool.to_string()))
    }

    /// Build the ffmpeg argument list for a job
    pub fn build_args(job: &EncodeJob) -> Vec<String> {
        let mut args = vec![
            "-nostdin".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-stats".to_string(),
            "-i".to_string(),
            job.input.to_string_lossy().to_string(),
            "-map".to_string(),
            "0".to_string(),
            "-map".to_string(),
            "-0:d".to_string(),
            "-c:s".to_string(),
            "srt".to_string(),
        ];

        Self::push_stream_args(&mut args, "-c:v", &job.video);
        Self::push_stream_args(&mut args, "-c:a", &job.audio);

        args.push(job.output.to_string_lossy().to_string());
        args
    }

    fn push_stream_args(args: &mut Vec<String>, codec_flag: &str, action: &StreamAction) {
        args.push(codec_flag.to_string());
        match action {
            StreamAction::Copy => args.push("copy".to_string()),
            StreamAction::Encode(preset) => {
                args.push(preset.codec.clone());
                args.extend(preset.options.iter().cloned());
            }
        }
    }
}

#[async_trait]
impl EncodePort for FfmpegAdapter {
    async fn encode(&self, job: &EncodeJob) -> Result<EncodeStatus, DomainError> {
        let args = Self::build_args(job);
        debug!(ffmpeg = %self.ffmpeg_path.display(), ?args, "spawning encoder");

        let mut child = Command::new(&self.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| DomainError::EncoderFailed(format!("failed to start ffmpeg: {}", e)))?;

        tokio::select! {
            status = child.wait() => {
                let status = status
                    .map_err(|e| DomainError::EncoderFailed(format!("failed to wait for ffmpeg: {}", e)))?;
                if status.success() {
                    Ok(EncodeStatus::Succeeded)
                } else if self.interrupt.is_raised() {
                    // ffmpeg shares the terminal and usually sees Ctrl-C first
                    Ok(EncodeStatus::Interrupted)
                } else {
                    warn!(input = %job.input.display(), %status, "ffmpeg failed");
                    Ok(EncodeStatus::Failed { code: status.code() })
                }
            }
            _ = self.interrupt.raised() => {
                info!(input = %job.input.display(), "interrupt received, stopping ffmpeg");
                if let Err(e) = child.kill().await {
                    warn!("failed to kill ffmpeg: {}", e);
                }
                Ok(EncodeStatus::Interrupted)
            }
        }
    }
}
