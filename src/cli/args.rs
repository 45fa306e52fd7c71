//! Command-line argument definitions

use clap::Args;

use crate::domain::model::{OnSuccess, PlanFlags};

/// Switches that change how files are planned
#[derive(Args, Debug, Default)]
pub struct PlanArgs {
    /// Write Matroska output when the container has to change
    #[arg(long, overrides_with = "mp4")]
    pub mkv: bool,

    /// Write MPEG-4 output when the container has to change
    #[arg(long, overrides_with = "mkv")]
    pub mp4: bool,

    /// Re-encode video even when the codec is supported
    #[arg(long)]
    pub force_vencode: bool,

    /// Re-encode audio even when the codec is supported
    #[arg(long)]
    pub force_aencode: bool,

    /// Leave multichannel audio as it is
    #[arg(long)]
    pub stereo: bool,
}

impl PlanArgs {
    /// Container requested on the command line, if any
    pub fn container_override(&self) -> Option<String> {
        if self.mp4 {
            Some("mp4".to_string())
        } else if self.mkv {
            Some("mkv".to_string())
        } else {
            None
        }
    }

    pub fn flags(&self) -> PlanFlags {
        PlanFlags {
            force_video_encode: self.force_vencode,
            force_audio_encode: self.force_aencode,
            downmix_stereo: self.stereo,
            container_override: self.container_override(),
        }
    }
}

/// Switches that decide what happens to originals
#[derive(Args, Debug, Default)]
pub struct PolicyArgs {
    /// Delete the original after a successful conversion
    #[arg(long)]
    pub delete_on_success: bool,

    /// Keep the original and write <file>-chromecast.<container> next to it
    #[arg(long)]
    pub keep_original: bool,
}

impl PolicyArgs {
    /// Command-line policy wins over the settings file; delete wins over keep
    pub fn resolve(&self, configured: OnSuccess) -> OnSuccess {
        if self.delete_on_success {
            OnSuccess::Delete
        } else if self.keep_original {
            OnSuccess::Keep
        } else {
            configured
        }
    }
}
