// Console report adapter - Operator status lines on stdout

use std::path::Path;

use tracing::{info, warn};

use crate::domain::model::*;
use crate::ports::*;

/// Prints one block of status lines per file to stdout
#[derive(Debug, Default, Clone)]
pub struct ConsoleReporter;

impl ConsoleReporter {
    pub fn new() -> Self {
        Self
    }

    /// Status lines describing a probe result
    pub fn probe_lines(probe: &ProbeResult) -> Vec<String> {
        let shown = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
        let channels = probe
            .audio_channels
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".to_string());

        vec![
            format!("- General: {}", shown(&probe.container_format)),
            format!(
                "- Video: {} {}",
                shown(&probe.video_codec),
                probe.video_profile.as_deref().unwrap_or("")
            )
            .trim_end()
            .to_string(),
            format!("- Audio: {} ({} channels)", shown(&probe.audio_codec), channels),
            format!("- Duration: {}", shown(&probe.duration)),
        ]
    }

    /// Status line describing a plan
    pub fn plan_line(plan: &TranscodePlan) -> String {
        match plan {
            TranscodePlan::NoOpCompatible => "- file should be playable by Chromecast".to_string(),
            TranscodePlan::Transcode(spec) => format!(
                "- transcoding to {}: video {}, audio {}",
                spec.container, spec.video, spec.audio
            ),
        }
    }

    /// Status line describing an outcome
    pub fn outcome_line(outcome: &FileOutcome) -> String {
        match outcome {
            FileOutcome::Compatible { ledger_entry } => {
                format!("- recorded {}", ledger_entry.display())
            }
            FileOutcome::Converted(converted) => match &converted.backup {
                Some(backup) => format!(
                    "- success: wrote {}, original kept as {}",
                    converted.output.display(),
                    backup.display()
                ),
                None => format!("- success: wrote {}", converted.output.display()),
            },
            FileOutcome::Failed(failure) => format!("- failed: {}", failure),
            FileOutcome::Skipped(notice) => format!("- skipping: {}", notice),
        }
    }
}

impl ReportPort for ConsoleReporter {
    fn probed(&self, path: &Path, probe: &ProbeResult) {
        println!("===========");
        println!("Processing: {}", path.display());
        for line in Self::probe_lines(probe) {
            println!("{}", line);
        }
    }

    fn planned(&self, _path: &Path, plan: &TranscodePlan) {
        println!("{}", Self::plan_line(plan));
    }

    fn finished(&self, path: &Path, outcome: &FileOutcome) {
        match outcome {
            FileOutcome::Failed(failure) => {
                warn!(path = %path.display(), %failure, "conversion failed");
            }
            FileOutcome::Skipped(notice) => {
                // Skipped paths never reached `probed`, name them here
                println!("===========");
                println!("{}", path.display());
                info!(path = %path.display(), %notice, "skipped");
            }
            _ => {}
        }
        println!("{}", Self::outcome_line(outcome));
    }

    fn summary(&self, summary: &RunSummary) {
        println!("===========");
        println!("{}", summary);
        if summary.interrupted {
            println!("run interrupted");
        }
    }
}
