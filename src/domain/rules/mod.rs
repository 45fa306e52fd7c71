// Domain rules - Business logic and policies

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::domain::errors::*;
use crate::domain::model::*;

/// Classify a probed value against one allow/deny pair.
///
/// Comparison is exact: `"aac"` and `"AAC"` are different values. A value in
/// neither set is a configuration gap and fails with `UnknownValue`.
pub fn classify(
    kind: AttributeKind,
    value: &str,
    list: &AllowDenyList,
) -> Result<Verdict, DomainError> {
    if list.supported.contains(value) {
        Ok(Verdict::Supported)
    } else if list.unsupported.contains(value) {
        Ok(Verdict::Unsupported)
    } else {
        Err(DomainError::unknown(kind, value))
    }
}

/// Turns a probe result into a transcode plan
pub struct PlanBuilder<'a> {
    registry: &'a Registry,
    defaults: &'a PlanDefaults,
    flags: &'a PlanFlags,
}

impl<'a> PlanBuilder<'a> {
    pub fn new(registry: &'a Registry, defaults: &'a PlanDefaults, flags: &'a PlanFlags) -> Self {
        Self {
            registry,
            defaults,
            flags,
        }
    }

    /// Borrow everything from a run configuration
    pub fn from_config(config: &'a Configuration) -> Self {
        Self::new(&config.registry, &config.defaults, &config.flags)
    }

    /// Build the plan for `path` given what the probe saw.
    ///
    /// All three attributes are classified before anything is decided, so an
    /// unknown value always surfaces even when another attribute already
    /// forces a re-encode.
    pub fn build(&self, path: &Path, probe: &ProbeResult) -> Result<TranscodePlan, DomainError> {
        let container = self.plan_container(path, probe)?;
        let video = self.plan_video(probe)?;
        let audio = self.plan_audio(probe)?;

        match container {
            None if video.is_copy() && audio.is_copy() => Ok(TranscodePlan::NoOpCompatible),
            None => {
                // Keep the current extension; files without one get the default
                let container = lowercase_extension(path)
                    .unwrap_or_else(|| self.defaults.container.clone());
                Ok(TranscodePlan::Transcode(TranscodeSpec {
                    container,
                    video,
                    audio,
                }))
            }
            Some(container) => Ok(TranscodePlan::Transcode(TranscodeSpec {
                container,
                video,
                audio,
            })),
        }
    }

    /// `None` when the current container can stay, otherwise the target
    fn plan_container(
        &self,
        path: &Path,
        probe: &ProbeResult,
    ) -> Result<Option<String>, DomainError> {
        let format = probe.container_format.as_deref().unwrap_or_default();
        let verdict = classify(AttributeKind::ContainerFormat, format, &self.registry.containers)?;

        let override_matches = match &self.flags.container_override {
            None => true,
            Some(wanted) => lowercase_extension(path).as_deref() == Some(wanted.to_lowercase().as_str()),
        };

        if verdict == Verdict::Supported && override_matches {
            Ok(None)
        } else {
            Ok(Some(
                self.flags
                    .container_override
                    .clone()
                    .unwrap_or_else(|| self.defaults.container.clone()),
            ))
        }
    }

    fn plan_video(&self, probe: &ProbeResult) -> Result<StreamAction, DomainError> {
        let Some(codec) = probe.video_codec.as_deref() else {
            return Ok(StreamAction::Copy);
        };

        let verdict = classify(AttributeKind::VideoCodec, codec, &self.registry.video_codecs)?;
        if verdict == Verdict::Supported && !self.flags.force_video_encode {
            Ok(StreamAction::Copy)
        } else {
            Ok(StreamAction::Encode(self.defaults.video.clone()))
        }
    }

    fn plan_audio(&self, probe: &ProbeResult) -> Result<StreamAction, DomainError> {
        let Some(codec) = probe.audio_codec.as_deref() else {
            return Ok(StreamAction::Copy);
        };

        // Still classified so unknown codecs are caught under --stereo too
        let verdict = classify(AttributeKind::AudioCodec, codec, &self.registry.audio_codecs)?;

        // The stereo switch passes multichannel audio through untouched.
        // Long-standing behavior; there is no actual downmix here.
        if self.flags.downmix_stereo && probe.channel_count() > 2 {
            return Ok(StreamAction::Copy);
        }

        if verdict == Verdict::Supported && !self.flags.force_audio_encode {
            Ok(StreamAction::Copy)
        } else {
            Ok(StreamAction::Encode(self.defaults.audio.clone()))
        }
    }
}

/// Append `.<suffix>` to the full file name, keeping the existing extension
fn append_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Side-by-side encoder output: `<original>.<container>`
pub fn temp_output_path(original: &Path, container: &str) -> PathBuf {
    append_suffix(original, &format!(".{}", container))
}

/// Where the converted file ends up for the given policy
pub fn final_output_path(original: &Path, container: &str, policy: OnSuccess) -> PathBuf {
    match policy {
        OnSuccess::Keep => append_suffix(original, &format!("-chromecast.{}", container)),
        OnSuccess::Archive | OnSuccess::Delete => original.with_extension(container),
    }
}

/// Names an archived original may take, in order of preference:
/// `<stem>.bak`, then `<original>.bak` for siblings sharing a stem
pub fn backup_paths(original: &Path) -> [PathBuf; 2] {
    [original.with_extension("bak"), append_suffix(original, ".bak")]
}
