// TOML config adapter - Settings file loading and built-in defaults

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use crate::domain::errors::*;
use crate::domain::model::*;

/// File name of the settings file inside the config directory
pub const SETTINGS_FILE_NAME: &str = "config.toml";

/// Container formats and extensions
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FormatSettings {
    pub supported: Vec<String>,
    pub unsupported: Vec<String>,
    /// Output container used when the current one cannot stay
    pub default: String,
    /// File extensions considered video files (case-insensitive)
    pub extensions: Vec<String>,
}

impl Default for FormatSettings {
    fn default() -> Self {
        Self {
            supported: strings(&["MPEG-4", "Matroska", "WebM"]),
            unsupported: strings(&[
                "BDAV",
                "AVI",
                "Flash Video",
                "DivX",
                "MPEG-PS",
                "MPEG-TS",
                "Windows Media",
                "RealMedia",
                "QuickTime",
                "Ogg",
                "CDXA/MPEG-PS",
            ]),
            default: "mkv".to_string(),
            extensions: strings(&[
                "3gp", "asf", "avi", "divx", "flv", "m2ts", "m4v", "mkv", "mov", "mp4", "mpeg",
                "mpg", "mts", "ogm", "ogv", "qt", "rm", "rmvb", "ts", "vob", "webm", "wmv",
            ]),
        }
    }
}

/// One stream type's lists and encoder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecSettings {
    pub supported: Vec<String>,
    pub unsupported: Vec<String>,
    pub codec: String,
    pub options: Vec<String>,
}

impl CodecSettings {
    pub fn video() -> Self {
        Self {
            supported: strings(&["AVC", "VP8", "VP9"]),
            unsupported: strings(&[
                "MPEG-4 Visual",
                "xvid",
                "MPEG Video",
                "HEVC",
                "VC-1",
                "WMV1",
                "WMV2",
                "RealVideo 4",
                "Sorenson Spark",
                "AV1",
            ]),
            codec: "h264".to_string(),
            options: strings(&[
                "-preset", "fast", "-profile:v", "high", "-level", "4.1", "-crf", "17",
                "-pix_fmt", "yuv420p",
            ]),
        }
    }

    pub fn audio() -> Self {
        Self {
            supported: strings(&["AAC", "MPEG Audio", "Vorbis", "Ogg", "Opus", "FLAC"]),
            unsupported: strings(&[
                "AC-3",
                "E-AC-3",
                "DTS",
                "PCM",
                "WMA",
                "TrueHD",
                "MLP FBA",
                "Cooker",
                "ADPCM",
            ]),
            codec: "libvorbis".to_string(),
            options: Vec::new(),
        }
    }
}

/// `[video]` / `[audio]` as written; keys left out keep the section default
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CodecSection {
    supported: Option<Vec<String>>,
    unsupported: Option<Vec<String>>,
    codec: Option<String>,
    options: Option<Vec<String>>,
}

impl CodecSection {
    fn over(self, base: CodecSettings) -> CodecSettings {
        CodecSettings {
            supported: self.supported.unwrap_or(base.supported),
            unsupported: self.unsupported.unwrap_or(base.unsupported),
            codec: self.codec.unwrap_or(base.codec),
            options: self.options.unwrap_or(base.options),
        }
    }
}

/// What to do with originals
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub on_success: OnSuccess,
}

/// External tool names or paths
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    pub probe: String,
    pub encoder: String,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            probe: "mediainfo".to_string(),
            encoder: "ffmpeg".to_string(),
        }
    }
}

/// Contents of `config.toml` merged over the built-in defaults
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "SettingsFile")]
pub struct Settings {
    pub formats: FormatSettings,
    pub video: CodecSettings,
    pub audio: CodecSettings,
    pub output: OutputSettings,
    pub tools: ToolSettings,
}

impl Default for Settings {
    fn default() -> Self {
        SettingsFile::default().into()
    }
}

/// Raw file layout; every key is optional
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SettingsFile {
    formats: FormatSettings,
    video: CodecSection,
    audio: CodecSection,
    output: OutputSettings,
    tools: ToolSettings,
}

impl From<SettingsFile> for Settings {
    fn from(file: SettingsFile) -> Self {
        Self {
            formats: file.formats,
            video: file.video.over(CodecSettings::video()),
            audio: file.audio.over(CodecSettings::audio()),
            output: file.output,
            tools: file.tools,
        }
    }
}

impl Settings {
    /// Build the allow/deny registry
    pub fn registry(&self) -> Registry {
        Registry::new(
            AllowDenyList::new(
                self.formats.supported.iter().cloned(),
                self.formats.unsupported.iter().cloned(),
            ),
            AllowDenyList::new(
                self.video.supported.iter().cloned(),
                self.video.unsupported.iter().cloned(),
            ),
            AllowDenyList::new(
                self.audio.supported.iter().cloned(),
                self.audio.unsupported.iter().cloned(),
            ),
            &self.formats.extensions,
        )
    }

    /// Build the encoder defaults
    pub fn plan_defaults(&self) -> PlanDefaults {
        PlanDefaults {
            container: self.formats.default.clone(),
            video: EncoderPreset::new(self.video.codec.clone(), self.video.options.iter().cloned()),
            audio: EncoderPreset::new(self.audio.codec.clone(), self.audio.options.iter().cloned()),
        }
    }

    /// Reject settings that would break classification or planning
    pub fn validate(&self, source: &Path) -> Result<(), DomainError> {
        let bad = |reason: &str| DomainError::BadConfig {
            path: source.to_path_buf(),
            reason: reason.to_string(),
        };

        if self.formats.default.trim().is_empty() {
            return Err(bad("formats.default must not be empty"));
        }
        if self.video.codec.trim().is_empty() {
            return Err(bad("video.codec must not be empty"));
        }
        if self.audio.codec.trim().is_empty() {
            return Err(bad("audio.codec must not be empty"));
        }
        if self.tools.probe.trim().is_empty() || self.tools.encoder.trim().is_empty() {
            return Err(bad("tools.probe and tools.encoder must not be empty"));
        }

        self.registry().validate()
    }
}

/// TOML configuration adapter
pub struct TomlConfigAdapter {
    config_file_path: PathBuf,
}

impl TomlConfigAdapter {
    /// Create adapter for the settings file inside `config_dir`
    pub fn new(config_dir: &Path) -> Self {
        Self {
            config_file_path: config_dir.join(SETTINGS_FILE_NAME),
        }
    }

    /// Load settings; a missing file yields the built-in defaults
    pub fn load(&self) -> Result<Settings, DomainError> {
        let path = &self.config_file_path;
        if !path.exists() {
            info!(path = %path.display(), "no settings file, using defaults");
            return Ok(Settings::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| DomainError::BadConfig {
            path: path.clone(),
            reason: format!("Failed to read config file: {}", e),
        })?;

        let settings = Self::parse(&content, path)?;
        info!(path = %path.display(), "settings loaded");
        Ok(settings)
    }

    /// Parse and validate settings text
    pub fn parse(content: &str, source: &Path) -> Result<Settings, DomainError> {
        let settings: Settings = toml::from_str(content).map_err(|e| DomainError::BadConfig {
            path: source.to_path_buf(),
            reason: format!("Failed to parse TOML config: {}", e),
        })?;
        settings.validate(source)?;
        Ok(settings)
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate(Path::new("defaults")).is_ok());
        assert_eq!(settings.formats.default, "mkv");
        assert_eq!(settings.video.codec, "h264");
        assert_eq!(settings.audio.codec, "libvorbis");
        assert_eq!(settings.output.on_success, OnSuccess::Archive);
        assert_eq!(settings.tools.probe, "mediainfo");
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let toml = r#"
[audio]
supported = ["AAC", "AC-3"]
unsupported = ["DTS"]

[output]
on_success = "keep"
"#;
        let settings = TomlConfigAdapter::parse(toml, Path::new("config.toml")).unwrap();
        assert_eq!(settings.audio.supported, vec!["AAC", "AC-3"]);
        assert_eq!(settings.audio.codec, "libvorbis");
        assert_eq!(settings.video, CodecSettings::video());
        assert_eq!(settings.output.on_success, OnSuccess::Keep);
    }

    #[test]
    fn test_partial_codec_sections_fall_back_to_their_own_defaults() {
        let toml = r#"
[video]
codec = "libx265"

[audio]
options = ["-q:a", "6"]
"#;
        let settings = TomlConfigAdapter::parse(toml, Path::new("config.toml")).unwrap();

        let video = CodecSettings::video();
        assert_eq!(settings.video.codec, "libx265");
        assert_eq!(settings.video.supported, video.supported);
        assert_eq!(settings.video.unsupported, video.unsupported);
        assert_eq!(settings.video.options, video.options);

        let audio = CodecSettings::audio();
        assert_eq!(settings.audio.codec, audio.codec);
        assert_eq!(settings.audio.supported, audio.supported);
        assert_eq!(settings.audio.options, vec!["-q:a", "6"]);
        assert!(settings.validate(Path::new("config.toml")).is_ok());
    }

    #[test]
    fn test_options_and_container_override() {
        let toml = r#"
[formats]
default = "mp4"

[video]
codec = "libx264"
options = ["-crf", "20"]
"#;
        let settings = TomlConfigAdapter::parse(toml, Path::new("config.toml")).unwrap();
        let defaults = settings.plan_defaults();
        assert_eq!(defaults.container, "mp4");
        assert_eq!(defaults.video, EncoderPreset::new("libx264", ["-crf", "20"]));
        // Lists not mentioned keep their defaults
        assert!(settings.video.supported.contains(&"AVC".to_string()));
    }

    #[test]
    fn test_overlapping_lists_are_rejected() {
        let toml = r#"
[video]
supported = ["AVC", "HEVC"]
unsupported = ["HEVC"]
"#;
        let err = TomlConfigAdapter::parse(toml, Path::new("config.toml")).unwrap_err();
        assert!(matches!(err, DomainError::AmbiguousValue { .. }));
    }

    #[test]
    fn test_malformed_toml_is_bad_config() {
        let err = TomlConfigAdapter::parse("[video\ncodec=", Path::new("config.toml")).unwrap_err();
        assert!(matches!(err, DomainError::BadConfig { .. }));
    }

    #[test]
    fn test_unknown_policy_is_bad_config() {
        let err = TomlConfigAdapter::parse("[output]\non_success = \"shred\"", Path::new("c.toml"))
            .unwrap_err();
        assert!(matches!(err, DomainError::BadConfig { .. }));
    }

    #[test]
    fn test_empty_codec_is_rejected() {
        let err = TomlConfigAdapter::parse("[audio]\ncodec = \"\"", Path::new("c.toml")).unwrap_err();
        assert!(matches!(err, DomainError::BadConfig { .. }));
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let adapter = TomlConfigAdapter::new(dir.path());
        assert_eq!(adapter.load().unwrap(), Settings::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE_NAME),
            "[formats]\nextensions = [\"MKV\", \"mp4\"]\n",
        )
        .unwrap();

        let settings = TomlConfigAdapter::new(dir.path()).load().unwrap();
        let registry = settings.registry();
        assert!(registry.is_video_file(Path::new("a.mkv")));
        assert!(!registry.is_video_file(Path::new("a.avi")));
    }
}
