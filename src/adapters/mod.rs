// Adapters - External system implementations

pub mod console_report;
pub mod exec_ffmpeg;
pub mod fs_local;
pub mod ledger_file;
pub mod probe_mediainfo;
pub mod toml_config;

// Re-export adapters
pub use console_report::ConsoleReporter;
pub use exec_ffmpeg::FfmpegAdapter;
pub use fs_local::LocalFsAdapter;
pub use ledger_file::FlatFileLedger;
pub use probe_mediainfo::MediainfoAdapter;
pub use toml_config::{Settings, TomlConfigAdapter};
