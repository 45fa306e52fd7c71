// Transcode executor - Runs one encode and commits or rolls back

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::app::file_state::FileStateManager;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::ports::*;

/// Executes a transcode spec for one file
pub struct TranscodeExecutor {
    encode_port: Arc<dyn EncodePort>,
    fs_port: Arc<dyn FsPort>,
    file_state: FileStateManager,
}

impl TranscodeExecutor {
    pub fn new(
        encode_port: Arc<dyn EncodePort>,
        fs_port: Arc<dyn FsPort>,
        policy: OnSuccess,
    ) -> Self {
        let file_state = FileStateManager::new(Arc::clone(&fs_port), policy);
        Self {
            encode_port,
            fs_port,
            file_state,
        }
    }

    /// Encode `original` into a temporary output, then finalize it.
    ///
    /// Whatever goes wrong, the original is left as it was and no temporary
    /// output remains.
    pub async fn execute(
        &self,
        original: &Path,
        spec: &TranscodeSpec,
    ) -> Result<ConvertedFile, ConversionFailure> {
        let temp_output = temp_output_path(original, &spec.container);
        let mut state = FileState::Untouched;

        // Refuse before spending an encode on a file that cannot be promoted
        self.file_state
            .check_destination(original, &spec.container)?;

        if self.fs_port.path_kind(&temp_output) != PathKind::Missing {
            debug!(path = %temp_output.display(), "removing leftover temporary output");
            self.file_state.discard(&temp_output);
        }

        transition(
            original,
            &mut state,
            FileState::Converting {
                temp_output: temp_output.clone(),
            },
        );

        let job = EncodeJob {
            input: original.to_path_buf(),
            output: temp_output.clone(),
            video: spec.video.clone(),
            audio: spec.audio.clone(),
        };

        let failure = match self.encode_port.encode(&job).await {
            Ok(EncodeStatus::Succeeded) if self.fs_port.file_exists(&temp_output) => {
                match self
                    .file_state
                    .finalize(original, &temp_output, &spec.container)
                {
                    Ok(converted) => {
                        transition(
                            original,
                            &mut state,
                            FileState::Converted {
                                output: converted.output.clone(),
                            },
                        );
                        return Ok(converted);
                    }
                    Err(failure) => failure,
                }
            }
            Ok(EncodeStatus::Succeeded) => ConversionFailure::MissingOutput(temp_output.clone()),
            Ok(EncodeStatus::Failed { code }) => ConversionFailure::EncoderExited { code },
            Ok(EncodeStatus::Interrupted) => ConversionFailure::Interrupted,
            Err(e) => ConversionFailure::EncoderUnavailable(e.to_string()),
        };

        warn!(path = %original.display(), %failure, "conversion failed, original left untouched");
        self.file_state.discard(&temp_output);
        transition(original, &mut state, FileState::Failed);
        Err(failure)
    }
}

fn transition(path: &Path, state: &mut FileState, next: FileState) {
    info!(path = %path.display(), from = ?state, to = ?next, "file state");
    *state = next;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::LocalFsAdapter;
    use crate::domain::errors::DomainError;
    use async_trait::async_trait;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Writes `bytes` to the job output (if any) and reports `status`
    struct ScriptedEncoder {
        bytes: Option<&'static [u8]>,
        status: Result<EncodeStatus, DomainError>,
        jobs: Mutex<Vec<EncodeJob>>,
    }

    impl ScriptedEncoder {
        fn new(bytes: Option<&'static [u8]>, status: Result<EncodeStatus, DomainError>) -> Self {
            Self {
                bytes,
                status,
                jobs: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl EncodePort for ScriptedEncoder {
        async fn encode(&self, job: &EncodeJob) -> Result<EncodeStatus, DomainError> {
            self.jobs.lock().unwrap().push(job.clone());
            if let Some(bytes) = self.bytes {
                fs::write(&job.output, bytes).unwrap();
            }
            self.status.clone()
        }
    }

    fn spec() -> TranscodeSpec {
        TranscodeSpec {
            container: "mkv".to_string(),
            video: StreamAction::Encode(EncoderPreset::new("h264", ["-crf", "17"])),
            audio: StreamAction::Copy,
        }
    }

    fn executor(encoder: Arc<ScriptedEncoder>, policy: OnSuccess) -> TranscodeExecutor {
        TranscodeExecutor::new(encoder, Arc::new(LocalFsAdapter::new()), policy)
    }

    fn source(dir: &TempDir) -> std::path::PathBuf {
        let original = dir.path().join("movie.avi");
        fs::write(&original, b"original bytes").unwrap();
        original
    }

    #[tokio::test]
    async fn test_success_archives_original() {
        let dir = TempDir::new().unwrap();
        let original = source(&dir);
        let encoder = Arc::new(ScriptedEncoder::new(Some(b"encoded"), Ok(EncodeStatus::Succeeded)));

        let converted = executor(Arc::clone(&encoder), OnSuccess::Archive)
            .execute(&original, &spec())
            .await
            .unwrap();

        assert_eq!(converted.output, dir.path().join("movie.mkv"));
        assert_eq!(fs::read(dir.path().join("movie.bak")).unwrap(), b"original bytes");
        let jobs = encoder.jobs.lock().unwrap();
        assert_eq!(jobs[0].output, dir.path().join("movie.avi.mkv"));
    }

    #[tokio::test]
    async fn test_encoder_failure_purges_partial_output() {
        let dir = TempDir::new().unwrap();
        let original = source(&dir);
        let encoder = Arc::new(ScriptedEncoder::new(
            Some(b"partial"),
            Ok(EncodeStatus::Failed { code: Some(1) }),
        ));

        let result = executor(encoder, OnSuccess::Archive)
            .execute(&original, &spec())
            .await;

        assert_eq!(result, Err(ConversionFailure::EncoderExited { code: Some(1) }));
        assert_eq!(fs::read(&original).unwrap(), b"original bytes");
        assert!(!dir.path().join("movie.avi.mkv").exists());
        assert!(!dir.path().join("movie.mkv").exists());
    }

    #[tokio::test]
    async fn test_interrupt_is_handled_like_failure() {
        let dir = TempDir::new().unwrap();
        let original = source(&dir);
        let encoder = Arc::new(ScriptedEncoder::new(Some(b"partial"), Ok(EncodeStatus::Interrupted)));

        let result = executor(encoder, OnSuccess::Delete)
            .execute(&original, &spec())
            .await;

        assert_eq!(result, Err(ConversionFailure::Interrupted));
        assert_eq!(fs::read(&original).unwrap(), b"original bytes");
        assert!(!dir.path().join("movie.avi.mkv").exists());
    }

    #[tokio::test]
    async fn test_success_without_output_is_failure() {
        let dir = TempDir::new().unwrap();
        let original = source(&dir);
        let encoder = Arc::new(ScriptedEncoder::new(None, Ok(EncodeStatus::Succeeded)));

        let result = executor(encoder, OnSuccess::Archive)
            .execute(&original, &spec())
            .await;

        assert!(matches!(result, Err(ConversionFailure::MissingOutput(_))));
        assert!(original.exists());
    }

    #[tokio::test]
    async fn test_encoder_that_cannot_start() {
        let dir = TempDir::new().unwrap();
        let original = source(&dir);
        let encoder = Arc::new(ScriptedEncoder::new(
            None,
            Err(DomainError::EncoderFailed("no such file".to_string())),
        ));

        let result = executor(encoder, OnSuccess::Archive)
            .execute(&original, &spec())
            .await;

        assert!(matches!(result, Err(ConversionFailure::EncoderUnavailable(_))));
        assert!(original.exists());
    }

    #[tokio::test]
    async fn test_leftover_temp_output_is_replaced() {
        let dir = TempDir::new().unwrap();
        let original = source(&dir);
        fs::write(dir.path().join("movie.avi.mkv"), b"crash leftover").unwrap();
        let encoder = Arc::new(ScriptedEncoder::new(None, Ok(EncodeStatus::Succeeded)));

        // The leftover must not be mistaken for fresh encoder output
        let result = executor(encoder, OnSuccess::Archive)
            .execute(&original, &spec())
            .await;

        assert!(matches!(result, Err(ConversionFailure::MissingOutput(_))));
        assert!(!dir.path().join("movie.avi.mkv").exists());
    }

    #[tokio::test]
    async fn test_occupied_destination_skips_encode() {
        let dir = TempDir::new().unwrap();
        let original = source(&dir);
        fs::write(dir.path().join("movie.mkv"), b"someone else").unwrap();
        let encoder = Arc::new(ScriptedEncoder::new(Some(b"encoded"), Ok(EncodeStatus::Succeeded)));

        let result = executor(Arc::clone(&encoder), OnSuccess::Archive)
            .execute(&original, &spec())
            .await;

        assert!(matches!(result, Err(ConversionFailure::DestinationExists(_))));
        assert!(encoder.jobs.lock().unwrap().is_empty());
        assert_eq!(fs::read(dir.path().join("movie.mkv")).unwrap(), b"someone else");
    }
}
