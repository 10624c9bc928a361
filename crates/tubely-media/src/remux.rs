//! Fast-start remuxing.
//!
//! Rewrites an MP4 so the `moov` atom precedes the media data, letting
//! playback start before the whole file is fetched. Streams are copied,
//! never re-encoded, and global metadata is preserved.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::command::{CommandRunner, FfmpegCommand};
use crate::error::{MediaError, MediaResult};

/// Suffix appended to the input path to name the remuxed output.
pub const FAST_START_SUFFIX: &str = ".processing";

/// Output path for a remux of `input`: the input path plus [`FAST_START_SUFFIX`].
pub fn fast_start_output_path(input: impl AsRef<Path>) -> PathBuf {
    let mut path = OsString::from(input.as_ref().as_os_str());
    path.push(FAST_START_SUFFIX);
    PathBuf::from(path)
}

/// Remuxes local MP4 files into the fast-start layout.
#[derive(Clone)]
pub struct FastStartRemuxer {
    runner: Arc<dyn CommandRunner>,
    ffmpeg_path: String,
}

impl FastStartRemuxer {
    pub fn new(runner: Arc<dyn CommandRunner>, ffmpeg_path: impl Into<String>) -> Self {
        Self {
            runner,
            ffmpeg_path: ffmpeg_path.into(),
        }
    }

    /// FFmpeg command for a fast-start remux of `input` into `output`.
    ///
    /// The output name does not end in `.mp4`, so the container is forced.
    pub fn command(input: &Path, output: &Path) -> FfmpegCommand {
        FfmpegCommand::new(input, output)
            .output_args(["-movflags", "faststart", "-map_metadata", "0"])
            .stream_copy()
            .format("mp4")
    }

    /// Remux `input` and return the path of the new file.
    ///
    /// The input is left untouched; the caller owns both files afterwards.
    pub async fn remux(&self, input: impl AsRef<Path>) -> MediaResult<PathBuf> {
        let input = input.as_ref();

        if !input.exists() {
            return Err(MediaError::FileNotFound(input.to_path_buf()));
        }

        let output_path = fast_start_output_path(input);
        let cmd = Self::command(input, &output_path);

        debug!(
            input = %input.display(),
            output = %output_path.display(),
            "Remuxing for fast start"
        );

        let output = self
            .runner
            .run(&self.ffmpeg_path, &cmd.build_args())
            .await?;

        if !output.success() {
            warn!(
                input = %input.display(),
                exit = %output.exit_description(),
                stderr = %output.stderr.trim(),
                "Fast-start remux failed"
            );
            return Err(MediaError::remux_failed(
                format!("ffmpeg {}", output.exit_description()),
                Some(output.stderr),
                output.exit_code,
            ));
        }

        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandOutput;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Simulates ffmpeg by copying the input to the output argument.
    struct CopyingRunner {
        exit_code: i32,
        args: Mutex<Option<Vec<String>>>,
    }

    #[async_trait]
    impl CommandRunner for CopyingRunner {
        async fn run(&self, _program: &str, args: &[String]) -> MediaResult<CommandOutput> {
            *self.args.lock().unwrap() = Some(args.to_vec());
            if self.exit_code == 0 {
                let input_idx = args.iter().position(|a| a == "-i").unwrap() + 1;
                std::fs::copy(&args[input_idx], args.last().unwrap())?;
            }
            Ok(CommandOutput {
                exit_code: Some(self.exit_code),
                stdout: Vec::new(),
                stderr: if self.exit_code == 0 {
                    String::new()
                } else {
                    "moov atom not found".to_string()
                },
            })
        }
    }

    fn runner(exit_code: i32) -> Arc<CopyingRunner> {
        Arc::new(CopyingRunner {
            exit_code,
            args: Mutex::new(None),
        })
    }

    #[test]
    fn test_output_path_appends_suffix() {
        assert_eq!(
            fast_start_output_path("/tmp/vid1.mp4"),
            PathBuf::from("/tmp/vid1.mp4.processing")
        );
    }

    #[test]
    fn test_fast_start_arguments() {
        let args = FastStartRemuxer::command(Path::new("in.mp4"), Path::new("in.mp4.processing"))
            .build_args();
        let joined = args.join(" ");
        assert!(joined.contains("-i in.mp4"));
        assert!(joined.contains("-movflags faststart"));
        assert!(joined.contains("-map_metadata 0"));
        assert!(joined.contains("-codec copy"));
        assert!(joined.ends_with("-f mp4 in.mp4.processing"));
    }

    #[tokio::test]
    async fn test_remux_produces_second_file() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("vid1.mp4");
        std::fs::write(&input, b"fake mp4").unwrap();

        let runner = runner(0);
        let remuxer = FastStartRemuxer::new(runner.clone(), "ffmpeg");
        let output = remuxer.remux(&input).await.unwrap();

        assert_eq!(output, dir.path().join("vid1.mp4.processing"));
        assert!(input.exists(), "input must be left in place");
        assert!(output.exists());
        assert!(runner.args.lock().unwrap().is_some());
    }

    #[tokio::test]
    async fn test_remux_failure() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("vid1.mp4");
        std::fs::write(&input, b"fake mp4").unwrap();

        let remuxer = FastStartRemuxer::new(runner(1), "ffmpeg");
        let err = remuxer.remux(&input).await.unwrap_err();

        match err {
            MediaError::RemuxFailed {
                stderr, exit_code, ..
            } => {
                assert_eq!(exit_code, Some(1));
                assert_eq!(stderr.as_deref(), Some("moov atom not found"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
