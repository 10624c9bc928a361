//! Pipeline configuration.

use std::path::PathBuf;
use std::time::Duration;

use tubely_models::{DEFAULT_MAX_UPLOAD_SIZE, MP4_MEDIA_TYPE};
use tubely_storage::{DEFAULT_PRESIGN_EXPIRY_SECS, MAX_EXPIRY_SECS};

/// Default timeout for a single ffmpeg/ffprobe invocation.
const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 600;

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory for per-upload scratch files
    pub scratch_dir: PathBuf,
    /// Maximum accepted upload size in bytes
    pub max_upload_size: u64,
    /// The single accepted media type
    pub accepted_media_type: String,
    /// FFmpeg binary
    pub ffmpeg_path: String,
    /// FFprobe binary
    pub ffprobe_path: String,
    /// Timeout applied to each external tool run
    pub tool_timeout: Duration,
    /// Expiry of retrieval URLs handed back to clients
    pub presign_ttl: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            scratch_dir: std::env::temp_dir().join("tubely"),
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
            accepted_media_type: MP4_MEDIA_TYPE.to_string(),
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            tool_timeout: Duration::from_secs(DEFAULT_TOOL_TIMEOUT_SECS),
            presign_ttl: Duration::from_secs(DEFAULT_PRESIGN_EXPIRY_SECS),
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            scratch_dir: std::env::var("SCRATCH_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.scratch_dir),
            max_upload_size: std::env::var("MAX_UPLOAD_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_upload_size),
            accepted_media_type: std::env::var("ACCEPTED_MEDIA_TYPE")
                .unwrap_or(defaults.accepted_media_type),
            ffmpeg_path: std::env::var("FFMPEG_PATH").unwrap_or(defaults.ffmpeg_path),
            ffprobe_path: std::env::var("FFPROBE_PATH").unwrap_or(defaults.ffprobe_path),
            tool_timeout: Duration::from_secs(
                std::env::var("TOOL_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_TOOL_TIMEOUT_SECS),
            ),
            presign_ttl: Duration::from_secs(
                std::env::var("PRESIGN_TTL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_PRESIGN_EXPIRY_SECS)
                    .min(MAX_EXPIRY_SECS),
            ),
        }
    }

    /// Create the scratch directory if it does not exist.
    pub async fn ensure_scratch_dir(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.scratch_dir).await
    }
}
