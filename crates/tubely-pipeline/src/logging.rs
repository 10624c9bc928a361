//! Structured pipeline logging.
//!
//! One [`PipelineLogger`] per run keeps the video ID and owner on every
//! lifecycle event.

use std::time::Duration;

use tracing::{error, info, warn, Span};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use tubely_models::{UploadRequest, VideoId};

use crate::error::PipelineError;
use crate::pipeline::PipelineState;

/// Default filter when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "tubely=info";

/// Install the global tracing subscriber.
///
/// Colored human output by default, JSON lines when `LOG_FORMAT=json`.
pub fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

/// Logger for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineLogger {
    video_id: String,
    owner_id: String,
}

impl PipelineLogger {
    pub fn new(video_id: &VideoId, owner_id: &str) -> Self {
        Self {
            video_id: video_id.to_string(),
            owner_id: owner_id.to_string(),
        }
    }

    pub fn for_request(request: &UploadRequest) -> Self {
        Self::new(&request.video_id, &request.owner_id)
    }

    pub fn log_start(&self, request: &UploadRequest) {
        info!(
            video_id = %self.video_id,
            owner_id = %self.owner_id,
            media_type = %request.media_type,
            declared_size = request.declared_size,
            "Upload started"
        );
    }

    /// Log entry into a new pipeline state.
    pub fn log_stage(&self, state: PipelineState, message: &str) {
        info!(
            video_id = %self.video_id,
            state = state.as_str(),
            "Upload progress: {}", message
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            video_id = %self.video_id,
            owner_id = %self.owner_id,
            "Upload warning: {}", message
        );
    }

    /// Log a failed run with the stage, category and any tool diagnostics.
    pub fn log_failure(&self, err: &PipelineError, elapsed: Duration) {
        error!(
            video_id = %self.video_id,
            owner_id = %self.owner_id,
            stage = err.stage(),
            retryable = err.is_retryable(),
            status = err.category().status_code(),
            tool_stderr = err.tool_stderr().unwrap_or(""),
            duration_ms = elapsed.as_millis() as u64,
            error = %err,
            "Upload failed"
        );
    }

    pub fn log_completion(&self, key: &str, elapsed: Duration) {
        info!(
            video_id = %self.video_id,
            owner_id = %self.owner_id,
            key = %key,
            duration_ms = elapsed.as_millis() as u64,
            "Upload completed"
        );
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    /// Span covering the whole run.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "upload",
            video_id = %self.video_id,
            owner_id = %self.owner_id
        )
    }
}
