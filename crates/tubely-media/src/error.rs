//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while running external media tools.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("{0} not found in PATH")]
    ToolNotFound(String),

    #[error("Remux failed: {message}")]
    RemuxFailed {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("FFprobe failed: {message}: {stderr}")]
    ProbeFailed { message: String, stderr: String },

    #[error("No streams found")]
    NoStreams,

    #[error("Invalid video file: {0}")]
    InvalidVideo(String),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl MediaError {
    /// Create a tool-not-found error.
    pub fn tool_not_found(tool: impl Into<String>) -> Self {
        Self::ToolNotFound(tool.into())
    }

    /// Create a remux failure error.
    pub fn remux_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::RemuxFailed {
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    /// Create a probe failure error.
    pub fn probe_failed(message: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::ProbeFailed {
            message: message.into(),
            stderr: stderr.into(),
        }
    }

    /// Diagnostic output captured from the failing tool, if any.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::RemuxFailed { stderr, .. } => stderr.as_deref(),
            Self::ProbeFailed { stderr, .. } => Some(stderr.as_str()),
            _ => None,
        }
    }
}
