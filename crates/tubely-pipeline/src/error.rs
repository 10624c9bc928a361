//! Pipeline error types.

use thiserror::Error;
use tubely_media::MediaError;
use tubely_storage::StorageError;

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Client-facing class of a failure, for the boundary layer to map onto
/// response statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCategory {
    /// The request must be fixed by the client
    BadRequest,
    /// The caller may not act on this video
    Forbidden,
    /// Server-side processing failed
    Internal,
}

impl FailureCategory {
    pub fn status_code(&self) -> u16 {
        match self {
            FailureCategory::BadRequest => 400,
            FailureCategory::Forbidden => 403,
            FailureCategory::Internal => 500,
        }
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("IO error while {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Remux failed: {0}")]
    Remux(#[source] MediaError),

    #[error("Probe failed: {0}")]
    Probe(#[source] MediaError),

    #[error("Storage error: {0}")]
    Storage(#[source] StorageError),

    #[error("Presign failed: {0}")]
    Presign(#[source] StorageError),

    #[error("Metadata store error: {0}")]
    Metadata(String),
}

impl PipelineError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn metadata(msg: impl Into<String>) -> Self {
        Self::Metadata(msg.into())
    }

    /// Stage that produced the error, used as a log field and metric label.
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::Validation(_) => "validation",
            PipelineError::Forbidden(_) => "authorization",
            PipelineError::Io { .. } => "write_local",
            PipelineError::Remux(_) => "remux",
            PipelineError::Probe(_) => "probe",
            PipelineError::Storage(_) => "upload",
            PipelineError::Presign(_) => "presign",
            PipelineError::Metadata(_) => "metadata",
        }
    }

    /// Whether the caller may retry the whole invocation.
    ///
    /// Scratch state is always cleaned up, so a retry starts from scratch.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PipelineError::Remux(_)
                | PipelineError::Probe(_)
                | PipelineError::Storage(_)
                | PipelineError::Presign(_)
                | PipelineError::Metadata(_)
        )
    }

    pub fn category(&self) -> FailureCategory {
        match self {
            PipelineError::Validation(_) => FailureCategory::BadRequest,
            PipelineError::Forbidden(_) => FailureCategory::Forbidden,
            _ => FailureCategory::Internal,
        }
    }

    /// Diagnostic output of the failing external tool, if any.
    pub fn tool_stderr(&self) -> Option<&str> {
        match self {
            PipelineError::Remux(e) | PipelineError::Probe(e) => e.stderr(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        assert_eq!(
            PipelineError::validation("bad type").category(),
            FailureCategory::BadRequest
        );
        assert_eq!(
            PipelineError::forbidden("not owner").category().status_code(),
            403
        );
        assert_eq!(
            PipelineError::Remux(MediaError::NoStreams).category(),
            FailureCategory::Internal
        );
    }

    #[test]
    fn test_retryability() {
        assert!(!PipelineError::validation("x").is_retryable());
        assert!(!PipelineError::forbidden("x").is_retryable());
        assert!(!PipelineError::io(
            "writing scratch file",
            std::io::Error::new(std::io::ErrorKind::Other, "disk full")
        )
        .is_retryable());
        assert!(PipelineError::Probe(MediaError::NoStreams).is_retryable());
        assert!(PipelineError::Storage(StorageError::upload_failed("timeout")).is_retryable());
    }

    #[test]
    fn test_message_names_stage_and_cause() {
        let err = PipelineError::Probe(MediaError::probe_failed("exit status 1", "bad header"));
        assert_eq!(err.stage(), "probe");
        assert_eq!(
            err.to_string(),
            "Probe failed: FFprobe failed: exit status 1: bad header"
        );
        assert_eq!(err.tool_stderr(), Some("bad header"));
    }
}
