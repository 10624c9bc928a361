//! Upload request validation.
//!
//! Runs before anything touches the disk.

use tubely_models::UploadRequest;

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};

/// Check `request` against the configured limits.
pub fn validate_upload(request: &UploadRequest, config: &PipelineConfig) -> PipelineResult<()> {
    if !request.video_id.is_path_safe() {
        return Err(PipelineError::validation(format!(
            "Invalid video ID: {:?}",
            request.video_id.as_str()
        )));
    }

    let actual_size = request
        .file_size()
        .ok_or_else(|| PipelineError::validation("Missing video file"))?;

    if actual_size == 0 {
        return Err(PipelineError::validation("Empty video file"));
    }

    // Both the client's claim and the received bytes count against the limit.
    let size = actual_size.max(request.declared_size);
    if size > config.max_upload_size {
        return Err(PipelineError::validation(format!(
            "File size {} exceeds limit of {} bytes",
            size, config.max_upload_size
        )));
    }

    if request.media_type != config.accepted_media_type {
        return Err(PipelineError::validation(format!(
            "Invalid media type: {}",
            request.media_type
        )));
    }

    Ok(())
}
