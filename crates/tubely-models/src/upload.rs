//! Upload request model and accepted media types.

use std::fmt;

use crate::video::VideoId;

/// The only media type accepted on the video upload path.
pub const MP4_MEDIA_TYPE: &str = "video/mp4";

/// Extension used for stored videos.
pub const MP4_EXTENSION: &str = "mp4";

/// Default upload ceiling (1 GiB).
pub const DEFAULT_MAX_UPLOAD_SIZE: u64 = 1024 * 1024 * 1024;

/// A single, already-authenticated upload.
///
/// Lives only for the duration of one pipeline run.
#[derive(Clone)]
pub struct UploadRequest {
    /// Authenticated user performing the upload
    pub owner_id: String,
    /// Target video
    pub video_id: VideoId,
    /// Uploaded bytes, `None` when the form field was missing
    pub file: Option<Vec<u8>>,
    /// Media type declared by the client
    pub media_type: String,
    /// Size declared by the client
    pub declared_size: u64,
}

impl UploadRequest {
    /// Build a request for an in-memory file, declaring its actual length.
    pub fn new(
        owner_id: impl Into<String>,
        video_id: impl Into<VideoId>,
        data: Vec<u8>,
        media_type: impl Into<String>,
    ) -> Self {
        let declared_size = data.len() as u64;
        Self {
            owner_id: owner_id.into(),
            video_id: video_id.into(),
            file: Some(data),
            media_type: media_type.into(),
            declared_size,
        }
    }

    /// Actual size of the uploaded bytes, if present.
    pub fn file_size(&self) -> Option<u64> {
        self.file.as_ref().map(|f| f.len() as u64)
    }
}

// File contents are left out of debug output.
impl fmt::Debug for UploadRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadRequest")
            .field("owner_id", &self.owner_id)
            .field("video_id", &self.video_id)
            .field("file_size", &self.file_size())
            .field("media_type", &self.media_type)
            .field("declared_size", &self.declared_size)
            .finish()
    }
}

/// File extension (with leading dot) for a `type/subtype` media type.
///
/// Anything that is not exactly two `/`-separated parts maps to `.bin`.
pub fn media_extension(media_type: &str) -> String {
    match media_type.split('/').collect::<Vec<_>>().as_slice() {
        [_, subtype] if !subtype.is_empty() => format!(".{}", subtype),
        _ => ".bin".to_string(),
    }
}
