//! Shared data models for the Tubely upload pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Video identifiers and video records
//! - Upload requests and accepted media types
//! - Aspect classification of video geometry
//! - Storage references and presigned URLs

pub mod aspect;
pub mod storage;
pub mod upload;
pub mod video;

// Re-export common types
pub use aspect::{AspectClass, AspectClassParseError, VideoDimensions};
pub use storage::{PresignedUrl, StorageObjectRef};
pub use upload::{
    media_extension, UploadRequest, DEFAULT_MAX_UPLOAD_SIZE, MP4_EXTENSION, MP4_MEDIA_TYPE,
};
pub use video::{Video, VideoId};
