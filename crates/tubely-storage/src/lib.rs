//! S3 storage for uploaded videos.
//!
//! This crate provides:
//! - Storage key derivation (`<aspect>/<video_id>.mp4`)
//! - An `ObjectStore` seam with an `aws-sdk-s3` implementation
//! - Streaming file upload to a bucket
//! - Presigned GET URL issuance with bounded expiry

pub mod client;
pub mod delivery;
pub mod error;
pub mod keys;
pub mod store;
pub mod uploader;

pub use client::{S3Client, S3Config};
pub use delivery::{PresignedUrlIssuer, DEFAULT_PRESIGN_EXPIRY_SECS, MAX_EXPIRY_SECS};
pub use error::{StorageError, StorageResult};
pub use keys::{derive_key, parse_key};
pub use store::ObjectStore;
pub use uploader::ObjectUploader;
