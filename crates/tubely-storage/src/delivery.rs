//! Presigned delivery URLs.
//!
//! Turns a stored key back into a short-lived GET URL. URLs are meant for
//! immediate embedding in a response and are never persisted or cached.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};
use tracing::debug;
use tubely_models::{PresignedUrl, StorageObjectRef};

use crate::error::{StorageError, StorageResult};
use crate::store::ObjectStore;

/// Default expiry for retrieval URLs (5 minutes).
pub const DEFAULT_PRESIGN_EXPIRY_SECS: u64 = 300;

/// Maximum allowed expiry (7 days), the SigV4 upper bound.
pub const MAX_EXPIRY_SECS: u64 = 604800;

/// Issues presigned GET URLs for objects in one bucket.
#[derive(Clone)]
pub struct PresignedUrlIssuer {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    default_ttl: Duration,
}

impl PresignedUrlIssuer {
    pub fn new(store: Arc<dyn ObjectStore>, bucket: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
            default_ttl: Duration::from_secs(DEFAULT_PRESIGN_EXPIRY_SECS),
        }
    }

    /// Override the default expiry, capped at [`MAX_EXPIRY_SECS`].
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl.min(Duration::from_secs(MAX_EXPIRY_SECS));
        self
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Sign `key` for `ttl`, starting now.
    pub async fn issue(&self, key: &str, ttl: Duration) -> StorageResult<PresignedUrl> {
        self.issue_at(key, ttl, SystemTime::now()).await
    }

    /// Sign `key` with the default expiry.
    pub async fn issue_default(&self, key: &str) -> StorageResult<PresignedUrl> {
        self.issue(key, self.default_ttl).await
    }

    /// Sign a stored object reference with the default expiry.
    pub async fn issue_for(&self, object: &StorageObjectRef) -> StorageResult<PresignedUrl> {
        let issued_at = SystemTime::now();
        let url = self
            .store
            .presign_get(&object.bucket, &object.key, self.default_ttl, issued_at)
            .await?;

        Ok(PresignedUrl {
            url,
            expires_at: expiry(issued_at, self.default_ttl),
        })
    }

    /// Sign `key` for `ttl` starting at `issued_at`.
    ///
    /// Every call yields a distinct URL, even for the same key and instant.
    pub async fn issue_at(
        &self,
        key: &str,
        ttl: Duration,
        issued_at: SystemTime,
    ) -> StorageResult<PresignedUrl> {
        if ttl.is_zero() {
            return Err(StorageError::presign_failed("expiry must be positive"));
        }
        let ttl = ttl.min(Duration::from_secs(MAX_EXPIRY_SECS));

        let url = self
            .store
            .presign_get(&self.bucket, key, ttl, issued_at)
            .await?;

        debug!(
            bucket = %self.bucket,
            key = %key,
            ttl_secs = ttl.as_secs(),
            "Issued presigned URL"
        );

        Ok(PresignedUrl {
            url,
            expires_at: expiry(issued_at, ttl),
        })
    }
}

fn expiry(issued_at: SystemTime, ttl: Duration) -> DateTime<Utc> {
    DateTime::<Utc>::from(issued_at + ttl)
}
