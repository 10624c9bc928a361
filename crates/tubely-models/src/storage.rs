//! Storage references and signed retrieval URLs.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Durable identity of an uploaded object.
///
/// Only produced after the store confirmed the write.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct StorageObjectRef {
    /// Bucket holding the object
    pub bucket: String,
    /// Object key, `<aspect>/<video_id>.mp4`
    pub key: String,
}

impl StorageObjectRef {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for StorageObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

/// Time-limited signed URL for a stored object. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PresignedUrl {
    /// Signed URL
    pub url: String,
    /// When the signature stops being accepted
    pub expires_at: DateTime<Utc>,
}

impl PresignedUrl {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_object_ref_display() {
        let r = StorageObjectRef::new("tubely-videos", "landscape/vid1.mp4");
        assert_eq!(r.to_string(), "tubely-videos/landscape/vid1.mp4");
    }

    #[test]
    fn test_presigned_url_expiry() {
        let now = Utc::now();
        let url = PresignedUrl {
            url: "https://example.com/landscape/vid1.mp4".to_string(),
            expires_at: now + Duration::minutes(5),
        };
        assert!(!url.is_expired_at(now));
        assert!(url.is_expired_at(now + Duration::minutes(5)));
    }
}
