//! Object store abstraction.

use async_trait::async_trait;
use std::path::Path;
use std::time::{Duration, SystemTime};

use crate::error::StorageResult;

/// The two primitives the pipeline needs from a remote store.
///
/// `S3Client` is the production implementation; tests substitute an
/// in-memory fake.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stream a local file into `bucket` under `key`.
    async fn put_file(
        &self,
        bucket: &str,
        key: &str,
        path: &Path,
        content_type: &str,
    ) -> StorageResult<()>;

    /// Sign a GET for `bucket`/`key`, valid for `expires_in` from `issued_at`.
    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
        issued_at: SystemTime,
    ) -> StorageResult<String>;
}
