//! Streaming upload of local files.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info};
use tubely_models::StorageObjectRef;

use crate::error::{StorageError, StorageResult};
use crate::store::ObjectStore;

/// Pushes local files into one bucket.
///
/// Failures are returned as-is; retrying is left to the caller.
#[derive(Clone)]
pub struct ObjectUploader {
    store: Arc<dyn ObjectStore>,
    bucket: String,
}

impl ObjectUploader {
    pub fn new(store: Arc<dyn ObjectStore>, bucket: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Upload `path` under `key`; the reference is returned only once the
    /// store has acknowledged the write.
    pub async fn upload(
        &self,
        path: impl AsRef<Path>,
        key: &str,
        content_type: &str,
    ) -> StorageResult<StorageObjectRef> {
        let path = path.as_ref();

        if key.is_empty() || key.starts_with('/') || key.contains("..") {
            return Err(StorageError::InvalidKey(key.to_string()));
        }

        let size_bytes = tokio::fs::metadata(path).await?.len();
        let start = Instant::now();

        let result = self
            .store
            .put_file(&self.bucket, key, path, content_type)
            .await;

        let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
        metrics::histogram!("tubely_upload_duration_seconds")
            .record(start.elapsed().as_secs_f64());

        match result {
            Ok(()) => {
                info!(
                    bucket = %self.bucket,
                    key = %key,
                    size_bytes,
                    duration_ms,
                    "Object upload successful"
                );
                Ok(StorageObjectRef::new(self.bucket.clone(), key))
            }
            Err(e) => {
                error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    size_bytes,
                    duration_ms,
                    "Object upload failed"
                );
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingStore {
        fail: bool,
        puts: Mutex<Vec<(String, String, Vec<u8>, String)>>,
    }

    #[async_trait]
    impl ObjectStore for RecordingStore {
        async fn put_file(
            &self,
            bucket: &str,
            key: &str,
            path: &Path,
            content_type: &str,
        ) -> StorageResult<()> {
            if self.fail {
                return Err(StorageError::upload_failed("AccessDenied"));
            }
            let data = std::fs::read(path)?;
            self.puts.lock().unwrap().push((
                bucket.to_string(),
                key.to_string(),
                data,
                content_type.to_string(),
            ));
            Ok(())
        }

        async fn presign_get(
            &self,
            _bucket: &str,
            _key: &str,
            _expires_in: Duration,
            _issued_at: SystemTime,
        ) -> StorageResult<String> {
            unreachable!("uploader never presigns")
        }
    }

    fn local_file(dir: &TempDir) -> std::path::PathBuf {
        let path = dir.path().join("vid1.mp4.processing");
        std::fs::write(&path, b"remuxed").unwrap();
        path
    }

    #[tokio::test]
    async fn test_upload_returns_reference_after_success() {
        let dir = TempDir::new().unwrap();
        let path = local_file(&dir);
        let store = Arc::new(RecordingStore::default());
        let uploader = ObjectUploader::new(store.clone(), "tubely-videos");

        let object = uploader
            .upload(&path, "landscape/vid1.mp4", "video/mp4")
            .await
            .unwrap();

        assert_eq!(
            object,
            StorageObjectRef::new("tubely-videos", "landscape/vid1.mp4")
        );
        let puts = store.puts.lock().unwrap();
        assert_eq!(puts.len(), 1);
        assert_eq!(puts[0].0, "tubely-videos");
        assert_eq!(puts[0].2, b"remuxed");
        assert_eq!(puts[0].3, "video/mp4");
    }

    #[tokio::test]
    async fn test_upload_failure_is_propagated() {
        let dir = TempDir::new().unwrap();
        let path = local_file(&dir);
        let store = Arc::new(RecordingStore {
            fail: true,
            ..Default::default()
        });
        let uploader = ObjectUploader::new(store, "tubely-videos");

        let err = uploader
            .upload(&path, "landscape/vid1.mp4", "video/mp4")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::UploadFailed(_)));
    }

    #[tokio::test]
    async fn test_upload_rejects_unsafe_keys() {
        let dir = TempDir::new().unwrap();
        let path = local_file(&dir);
        let store = Arc::new(RecordingStore::default());
        let uploader = ObjectUploader::new(store.clone(), "tubely-videos");

        for key in ["", "/landscape/vid1.mp4", "../vid1.mp4"] {
            assert!(matches!(
                uploader.upload(&path, key, "video/mp4").await,
                Err(StorageError::InvalidKey(_))
            ));
        }
        assert!(store.puts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_missing_file() {
        let store = Arc::new(RecordingStore::default());
        let uploader = ObjectUploader::new(store, "tubely-videos");

        let err = uploader
            .upload("/nonexistent/tubely.mp4", "landscape/vid1.mp4", "video/mp4")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Io(_)));
    }
}
