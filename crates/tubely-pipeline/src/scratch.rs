//! Scratch files owned by a single pipeline run.

use std::io;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// A local file path owned by one pipeline run, removed when dropped.
///
/// Removal happens on every exit path: normal return, `?` propagation, a
/// panic unwinding through the run, or the run's future being dropped.
/// Removal errors are logged and otherwise ignored.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    /// Take ownership of `path`, which a later step is expected to create.
    pub fn claim(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create `path` with `data`. A partially written file is removed on error.
    pub async fn create(path: impl Into<PathBuf>, data: &[u8]) -> io::Result<Self> {
        let scratch = Self::claim(path);

        let mut file = tokio::fs::File::create(&scratch.path).await?;
        file.write_all(data).await?;
        file.flush().await?;

        debug!(
            path = %scratch.path.display(),
            size_bytes = data.len(),
            "Wrote scratch file"
        );
        Ok(scratch)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        // Deliberately blocking: Drop cannot await, and one unlink is cheap.
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Removed scratch file"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                path = %self.path.display(),
                error = %e,
                "Failed to remove scratch file"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_create_and_drop_removes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vid1.mp4");

        let scratch = ScratchFile::create(&path, b"data").await.unwrap();
        assert_eq!(tokio::fs::read(scratch.path()).await.unwrap(), b"data");

        drop(scratch);
        assert!(!path.exists());
    }

    #[test]
    fn test_claim_tolerates_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("never-created.mp4.processing");

        let scratch = ScratchFile::claim(&path);
        drop(scratch);
        assert!(!path.exists());
    }

    #[test]
    fn test_claim_removes_file_created_later() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vid1.mp4.processing");

        let scratch = ScratchFile::claim(&path);
        std::fs::write(&path, b"partial output").unwrap();
        drop(scratch);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_create_in_missing_directory_fails_without_leftovers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("vid1.mp4");

        let err = ScratchFile::create(&path, b"data").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(!path.exists());
    }

    #[test]
    fn test_removed_on_panic() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vid1.mp4");
        std::fs::write(&path, b"data").unwrap();

        let guarded = path.clone();
        let result = std::panic::catch_unwind(move || {
            let _scratch = ScratchFile::claim(guarded);
            panic!("stage blew up");
        });

        assert!(result.is_err());
        assert!(!path.exists());
    }
}
