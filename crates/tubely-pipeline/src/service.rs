//! Video upload service.
//!
//! Ties the pipeline to video metadata: ownership checks before the run,
//! persisting the storage key after it, and signing keys on the way out.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};
use tubely_models::{UploadRequest, Video, VideoId};
use tubely_storage::PresignedUrlIssuer;

use crate::error::{PipelineError, PipelineResult};
use crate::pipeline::UploadPipeline;

/// Persistence for video records.
#[async_trait]
pub trait VideoStore: Send + Sync {
    async fn get_video(&self, id: &VideoId) -> PipelineResult<Option<Video>>;

    async fn update_video(&self, video: &Video) -> PipelineResult<()>;
}

pub struct VideoUploadService {
    pipeline: UploadPipeline,
    issuer: PresignedUrlIssuer,
    videos: Arc<dyn VideoStore>,
}

impl VideoUploadService {
    pub fn new(
        pipeline: UploadPipeline,
        issuer: PresignedUrlIssuer,
        videos: Arc<dyn VideoStore>,
    ) -> Self {
        Self {
            pipeline,
            issuer,
            videos,
        }
    }

    /// Upload media for an existing video owned by the requester.
    ///
    /// The record is only updated after the object is stored, and the
    /// stored record keeps the key. The returned copy carries a signed URL.
    pub async fn upload_video(&self, request: UploadRequest) -> PipelineResult<Video> {
        let mut video = match self.videos.get_video(&request.video_id).await? {
            Some(video) if video.is_owned_by(&request.owner_id) => video,
            Some(_) => {
                warn!(
                    video_id = %request.video_id,
                    owner_id = %request.owner_id,
                    "Upload rejected: requester does not own video"
                );
                return Err(PipelineError::forbidden("Not authorized to upload this video"));
            }
            None => {
                return Err(PipelineError::forbidden("Not authorized to upload this video"));
            }
        };

        let object = self.pipeline.run(request).await?;

        video.set_storage_key(object.key);
        self.videos.update_video(&video).await?;
        info!(video_id = %video.id, "Video record updated with storage key");

        self.sign_video(video).await
    }

    /// Replace the stored key on `video` with a presigned URL.
    ///
    /// Videos without uploaded media are returned unchanged.
    pub async fn sign_video(&self, mut video: Video) -> PipelineResult<Video> {
        let Some(key) = video.video_url.as_deref() else {
            return Ok(video);
        };

        let presigned = self
            .issuer
            .issue_default(key)
            .await
            .map_err(PipelineError::Presign)?;
        video.video_url = Some(presigned.url);
        Ok(video)
    }
}
