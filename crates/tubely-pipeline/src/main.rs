//! Upload a local video through the pipeline and print a retrieval URL.
//!
//! Usage: `tubely-upload <video-id> <file> [media-type]`

use std::sync::Arc;

use anyhow::{bail, Context};
use tracing::info;

use tubely_media::{check_ffmpeg, check_ffprobe};
use tubely_models::{UploadRequest, MP4_MEDIA_TYPE};
use tubely_pipeline::{init_tracing, PipelineConfig, UploadPipeline};
use tubely_storage::{ObjectStore, PresignedUrlIssuer, S3Client};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (video_id, file_path, media_type) = match args.as_slice() {
        [id, path] => (id.clone(), path.clone(), MP4_MEDIA_TYPE.to_string()),
        [id, path, media_type] => (id.clone(), path.clone(), media_type.clone()),
        _ => bail!("usage: tubely-upload <video-id> <file> [media-type]"),
    };

    let config = PipelineConfig::from_env();
    info!("Pipeline config: {:?}", config);

    check_ffmpeg(&config.ffmpeg_path)?;
    check_ffprobe(&config.ffprobe_path)?;

    let s3 = S3Client::from_env().await?;
    let bucket = s3.bucket().to_string();
    let store: Arc<dyn ObjectStore> = Arc::new(s3.clone());

    let issuer =
        PresignedUrlIssuer::new(store.clone(), bucket.clone()).with_default_ttl(config.presign_ttl);
    let pipeline = UploadPipeline::from_config(config, store, bucket);

    let data = tokio::fs::read(&file_path)
        .await
        .with_context(|| format!("reading {}", file_path))?;
    let owner_id = std::env::var("TUBELY_OWNER_ID").unwrap_or_else(|_| "cli".to_string());
    let request = UploadRequest::new(owner_id, video_id, data, media_type);

    let object = pipeline.run(request).await?;
    let presigned = issuer.issue_for(&object).await?;

    println!("stored:     {}", object);
    println!("public:     {}", s3.public_url(&object.key));
    println!("url:        {}", presigned.url);
    println!("expires_at: {}", presigned.expires_at.to_rfc3339());

    Ok(())
}
