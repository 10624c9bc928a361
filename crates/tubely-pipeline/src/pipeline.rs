//! Upload pipeline orchestration.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tracing::Instrument;
use tubely_media::{
    fast_start_output_path, CommandRunner, FastStartRemuxer, GeometryClassifier, ProcessRunner,
};
use tubely_models::{
    AspectClass, StorageObjectRef, UploadRequest, VideoId, MP4_EXTENSION, MP4_MEDIA_TYPE,
};
use tubely_storage::{derive_key, ObjectStore, ObjectUploader};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::logging::PipelineLogger;
use crate::metrics;
use crate::scratch::ScratchFile;
use crate::validation::validate_upload;

/// Progress of a single run. Any state may fail; failure is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Received,
    WrittenLocal,
    Remuxed,
    Classified,
    Uploaded,
    Done,
}

impl PipelineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineState::Received => "received",
            PipelineState::WrittenLocal => "written_local",
            PipelineState::Remuxed => "remuxed",
            PipelineState::Classified => "classified",
            PipelineState::Uploaded => "uploaded",
            PipelineState::Done => "done",
        }
    }
}

struct RunOutcome {
    object: StorageObjectRef,
    aspect: AspectClass,
    size_bytes: u64,
}

/// Sequences validation, local write, remux, classification and upload.
///
/// Runs share nothing but configuration and clients, so one pipeline can
/// serve concurrent uploads for distinct video IDs.
#[derive(Clone)]
pub struct UploadPipeline {
    config: Arc<PipelineConfig>,
    remuxer: FastStartRemuxer,
    classifier: GeometryClassifier,
    uploader: ObjectUploader,
}

impl UploadPipeline {
    pub fn new(
        config: PipelineConfig,
        runner: Arc<dyn CommandRunner>,
        store: Arc<dyn ObjectStore>,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            remuxer: FastStartRemuxer::new(runner.clone(), config.ffmpeg_path.clone()),
            classifier: GeometryClassifier::new(runner, config.ffprobe_path.clone()),
            uploader: ObjectUploader::new(store, bucket),
            config: Arc::new(config),
        }
    }

    /// Build a pipeline that runs the real tools with the configured timeout.
    pub fn from_config(
        config: PipelineConfig,
        store: Arc<dyn ObjectStore>,
        bucket: impl Into<String>,
    ) -> Self {
        let runner = ProcessRunner::new().with_timeout(config.tool_timeout.as_secs());
        Self::new(config, Arc::new(runner), store, bucket)
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Scratch path for the raw upload of `video_id`.
    pub fn scratch_path(&self, video_id: &VideoId) -> PathBuf {
        self.config
            .scratch_dir
            .join(format!("{}.{}", video_id, MP4_EXTENSION))
    }

    /// Run one upload to completion.
    ///
    /// On success the object is in storage under `<aspect>/<video_id>.mp4`.
    /// On any outcome, including cancellation of the returned future, no
    /// scratch file of this run is left behind.
    pub async fn run(&self, request: UploadRequest) -> PipelineResult<StorageObjectRef> {
        let logger = PipelineLogger::for_request(&request);
        let span = logger.create_span();
        let start = Instant::now();

        logger.log_start(&request);
        let _in_flight = metrics::InFlightUpload::enter();

        let result = self.execute(request, &logger).instrument(span).await;
        let elapsed = start.elapsed();

        match result {
            Ok(outcome) => {
                // Scratch guards were dropped when `execute` returned.
                logger.log_stage(PipelineState::Done, "scratch files released");
                metrics::record_upload_completed(
                    outcome.aspect,
                    outcome.size_bytes,
                    elapsed.as_secs_f64(),
                );
                logger.log_completion(&outcome.object.key, elapsed);
                Ok(outcome.object)
            }
            Err(e) => {
                metrics::record_upload_failed(e.stage(), elapsed.as_secs_f64());
                logger.log_failure(&e, elapsed);
                Err(e)
            }
        }
    }

    async fn execute(
        &self,
        request: UploadRequest,
        logger: &PipelineLogger,
    ) -> PipelineResult<RunOutcome> {
        validate_upload(&request, &self.config)?;
        logger.log_stage(PipelineState::Received, "request validated");

        let UploadRequest {
            video_id,
            file,
            declared_size,
            ..
        } = request;
        let data = file.ok_or_else(|| PipelineError::validation("Missing video file"))?;
        let size_bytes = data.len() as u64;
        if declared_size != size_bytes {
            logger.log_warning(&format!(
                "declared size {} differs from received size {}",
                declared_size, size_bytes
            ));
        }

        self.config
            .ensure_scratch_dir()
            .await
            .map_err(|e| PipelineError::io("creating scratch directory", e))?;

        let original = ScratchFile::create(self.scratch_path(&video_id), &data)
            .await
            .map_err(|e| PipelineError::io("writing upload to scratch", e))?;
        drop(data);
        logger.log_stage(PipelineState::WrittenLocal, "upload written to scratch");

        // Claimed before the tool runs so a partial output is removed too.
        let remuxed = ScratchFile::claim(fast_start_output_path(original.path()));
        self.remuxer
            .remux(original.path())
            .await
            .map_err(PipelineError::Remux)?;
        logger.log_stage(PipelineState::Remuxed, "moov atom moved to front");

        let aspect = self
            .classifier
            .classify(remuxed.path())
            .await
            .map_err(PipelineError::Probe)?;
        logger.log_stage(PipelineState::Classified, aspect.as_str());

        let key = derive_key(aspect, &video_id);
        let object = self
            .uploader
            .upload(remuxed.path(), &key, MP4_MEDIA_TYPE)
            .await
            .map_err(PipelineError::Storage)?;
        logger.log_stage(PipelineState::Uploaded, &object.to_string());

        Ok(RunOutcome {
            object,
            aspect,
            size_bytes,
        })
    }
}
