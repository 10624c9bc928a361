//! Video upload pipeline.
//!
//! Sequences one upload end to end: validate, write a scratch copy, remux
//! for fast start, classify geometry, derive the storage key and upload.
//! Scratch files are removed on every exit path.

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod scratch;
pub mod service;
pub mod validation;

pub use config::PipelineConfig;
pub use error::{FailureCategory, PipelineError, PipelineResult};
pub use logging::{init_tracing, PipelineLogger};
pub use pipeline::{PipelineState, UploadPipeline};
pub use scratch::ScratchFile;
pub use service::{VideoStore, VideoUploadService};
pub use validation::validate_upload;
