//! FFmpeg CLI wrapper for upload processing.
//!
//! This crate provides:
//! - A narrow `CommandRunner` seam over external tools, with a tokio-backed
//!   implementation that drains stdout/stderr concurrently
//! - Type-safe FFmpeg argument building
//! - Fast-start remuxing (stream copy, `moov` atom moved to the front)
//! - FFprobe geometry probing and aspect classification

pub mod command;
pub mod error;
pub mod probe;
pub mod remux;

pub use command::{
    check_ffmpeg, check_ffprobe, CommandOutput, CommandRunner, FfmpegCommand, ProcessRunner,
};
pub use error::{MediaError, MediaResult};
pub use probe::{parse_dimensions, GeometryClassifier};
pub use remux::{fast_start_output_path, FastStartRemuxer, FAST_START_SUFFIX};
