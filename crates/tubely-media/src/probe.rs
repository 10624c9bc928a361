//! FFprobe geometry probing.

use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use tubely_models::{AspectClass, VideoDimensions};

use crate::command::CommandRunner;
use crate::error::{MediaError, MediaResult};

/// FFprobe JSON output, restricted to what we request.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    width: Option<u32>,
    height: Option<u32>,
}

/// Classifies a local video file by the geometry of its first video stream.
#[derive(Clone)]
pub struct GeometryClassifier {
    runner: Arc<dyn CommandRunner>,
    ffprobe_path: String,
}

impl GeometryClassifier {
    pub fn new(runner: Arc<dyn CommandRunner>, ffprobe_path: impl Into<String>) -> Self {
        Self {
            runner,
            ffprobe_path: ffprobe_path.into(),
        }
    }

    /// Arguments selecting `v:0` width/height as JSON.
    pub fn probe_args(path: &Path) -> Vec<String> {
        vec![
            "-v".to_string(),
            "error".to_string(),
            "-select_streams".to_string(),
            "v:0".to_string(),
            "-show_entries".to_string(),
            "stream=width,height".to_string(),
            "-of".to_string(),
            "json".to_string(),
            path.to_string_lossy().to_string(),
        ]
    }

    /// Probe the width and height of the first video stream.
    pub async fn probe(&self, path: impl AsRef<Path>) -> MediaResult<VideoDimensions> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(MediaError::FileNotFound(path.to_path_buf()));
        }

        let output = self
            .runner
            .run(&self.ffprobe_path, &Self::probe_args(path))
            .await?;

        if !output.success() {
            return Err(MediaError::probe_failed(
                output.exit_description(),
                output.stderr,
            ));
        }

        parse_dimensions(&output.stdout)
    }

    /// Probe and classify a video file.
    pub async fn classify(&self, path: impl AsRef<Path>) -> MediaResult<AspectClass> {
        let path = path.as_ref();
        let dimensions = self.probe(path).await?;
        let class = dimensions.aspect_class();

        debug!(
            path = %path.display(),
            dimensions = %dimensions,
            aspect = %class,
            "Classified video geometry"
        );

        Ok(class)
    }
}

/// Parse FFprobe JSON into the first stream's dimensions.
pub fn parse_dimensions(stdout: &[u8]) -> MediaResult<VideoDimensions> {
    let probe: FfprobeOutput = serde_json::from_slice(stdout)?;

    let stream = probe.streams.first().ok_or(MediaError::NoStreams)?;

    match (stream.width, stream.height) {
        (Some(width), Some(height)) => {
            let dimensions = VideoDimensions::new(width, height);
            if dimensions.is_valid() {
                Ok(dimensions)
            } else {
                Err(MediaError::InvalidVideo(format!(
                    "Video stream reports zero-sized dimensions {}",
                    dimensions
                )))
            }
        }
        _ => Err(MediaError::InvalidVideo(
            "Video stream reports no width/height".to_string(),
        )),
    }
}
