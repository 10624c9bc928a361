//! Pipeline metrics.
//!
//! Emitted through the `metrics` facade; installing a recorder is left to
//! the embedding process.

use metrics::{counter, gauge, histogram};
use tubely_models::AspectClass;

/// Metric names as constants for consistency.
pub mod names {
    pub const UPLOADS_STARTED_TOTAL: &str = "tubely_uploads_started_total";
    pub const UPLOADS_COMPLETED_TOTAL: &str = "tubely_uploads_completed_total";
    pub const UPLOADS_FAILED_TOTAL: &str = "tubely_uploads_failed_total";
    pub const UPLOADS_IN_FLIGHT: &str = "tubely_uploads_in_flight";
    pub const PIPELINE_DURATION_SECONDS: &str = "tubely_pipeline_duration_seconds";
    pub const UPLOAD_BYTES_TOTAL: &str = "tubely_upload_bytes_total";
}

/// Marks one run as in flight for as long as it is held.
///
/// The gauge is decremented on drop, so cancelled runs are released too.
#[must_use]
pub struct InFlightUpload(());

impl InFlightUpload {
    /// Record a run entering the pipeline.
    pub fn enter() -> Self {
        counter!(names::UPLOADS_STARTED_TOTAL).increment(1);
        gauge!(names::UPLOADS_IN_FLIGHT).increment(1.0);
        Self(())
    }
}

impl Drop for InFlightUpload {
    fn drop(&mut self) {
        gauge!(names::UPLOADS_IN_FLIGHT).decrement(1.0);
    }
}

/// Record a successful run.
pub fn record_upload_completed(aspect: AspectClass, size_bytes: u64, duration_secs: f64) {
    let labels = [("aspect", aspect.as_str().to_string())];
    counter!(names::UPLOADS_COMPLETED_TOTAL, &labels).increment(1);
    counter!(names::UPLOAD_BYTES_TOTAL).increment(size_bytes);
    histogram!(names::PIPELINE_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record a failed run.
pub fn record_upload_failed(stage: &str, duration_secs: f64) {
    let labels = [("stage", stage.to_string())];
    counter!(names::UPLOADS_FAILED_TOTAL, &labels).increment(1);
    histogram!(names::PIPELINE_DURATION_SECONDS, &labels).record(duration_secs);
}
