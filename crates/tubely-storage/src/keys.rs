//! Storage key derivation.
//!
//! Key format: `<aspect>/<video_id>.mp4`, e.g. `landscape/abc123.mp4`. The
//! aspect class acts as a first-level directory; consumers resolving stored
//! references rely on this shape.

use tubely_models::{AspectClass, VideoId, MP4_EXTENSION};

/// Build the storage key for a classified video.
pub fn derive_key(aspect: AspectClass, video_id: &VideoId) -> String {
    format!("{}/{}.{}", aspect.as_str(), video_id, MP4_EXTENSION)
}

/// Split a key produced by [`derive_key`] back into its parts.
pub fn parse_key(key: &str) -> Option<(AspectClass, VideoId)> {
    let (prefix, leaf) = key.split_once('/')?;
    let aspect = prefix.parse().ok()?;
    let id = leaf.strip_suffix(MP4_EXTENSION)?.strip_suffix('.')?;

    if id.is_empty() || id.contains('/') {
        return None;
    }

    Some((aspect, VideoId::from(id)))
}
