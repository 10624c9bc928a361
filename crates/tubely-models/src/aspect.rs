//! Video geometry classification.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Numerator of the reference 16:9 ratio.
const RATIO_WIDE: u64 = 16;
/// Denominator of the reference 16:9 ratio.
const RATIO_NARROW: u64 = 9;

/// Geometry class of a video, used as the first segment of its storage key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AspectClass {
    /// Exactly 16:9 after flooring
    Landscape,
    /// Exactly 9:16 after flooring
    Portrait,
    /// Everything else, including near misses
    Other,
}

impl AspectClass {
    /// All classes, in classification order.
    pub const ALL: [AspectClass; 3] = [
        AspectClass::Landscape,
        AspectClass::Portrait,
        AspectClass::Other,
    ];

    /// Classify a width/height pair.
    ///
    /// `landscape` when `width == floor(16/9 * height)`, otherwise `portrait`
    /// when `height == floor(16/9 * width)`, otherwise `other`. The comparison
    /// is exact: a single pixel off the 16:9 family lands in `other`.
    pub fn classify(width: u32, height: u32) -> Self {
        if u64::from(width) == scaled_floor(height) {
            AspectClass::Landscape
        } else if u64::from(height) == scaled_floor(width) {
            AspectClass::Portrait
        } else {
            AspectClass::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AspectClass::Landscape => "landscape",
            AspectClass::Portrait => "portrait",
            AspectClass::Other => "other",
        }
    }
}

/// `floor(16/9 * side)` in integer arithmetic.
fn scaled_floor(side: u32) -> u64 {
    RATIO_WIDE * u64::from(side) / RATIO_NARROW
}

impl fmt::Display for AspectClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AspectClass {
    type Err = AspectClassParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "landscape" => Ok(AspectClass::Landscape),
            "portrait" => Ok(AspectClass::Portrait),
            "other" => Ok(AspectClass::Other),
            _ => Err(AspectClassParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown aspect class: {0}, expected landscape, portrait or other")]
pub struct AspectClassParseError(pub String);

/// Pixel dimensions of the first video stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct VideoDimensions {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl VideoDimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Both sides are non-zero.
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn aspect_class(&self) -> AspectClass {
        AspectClass::classify(self.width, self.height)
    }
}

impl fmt::Display for VideoDimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_dimensions() {
        assert_eq!(AspectClass::classify(1920, 1080), AspectClass::Landscape);
        assert_eq!(AspectClass::classify(1080, 1920), AspectClass::Portrait);
        assert_eq!(AspectClass::classify(1000, 1000), AspectClass::Other);
        assert_eq!(AspectClass::classify(1921, 1080), AspectClass::Other);
    }

    #[test]
    fn test_floor_applies_to_non_multiples_of_nine() {
        // 16 * 100 / 9 = 177.77.. -> 177
        assert_eq!(AspectClass::classify(177, 100), AspectClass::Landscape);
        assert_eq!(AspectClass::classify(178, 100), AspectClass::Other);
        assert_eq!(AspectClass::classify(100, 177), AspectClass::Portrait);
    }

    #[test]
    fn test_common_resolutions() {
        assert_eq!(AspectClass::classify(1280, 720), AspectClass::Landscape);
        assert_eq!(AspectClass::classify(3840, 2160), AspectClass::Landscape);
        assert_eq!(AspectClass::classify(720, 1280), AspectClass::Portrait);
        assert_eq!(AspectClass::classify(640, 480), AspectClass::Other);
        // Swapped-by-rounding content stays "other"
        assert_eq!(AspectClass::classify(1080, 1921), AspectClass::Other);
    }

    #[test]
    fn test_large_dimensions_do_not_overflow() {
        assert_eq!(
            AspectClass::classify(u32::MAX, u32::MAX),
            AspectClass::Other
        );
    }

    #[test]
    fn test_parse_round_trip() {
        for class in AspectClass::ALL {
            assert_eq!(class.as_str().parse::<AspectClass>().unwrap(), class);
        }
        assert!("square".parse::<AspectClass>().is_err());
    }

    #[test]
    fn test_serde_uses_lowercase_names() {
        let json = serde_json::to_string(&AspectClass::Portrait).unwrap();
        assert_eq!(json, "\"portrait\"");
    }

    #[test]
    fn test_dimensions_validity() {
        assert!(VideoDimensions::new(1920, 1080).is_valid());
        assert!(!VideoDimensions::new(0, 1080).is_valid());
        assert_eq!(VideoDimensions::new(1920, 1080).to_string(), "1920x1080");
    }
}
