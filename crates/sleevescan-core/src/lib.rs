//! Sleevescan Core - Album-cover geometric normalization
//!
//! This crate takes a photo of a vinyl record sleeve plus the quadrilateral
//! reported by the AI bounds detector and produces a straightened, cropped,
//! size-bounded JPEG ready for upload. It covers:
//! - Boundary types mirroring the detector's JSON report
//! - Normalized-to-pixel coordinate conversion and crop-rect derivation
//! - Deskew rotation, region extraction, fit-inside resize, JPEG encode
//! - The single-pass `process` pipeline tying the steps together

pub mod decode;
pub mod encode;
pub mod geometry;
pub mod process;
pub mod transform;

pub use geometry::{derive_crop_rect, normalized_to_pixels, remap_after_rotation, CropRect};
pub use process::{process, ProcessError};
pub use transform::{extract_region, rotate_deskew, rotated_canvas_bounds};

/// MIME type of every successfully processed image.
///
/// Output is always re-encoded to JPEG regardless of the source format, to
/// normalize storage size and decoding cost downstream.
pub const OUTPUT_MIME: &str = "image/jpeg";

/// A 2D coordinate.
///
/// In detector output the coordinates are normalized (0.0 to 1.0 relative to
/// image width/height); after [`normalized_to_pixels`] they are absolute
/// pixel positions. Both use the same type since only the unit changes.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// The four corners of a detected album cover, clockwise from top-left as
/// the cover visually appears in the photo.
///
/// The corners need not form a rectangle: a sleeve photographed at an angle
/// is a skewed quadrilateral, and consumers derive an axis-aligned bounding
/// rectangle from it (see [`derive_crop_rect`]).
///
/// Field names serialize camelCase to match the detector's JSON verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub top_left: Point,
    pub top_right: Point,
    pub bottom_right: Point,
    pub bottom_left: Point,
}

impl BoundingBox {
    pub fn new(top_left: Point, top_right: Point, bottom_right: Point, bottom_left: Point) -> Self {
        Self {
            top_left,
            top_right,
            bottom_right,
            bottom_left,
        }
    }

    /// The full-frame unit box: (0,0) (1,0) (1,1) (0,1).
    pub fn unit() -> Self {
        Self::new(
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        )
    }
}

/// Detector confidence in the reported bounds.
///
/// Serialized as `"high" | "medium" | "low"`, matching the detector enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    #[default]
    Low,
}

/// The bounds detector's full report for one recognition request.
///
/// Produced once per request by the external AI vision call and consumed
/// exactly once by [`process`]; never persisted. `boundingBox` may be absent
/// even when `albumDetected` is true (the detector hedges), which the
/// pipeline treats the same as no detection.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumBoundsAnalysis {
    /// Whether the detector found an album cover at all.
    pub album_detected: bool,
    /// Corners of the detected cover, normalized 0.0 to 1.0.
    #[serde(default)]
    pub bounding_box: Option<BoundingBox>,
    /// Clockwise rotation (degrees) needed to make the cover upright.
    /// Domain is roughly -45 to 45.
    #[serde(default)]
    pub rotation_degrees: f64,
    /// Detector confidence in the bounds.
    #[serde(default)]
    pub confidence: Confidence,
}

impl AlbumBoundsAnalysis {
    /// A report for a frame in which nothing was detected.
    pub fn not_detected() -> Self {
        Self {
            album_detected: false,
            bounding_box: None,
            rotation_degrees: 0.0,
            confidence: Confidence::Low,
        }
    }
}

/// The processor's sole output, returned by value to the caller.
///
/// `success` and a populated `processed_image` are coupled: a failure never
/// carries partial output. `processed_image` holds **raw JPEG bytes**; the
/// wasm bindings hand them to JavaScript as a `Uint8Array` and the frontend
/// builds a data URI from them when needed.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingResult {
    /// Whether processing produced an output image.
    pub success: bool,
    /// Encoded JPEG bytes; present exactly when `success` is true.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_image: Option<Vec<u8>>,
    /// Always [`OUTPUT_MIME`]; kept in the result so the JSON shape is
    /// self-describing for the upload path.
    pub mime_type: String,
    /// The detector-reported rotation that was applied, 0 if none was.
    pub applied_rotation: f64,
    /// Whether a crop was applied.
    pub applied_crop: bool,
    /// Human-readable failure reason; present exactly when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProcessingResult {
    /// A successful result carrying the encoded output.
    pub fn completed(processed_image: Vec<u8>, applied_rotation: f64) -> Self {
        Self {
            success: true,
            processed_image: Some(processed_image),
            mime_type: OUTPUT_MIME.to_string(),
            applied_rotation,
            applied_crop: true,
            error: None,
        }
    }

    /// A failure result with the given reason. No crop or rotation is
    /// reported as applied, and no image is attached.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            processed_image: None,
            mime_type: OUTPUT_MIME.to_string(),
            applied_rotation: 0.0,
            applied_crop: false,
            error: Some(error.into()),
        }
    }
}
