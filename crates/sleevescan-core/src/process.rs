//! The cover normalization pipeline.
//!
//! [`process`] is the one public operation of the crate: raw upload bytes
//! plus the detector's report go in, a [`ProcessingResult`] comes out. The
//! pipeline is a straight-line sequence of fallible steps with early-exit
//! branches; every failure is converted into a `success: false` result at
//! the top, so nothing is ever thrown across the component boundary and the
//! caller can always fall back to the unprocessed upload.
//!
//! Calls are independent: there is no cache, counter, or lock, so any
//! number of requests may run concurrently.

use thiserror::Error;

use crate::decode::{decode_image, resize_to_fit, FilterType};
use crate::encode::encode_jpeg;
use crate::geometry::{derive_crop_rect, normalized_to_pixels, remap_after_rotation};
use crate::transform::{extract_region, rotate_deskew};
use crate::{AlbumBoundsAnalysis, ProcessingResult};

/// Longest-side ceiling of the output image, in pixels.
pub const MAX_OUTPUT_EDGE: u32 = 1200;

/// Fixed quality of the output JPEG.
pub const OUTPUT_JPEG_QUALITY: u8 = 90;

/// Reported rotations at or below this magnitude (degrees) are treated as
/// detector noise and no rotation pass is run.
pub const ROTATION_DEAD_ZONE_DEGREES: f64 = 0.5;

/// Failure taxonomy of the pipeline. Every variant is surfaced to the
/// caller as `ProcessingResult { success: false, error: Some(..) }` rather
/// than an `Err`.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The detector found no cover, or reported no bounding box.
    #[error("No album detected")]
    NoAlbumDetected,

    /// The upload did not decode, or decoded with a zero dimension.
    #[error("{0}")]
    UnreadableImage(String),

    /// The derived crop rectangle has non-positive width or height.
    #[error("Invalid crop dimensions")]
    InvalidCropGeometry,

    /// A codec-level failure during rotate/extract/resize/encode.
    #[error("{0}")]
    TransformFailure(String),
}

/// Normalize an uploaded sleeve photo using the detector's report.
///
/// Runs the full pipeline: detection gate, decode, coordinate conversion,
/// crop-rect derivation, optional deskew rotation with crop remapping,
/// fit-inside resize, and JPEG encode. Never panics and never returns an
/// error; failures come back as a result with `success: false`.
///
/// `source_mime` is the caller-declared upload type. It is advisory only -
/// decoding sniffs the actual bytes - but it is included in the failure
/// message when the bytes are unreadable, which makes mislabelled uploads
/// much easier to diagnose from logs.
pub fn process(
    image_bytes: &[u8],
    source_mime: &str,
    analysis: &AlbumBoundsAnalysis,
) -> ProcessingResult {
    match run(image_bytes, source_mime, analysis) {
        Ok(output) => ProcessingResult::completed(output.jpeg, output.applied_rotation),
        Err(e) => ProcessingResult::failed(e.to_string()),
    }
}

struct PipelineOutput {
    jpeg: Vec<u8>,
    applied_rotation: f64,
}

fn run(
    image_bytes: &[u8],
    source_mime: &str,
    analysis: &AlbumBoundsAnalysis,
) -> Result<PipelineOutput, ProcessError> {
    // Detection gate: fast reject before any codec work.
    if !analysis.album_detected {
        return Err(ProcessError::NoAlbumDetected);
    }
    let bbox = analysis
        .bounding_box
        .as_ref()
        .ok_or(ProcessError::NoAlbumDetected)?;

    // Decode and probe dimensions.
    let decoded = decode_image(image_bytes).map_err(|e| {
        ProcessError::UnreadableImage(format!("{e} (declared type {source_mime})"))
    })?;
    if decoded.is_empty() {
        return Err(ProcessError::UnreadableImage(
            "Could not read image dimensions".to_string(),
        ));
    }
    let (width, height) = (decoded.width, decoded.height);

    // Normalized corners -> pixel corners -> axis-aligned crop rect.
    let pixel_box = normalized_to_pixels(bbox, width, height);
    let rect =
        derive_crop_rect(&pixel_box, width, height).ok_or(ProcessError::InvalidCropGeometry)?;

    let rotation = analysis.rotation_degrees;
    let (region, applied_rotation) = if rotation.abs() <= ROTATION_DEAD_ZONE_DEGREES {
        (extract_region(&decoded, &rect), 0.0)
    } else {
        // The detector reports the clockwise angle needed to right the
        // cover; rotate_deskew is counter-clockwise positive, so the sign
        // flips here.
        let rotated = rotate_deskew(&decoded, -rotation);
        if rotated.is_empty() {
            return Err(ProcessError::TransformFailure(
                "Rotation produced an empty canvas".to_string(),
            ));
        }
        let remapped =
            remap_after_rotation(&rect, (width, height), (rotated.width, rotated.height));
        (extract_region(&rotated, &remapped), rotation)
    };

    let resized = resize_to_fit(&region, MAX_OUTPUT_EDGE, FilterType::Lanczos3)
        .map_err(|e| ProcessError::TransformFailure(e.to_string()))?;

    let jpeg = encode_jpeg(&resized, OUTPUT_JPEG_QUALITY)
        .map_err(|e| ProcessError::TransformFailure(e.to_string()))?;

    Ok(PipelineOutput {
        jpeg,
        applied_rotation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::DecodedImage;
    use crate::geometry::CropRect;
    use crate::transform::rotated_canvas_bounds;
    use crate::{BoundingBox, Confidence, Point, OUTPUT_MIME};

    fn gradient_jpeg(width: u32, height: u32) -> Vec<u8> {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(((x * 255) / width) as u8);
                pixels.push(((y * 255) / height) as u8);
                pixels.push(96);
            }
        }
        encode_jpeg(&DecodedImage::new(width, height, pixels), 95).unwrap()
    }

    fn inset_box() -> BoundingBox {
        BoundingBox::new(
            Point::new(0.1, 0.1),
            Point::new(0.9, 0.1),
            Point::new(0.9, 0.9),
            Point::new(0.1, 0.9),
        )
    }

    fn analysis(bbox: Option<BoundingBox>, rotation: f64) -> AlbumBoundsAnalysis {
        AlbumBoundsAnalysis {
            album_detected: true,
            bounding_box: bbox,
            rotation_degrees: rotation,
            confidence: Confidence::High,
        }
    }

    fn output_dimensions(result: &ProcessingResult) -> (u32, u32) {
        let bytes = result.processed_image.as_ref().unwrap();
        let decoded = decode_image(bytes).unwrap();
        (decoded.width, decoded.height)
    }

    #[test]
    fn test_detection_gate_rejects_undetected() {
        let result = process(
            &gradient_jpeg(100, 80),
            "image/jpeg",
            &AlbumBoundsAnalysis::not_detected(),
        );

        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("No album detected"));
        assert!(!result.applied_crop);
        assert_eq!(result.applied_rotation, 0.0);
        assert!(result.processed_image.is_none());
    }

    #[test]
    fn test_detection_gate_rejects_missing_box() {
        // albumDetected true but the detector hedged out of the box.
        let result = process(&gradient_jpeg(100, 80), "image/jpeg", &analysis(None, 10.0));

        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("No album detected"));
        assert_eq!(result.applied_rotation, 0.0);
    }

    #[test]
    fn test_detection_gate_ignores_other_fields() {
        // Even a unit box and large rotation are irrelevant once the flag
        // is down.
        let report = AlbumBoundsAnalysis {
            album_detected: false,
            bounding_box: Some(BoundingBox::unit()),
            rotation_degrees: 30.0,
            confidence: Confidence::High,
        };
        let result = process(&gradient_jpeg(100, 80), "image/jpeg", &report);

        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("No album detected"));
    }

    #[test]
    fn test_unreadable_bytes_fail_cleanly() {
        let result = process(
            &[0xDE, 0xAD, 0xBE, 0xEF],
            "image/png",
            &analysis(Some(inset_box()), 0.0),
        );

        assert!(!result.success);
        assert!(!result.error.as_deref().unwrap().is_empty());
        assert!(!result.applied_crop);
        assert_eq!(result.applied_rotation, 0.0);
        assert!(result.processed_image.is_none());
    }

    #[test]
    fn test_unreadable_bytes_report_declared_type() {
        let result = process(&[], "image/webp", &analysis(Some(inset_box()), 0.0));

        assert!(!result.success);
        assert!(result.error.as_deref().unwrap().contains("image/webp"));
    }

    #[test]
    fn test_straight_crop() {
        // 1000x800 photo, box inset 10% on every side, no rotation:
        // the crop region is (100,80)-(900,720) and needs no resize.
        let result = process(
            &gradient_jpeg(1000, 800),
            "image/jpeg",
            &analysis(Some(inset_box()), 0.0),
        );

        assert!(result.success, "error: {:?}", result.error);
        assert!(result.applied_crop);
        assert_eq!(result.applied_rotation, 0.0);
        assert_eq!(result.mime_type, OUTPUT_MIME);
        assert_eq!(output_dimensions(&result), (800, 640));
    }

    #[test]
    fn test_rotation_dead_zone_skips_rotation_pass() {
        let result = process(
            &gradient_jpeg(200, 160),
            "image/jpeg",
            &analysis(Some(inset_box()), 0.3),
        );

        assert!(result.success);
        assert!(result.applied_crop);
        // Reported as unrotated, and the output is exactly the straight
        // crop (160x128), proving the rotation pass never ran.
        assert_eq!(result.applied_rotation, 0.0);
        assert_eq!(output_dimensions(&result), (160, 128));
    }

    #[test]
    fn test_rotation_dead_zone_is_symmetric() {
        let result = process(
            &gradient_jpeg(200, 160),
            "image/jpeg",
            &analysis(Some(inset_box()), -0.4),
        );

        assert!(result.success);
        assert_eq!(result.applied_rotation, 0.0);
    }

    #[test]
    fn test_rotation_just_past_dead_zone_engages() {
        let result = process(
            &gradient_jpeg(200, 160),
            "image/jpeg",
            &analysis(Some(inset_box()), 0.6),
        );

        assert!(result.success);
        assert_eq!(result.applied_rotation, 0.6);
    }

    #[test]
    fn test_rotated_crop_reports_original_angle() {
        // 20 degree tilt: the pipeline rotates by -20 internally but the
        // result reports the detector's signed value.
        let result = process(
            &gradient_jpeg(1000, 800),
            "image/jpeg",
            &analysis(Some(inset_box()), 20.0),
        );

        assert!(result.success, "error: {:?}", result.error);
        assert_eq!(result.applied_rotation, 20.0);
        assert!(result.applied_crop);

        // Output dimensions follow the rescaled-center remap of the
        // original (100,80)-(900,720) rectangle onto the expanded canvas.
        let rotated = rotated_canvas_bounds(1000, 800, 20.0);
        let expected = remap_after_rotation(&CropRect::new(100, 80, 800, 640), (1000, 800), rotated);
        assert_eq!(
            output_dimensions(&result),
            (expected.width, expected.height)
        );
    }

    #[test]
    fn test_negative_rotation() {
        let result = process(
            &gradient_jpeg(400, 320),
            "image/jpeg",
            &analysis(Some(inset_box()), -15.0),
        );

        assert!(result.success, "error: {:?}", result.error);
        assert_eq!(result.applied_rotation, -15.0);
    }

    #[test]
    fn test_degenerate_box_rejected() {
        // All four corners on one vertical line: zero-width crop.
        let line = BoundingBox::new(
            Point::new(0.5, 0.1),
            Point::new(0.5, 0.1),
            Point::new(0.5, 0.9),
            Point::new(0.5, 0.9),
        );
        let result = process(
            &gradient_jpeg(100, 80),
            "image/jpeg",
            &analysis(Some(line), 0.0),
        );

        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Invalid crop dimensions"));
        assert!(!result.applied_crop);
    }

    #[test]
    fn test_nan_box_rejected() {
        // A detector glitch (or a JS NaN surviving deserialization) must
        // fail the crop-geometry gate, not come back as an uncropped
        // success.
        let nan = f64::NAN;
        let broken = BoundingBox::new(
            Point::new(nan, nan),
            Point::new(nan, nan),
            Point::new(nan, nan),
            Point::new(nan, nan),
        );
        let result = process(
            &gradient_jpeg(100, 80),
            "image/jpeg",
            &analysis(Some(broken), 0.0),
        );

        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Invalid crop dimensions"));
        assert!(result.processed_image.is_none());
    }

    #[test]
    fn test_out_of_frame_box_rejected() {
        let outside = BoundingBox::new(
            Point::new(1.2, 0.1),
            Point::new(1.8, 0.1),
            Point::new(1.8, 0.9),
            Point::new(1.2, 0.9),
        );
        let result = process(
            &gradient_jpeg(100, 80),
            "image/jpeg",
            &analysis(Some(outside), 0.0),
        );

        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Invalid crop dimensions"));
    }

    #[test]
    fn test_large_crop_resized_to_ceiling() {
        // A full-frame detection on a 2000x1600 photo must come back
        // bounded to 1200 on the long side, aspect preserved.
        let result = process(
            &gradient_jpeg(2000, 1600),
            "image/jpeg",
            &analysis(Some(BoundingBox::unit()), 0.0),
        );

        assert!(result.success, "error: {:?}", result.error);
        assert_eq!(output_dimensions(&result), (1200, 960));
    }

    #[test]
    fn test_small_crop_never_upscaled() {
        // Crop native resolution is 80x64, far below the ceiling.
        let result = process(
            &gradient_jpeg(100, 80),
            "image/jpeg",
            &analysis(Some(inset_box()), 0.0),
        );

        assert!(result.success);
        assert_eq!(output_dimensions(&result), (80, 64));
    }

    #[test]
    fn test_success_invariant() {
        let result = process(
            &gradient_jpeg(200, 160),
            "image/jpeg",
            &analysis(Some(inset_box()), 0.0),
        );

        assert!(result.success);
        let bytes = result.processed_image.as_ref().unwrap();
        assert!(!bytes.is_empty());
        // Output is always JPEG regardless of the source format.
        assert_eq!(&bytes[0..2], &[0xFF, 0xD8]);
        assert_eq!(result.mime_type, "image/jpeg");
        assert!(result.applied_crop);
        assert!(result.error.is_none());
    }

    #[test]
    fn test_png_source_reencoded_as_jpeg() {
        let rgb = DecodedImage::new(120, 100, vec![200u8; 120 * 100 * 3])
            .to_rgb_image()
            .unwrap();
        let mut buf = std::io::Cursor::new(Vec::new());
        rgb.write_to(&mut buf, image::ImageFormat::Png).unwrap();

        let result = process(
            buf.get_ref(),
            "image/png",
            &analysis(Some(inset_box()), 0.0),
        );

        assert!(result.success, "error: {:?}", result.error);
        assert_eq!(result.mime_type, "image/jpeg");
        let bytes = result.processed_image.unwrap();
        assert_eq!(&bytes[0..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_input_buffer_untouched() {
        let original = gradient_jpeg(100, 80);
        let copy = original.clone();
        let _ = process(&original, "image/jpeg", &analysis(Some(inset_box()), 5.0));
        assert_eq!(original, copy);
    }

    #[test]
    fn test_repeated_calls_independent() {
        // No state persists between invocations: identical inputs give
        // identical outputs.
        let jpeg = gradient_jpeg(200, 160);
        let report = analysis(Some(inset_box()), 3.0);

        let a = process(&jpeg, "image/jpeg", &report);
        let b = process(&jpeg, "image/jpeg", &report);
        assert_eq!(a, b);
    }
}
