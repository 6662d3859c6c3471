//! Crop geometry for detected album covers.
//!
//! The bounds detector reports a quadrilateral in normalized coordinates.
//! This module converts it to pixel space, derives the axis-aligned crop
//! rectangle, and remaps that rectangle onto the expanded canvas produced
//! by a deskew rotation. Everything here is pure coordinate math with no
//! pixel access, so each step is testable standalone.

use crate::{BoundingBox, Point};

/// An axis-aligned crop rectangle in pixel units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    /// Left edge in pixels.
    pub x: u32,
    /// Top edge in pixels.
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }
}

/// Convert a normalized bounding box to pixel coordinates.
///
/// Each corner's `x` is scaled by the image width and `y` by the image
/// height independently; there is no shared scale factor, so non-square
/// images stretch the two axes differently.
///
/// # Example
///
/// ```ignore
/// let px = normalized_to_pixels(&bbox, 1000, 800);
/// // {x: 0.1, y: 0.1} maps to {x: 100.0, y: 80.0}
/// ```
pub fn normalized_to_pixels(bbox: &BoundingBox, width: u32, height: u32) -> BoundingBox {
    let scale = |p: Point| Point::new(p.x * width as f64, p.y * height as f64);
    BoundingBox {
        top_left: scale(bbox.top_left),
        top_right: scale(bbox.top_right),
        bottom_right: scale(bbox.bottom_right),
        bottom_left: scale(bbox.bottom_left),
    }
}

/// Derive the axis-aligned crop rectangle containing a pixel-space
/// quadrilateral, clamped to the image bounds.
///
/// Each image edge considers only its own corner pair:
/// - left edge: min of `topLeft.x` / `bottomLeft.x`, floored
/// - right edge: max of `topRight.x` / `bottomRight.x`, ceiled
/// - top edge: min of `topLeft.y` / `topRight.y`, floored
/// - bottom edge: max of `bottomLeft.y` / `bottomRight.y`, ceiled
///
/// This corner-to-edge assignment is part of the output contract; callers
/// that feed corners in an arbitrary order will not get the full min/max
/// over all four points.
///
/// Returns `None` when any corner coordinate is non-finite, or when the
/// clamped rectangle has non-positive width or height (a degenerate or
/// fully out-of-frame detection).
pub fn derive_crop_rect(pixel_box: &BoundingBox, width: u32, height: u32) -> Option<CropRect> {
    // NaN would slip through the min/max chain below (f64::min/max ignore
    // NaN operands) and clamp to the full frame, so reject it up front.
    // Detector JSON can carry NaN through the wasm deserializer.
    let corners = [
        pixel_box.top_left,
        pixel_box.top_right,
        pixel_box.bottom_right,
        pixel_box.bottom_left,
    ];
    if corners.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
        return None;
    }

    let min_x = pixel_box
        .top_left
        .x
        .min(pixel_box.bottom_left.x)
        .floor()
        .max(0.0);
    let max_x = pixel_box
        .top_right
        .x
        .max(pixel_box.bottom_right.x)
        .ceil()
        .min(width as f64);
    let min_y = pixel_box
        .top_left
        .y
        .min(pixel_box.top_right.y)
        .floor()
        .max(0.0);
    let max_y = pixel_box
        .bottom_left
        .y
        .max(pixel_box.bottom_right.y)
        .ceil()
        .min(height as f64);

    let crop_width = max_x - min_x;
    let crop_height = max_y - min_y;
    if crop_width <= 0.0 || crop_height <= 0.0 {
        return None;
    }

    Some(CropRect::new(
        min_x as u32,
        min_y as u32,
        crop_width as u32,
        crop_height as u32,
    ))
}

/// Remap a crop rectangle onto the expanded canvas of a rotated image.
///
/// Deskew rotation grows the canvas, so the rectangle derived on the
/// original image no longer lines up. Rather than re-running detection, the
/// rectangle's center and size are rescaled by the per-axis canvas growth
/// (`new/old`), then re-anchored around the scaled center and clamped so the
/// extract region never leaves the rotated canvas.
///
/// This is a deliberate approximation: it does not re-project the original
/// quadrilateral's corners through the rotation matrix. It is accurate for
/// the small deskew angles the detector reports and degrades as the angle
/// grows; sub-pixel correctness at large angles is out of contract.
///
/// `original` must be the non-zero dimensions the rectangle was derived on.
pub fn remap_after_rotation(
    rect: &CropRect,
    original: (u32, u32),
    rotated: (u32, u32),
) -> CropRect {
    let (old_w, old_h) = (original.0 as f64, original.1 as f64);
    let (new_w, new_h) = (rotated.0 as f64, rotated.1 as f64);
    let scale_x = new_w / old_w;
    let scale_y = new_h / old_h;

    let center_x = rect.x as f64 + rect.width as f64 / 2.0;
    let center_y = rect.y as f64 + rect.height as f64 / 2.0;

    let new_center_x = center_x * scale_x;
    let new_center_y = center_y * scale_y;
    let new_crop_w = rect.width as f64 * scale_x;
    let new_crop_h = rect.height as f64 * scale_y;

    let new_min_x = (new_center_x - new_crop_w / 2.0).floor().max(0.0);
    let new_min_y = (new_center_y - new_crop_h / 2.0).floor().max(0.0);

    let out_width = new_crop_w.floor().min(new_w - new_min_x).max(1.0);
    let out_height = new_crop_h.floor().min(new_h - new_min_y).max(1.0);

    CropRect::new(
        new_min_x as u32,
        new_min_y as u32,
        out_width as u32,
        out_height as u32,
    )
}


// ============================================================================
// Property-Based Tests
// ============================================================================
