//! Deskew rotation for tilted sleeve photos.
//!
//! The detector reports small tilt angles (roughly -45 to 45 degrees). The
//! whole photo is rotated about its center onto an expanded canvas sized to
//! contain every source pixel, and the newly exposed canvas area is filled
//! solid white - the processed cover is later cropped out of the middle, so
//! the fill only survives near the crop borders.
//!
//! Rotation uses inverse mapping: for each destination pixel the source
//! position is found through the inverse rotation and sampled bilinearly.

use crate::decode::DecodedImage;

/// Canvas fill for areas outside the source image after rotation.
const FILL: [u8; 3] = [255, 255, 255];

/// Compute the canvas size that contains an image rotated by the given
/// angle (degrees, positive = counter-clockwise).
///
/// The bounding box of a rotated w x h rectangle is
/// `(w|cos| + h|sin|, w|sin| + h|cos|)`.
pub fn rotated_canvas_bounds(width: u32, height: u32, angle_degrees: f64) -> (u32, u32) {
    // Near-zero angles keep the canvas as-is.
    if angle_degrees.abs() < 0.001 {
        return (width, height);
    }

    let angle_rad = angle_degrees.to_radians();
    let cos = angle_rad.cos().abs();
    let sin = angle_rad.sin().abs();

    let w = width as f64;
    let h = height as f64;

    let new_w = (w * cos + h * sin).round() as u32;
    let new_h = (w * sin + h * cos).round() as u32;

    (new_w.max(1), new_h.max(1))
}

/// Rotate an image about its center onto an expanded white canvas.
///
/// `angle_degrees` is positive for counter-clockwise rotation; the pipeline
/// negates the detector's clockwise angle before calling (the two
/// conventions are opposite). Returns a new image; the source is untouched.
pub fn rotate_deskew(image: &DecodedImage, angle_degrees: f64) -> DecodedImage {
    if angle_degrees.abs() < 0.001 {
        return image.clone();
    }

    let (dst_w, dst_h) = rotated_canvas_bounds(image.width, image.height, angle_degrees);

    // Inverse transform: destination -> source, so negate the angle.
    let angle_rad = -angle_degrees.to_radians();
    let (sin, cos) = angle_rad.sin_cos();

    let src_cx = image.width as f64 / 2.0;
    let src_cy = image.height as f64 / 2.0;
    let dst_cx = dst_w as f64 / 2.0;
    let dst_cy = dst_h as f64 / 2.0;

    let mut output = vec![0u8; (dst_w * dst_h) as usize * 3];

    for dst_y in 0..dst_h {
        for dst_x in 0..dst_w {
            let dx = dst_x as f64 - dst_cx;
            let dy = dst_y as f64 - dst_cy;

            let src_x = dx * cos - dy * sin + src_cx;
            let src_y = dx * sin + dy * cos + src_cy;

            let pixel = sample_bilinear(image, src_x, src_y);

            let idx = ((dst_y * dst_w + dst_x) * 3) as usize;
            output[idx..idx + 3].copy_from_slice(&pixel);
        }
    }

    DecodedImage::new(dst_w, dst_h, output)
}

/// Sample a source position bilinearly, returning the white fill for
/// positions outside the source image.
fn sample_bilinear(image: &DecodedImage, x: f64, y: f64) -> [u8; 3] {
    let (w, h) = (image.width as i64, image.height as i64);

    if x < 0.0 || y < 0.0 || x > (w - 1) as f64 || y > (h - 1) as f64 {
        return FILL;
    }

    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    // Clamp the far sample so the last row/column interpolates against
    // itself instead of the fill.
    let x1 = (x0 + 1).min(w as usize - 1);
    let y1 = (y0 + 1).min(h as usize - 1);

    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let p00 = pixel_at(image, x0, y0);
    let p10 = pixel_at(image, x1, y0);
    let p01 = pixel_at(image, x0, y1);
    let p11 = pixel_at(image, x1, y1);

    let mut result = [0u8; 3];
    for c in 0..3 {
        let v = p00[c] * (1.0 - fx) * (1.0 - fy)
            + p10[c] * fx * (1.0 - fy)
            + p01[c] * (1.0 - fx) * fy
            + p11[c] * fx * fy;
        result[c] = v.clamp(0.0, 255.0).round() as u8;
    }
    result
}

#[inline]
fn pixel_at(image: &DecodedImage, px: usize, py: usize) -> [f64; 3] {
    let idx = (py * image.width as usize + px) * 3;
    [
        image.pixels[idx] as f64,
        image.pixels[idx + 1] as f64,
        image.pixels[idx + 2] as f64,
    ]
}
