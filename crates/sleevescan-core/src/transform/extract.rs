//! Axis-aligned region extraction.

use crate::decode::DecodedImage;
use crate::geometry::CropRect;

/// Copy the given pixel rectangle out of an image.
///
/// The rectangle is clamped to the canvas; a rectangle that starts outside
/// it, or collapses after clamping, yields a 1x1 output rather than an
/// empty buffer. An empty source image is returned unchanged - there are
/// no pixels to clamp onto. The source image is never modified.
pub fn extract_region(image: &DecodedImage, rect: &CropRect) -> DecodedImage {
    if image.is_empty() {
        return image.clone();
    }

    let left = rect.x.min(image.width.saturating_sub(1));
    let top = rect.y.min(image.height.saturating_sub(1));
    let right = rect.right().min(image.width);
    let bottom = rect.bottom().min(image.height);

    let out_width = right.saturating_sub(left).max(1);
    let out_height = bottom.saturating_sub(top).max(1);

    let src_stride = (image.width * 3) as usize;
    let row_bytes = (out_width * 3) as usize;
    let mut output = vec![0u8; (out_width * out_height) as usize * 3];

    for y in 0..out_height as usize {
        let src_start = (top as usize + y) * src_stride + (left * 3) as usize;
        let dst_start = y * row_bytes;
        output[dst_start..dst_start + row_bytes]
            .copy_from_slice(&image.pixels[src_start..src_start + row_bytes]);
    }

    DecodedImage::new(out_width, out_height, output)
}


// ============================================================================
// Property-Based Tests
// ============================================================================
