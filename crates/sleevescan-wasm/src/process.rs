//! Bindings for the cover normalization pipeline.

use js_sys::Uint8Array;
use sleevescan_core::decode::{decode_image, resize_to_fit, FilterType};
use sleevescan_core::encode::encode_jpeg;
use sleevescan_core::AlbumBoundsAnalysis;
use wasm_bindgen::prelude::*;
use web_sys::console;

use crate::types::JsProcessingResult;

/// JPEG quality for grid thumbnails; lower than the main output since they
/// render at 256px.
const THUMBNAIL_JPEG_QUALITY: u8 = 80;

/// Run the cover normalization pipeline.
///
/// # Arguments
///
/// * `image_bytes` - The original upload (JPEG/PNG/GIF/WebP)
/// * `source_mime` - The upload's declared MIME type (advisory)
/// * `analysis` - The detector report as a plain JS object, field names
///   camelCase exactly as the vision route returns them
///
/// # Returns
///
/// A [`JsProcessingResult`]. Processing failures are reported inside the
/// result (`success: false`), never as an exception; only a malformed
/// `analysis` payload rejects.
///
/// # Example (TypeScript)
///
/// ```typescript
/// const result = process_cover(bytes, file.type, {
///   albumDetected: true,
///   boundingBox: { topLeft: {x: 0.1, y: 0.1}, /* ... */ },
///   rotationDegrees: -4.2,
///   confidence: 'high',
/// });
/// ```
#[wasm_bindgen]
pub fn process_cover(
    image_bytes: &[u8],
    source_mime: &str,
    analysis: JsValue,
) -> Result<JsProcessingResult, JsValue> {
    let analysis: AlbumBoundsAnalysis = serde_wasm_bindgen::from_value(analysis)
        .map_err(|e| JsValue::from_str(&format!("Invalid analysis payload: {e}")))?;

    let result = sleevescan_core::process(image_bytes, source_mime, &analysis);
    if let (false, Some(reason)) = (result.success, result.error.as_deref()) {
        // Surface the fallback path in the browser console; the frontend
        // uploads the original photo instead.
        console::warn_1(&JsValue::from_str(&format!(
            "sleevescan: cover processing failed: {reason}"
        )));
    }

    Ok(JsProcessingResult::from_core(result))
}

/// Decode an upload and produce a JPEG thumbnail bounded to `max_edge`.
///
/// Used by the collection grid; aspect ratio is preserved and small images
/// are not upscaled.
#[wasm_bindgen]
pub fn make_thumbnail(image_bytes: &[u8], max_edge: u32) -> Result<Uint8Array, JsValue> {
    let decoded =
        decode_image(image_bytes).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let thumb = resize_to_fit(&decoded, max_edge, FilterType::Bilinear)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    let jpeg = encode_jpeg(&thumb, THUMBNAIL_JPEG_QUALITY)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    Ok(Uint8Array::from(jpeg.as_slice()))
}
