//! JavaScript-facing wrapper for the processing result.

use js_sys::Uint8Array;
use sleevescan_core::ProcessingResult;
use wasm_bindgen::prelude::*;

/// A processing result held in WASM memory.
///
/// The encoded JPEG stays on the WASM side until `processed_image()` is
/// called, which copies it out as a `Uint8Array`. `free()` may be called to
/// release the buffer early; otherwise wasm-bindgen's finalizer cleans up.
#[wasm_bindgen]
pub struct JsProcessingResult {
    inner: ProcessingResult,
}

#[wasm_bindgen]
impl JsProcessingResult {
    /// Whether processing produced an output image.
    #[wasm_bindgen(getter)]
    pub fn success(&self) -> bool {
        self.inner.success
    }

    /// MIME type of the output (always "image/jpeg").
    #[wasm_bindgen(getter)]
    pub fn mime_type(&self) -> String {
        self.inner.mime_type.clone()
    }

    /// The detector rotation that was applied, 0 when none was.
    #[wasm_bindgen(getter)]
    pub fn applied_rotation(&self) -> f64 {
        self.inner.applied_rotation
    }

    /// Whether a crop was applied.
    #[wasm_bindgen(getter)]
    pub fn applied_crop(&self) -> bool {
        self.inner.applied_crop
    }

    /// Failure reason, present exactly when `success` is false.
    #[wasm_bindgen(getter)]
    pub fn error(&self) -> Option<String> {
        self.inner.error.clone()
    }

    /// Encoded JPEG bytes, copied into JavaScript memory.
    ///
    /// Returns `undefined` on a failed result. The frontend builds a data
    /// URI or Blob from these bytes; the core never base64-encodes.
    pub fn processed_image(&self) -> Option<Uint8Array> {
        self.inner
            .processed_image
            .as_ref()
            .map(|bytes| Uint8Array::from(bytes.as_slice()))
    }

    /// Explicitly free WASM memory.
    ///
    /// This is optional - wasm-bindgen's finalizer will handle cleanup
    /// automatically. Call this to release a large output buffer early.
    pub fn free(self) {
        // Dropping self releases the memory
    }
}

impl JsProcessingResult {
    /// Wrap a core result for handover to JavaScript.
    pub(crate) fn from_core(inner: ProcessingResult) -> Self {
        Self { inner }
    }
}
