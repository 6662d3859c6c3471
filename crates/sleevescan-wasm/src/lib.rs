//! Sleevescan WASM - WebAssembly bindings for Sleevescan
//!
//! This crate exposes the sleevescan-core cover processing to the web
//! frontend. The React app runs recognition against the vision API, then
//! hands the original upload bytes and the detector's JSON report to
//! [`process_cover`] inside a Web Worker.
//!
//! # Module Structure
//!
//! - `types` - JavaScript-facing wrapper for the processing result
//! - `process` - The cover pipeline binding plus a thumbnail helper
//!
//! # Usage
//!
//! ```typescript
//! import init, { process_cover } from '@sleevescan/wasm';
//!
//! await init();
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const result = process_cover(bytes, file.type, analysis);
//! if (result.success) {
//!   upload(result.processed_image());
//! } else {
//!   upload(bytes); // fall back to the original photo
//! }
//! ```

use wasm_bindgen::prelude::*;

mod process;
mod types;

// Re-export public types
pub use process::{make_thumbnail, process_cover};
pub use types::JsProcessingResult;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    // Future: Set up panic hook for better error messages in browser console
    // when console_error_panic_hook feature is added
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
