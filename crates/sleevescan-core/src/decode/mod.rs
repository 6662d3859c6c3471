//! Image decoding for uploaded sleeve photos.
//!
//! This module provides:
//! - Decoding of the allow-listed upload formats (JPEG, PNG, GIF, WebP)
//!   with EXIF orientation applied
//! - Fit-inside resizing for the output size ceiling
//!
//! # Orientation
//!
//! Phone photos routinely carry EXIF orientation 3/6/8. The bounds detector
//! sees the browser-rendered (already oriented) image, so decoding must
//! apply the same orientation or every reported corner would land on the
//! wrong axis. [`decode_image`] handles this; the rest of the pipeline
//! never thinks about orientation again.

mod reader;
mod resize;
mod types;

pub use reader::decode_image;
pub use resize::{resize, resize_to_fit};
pub use types::{DecodeError, DecodedImage, FilterType, Orientation};
