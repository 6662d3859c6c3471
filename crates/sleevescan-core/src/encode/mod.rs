//! Output encoding for processed covers.
//!
//! Every processed image is re-encoded to JPEG at a fixed quality
//! regardless of the upload format, normalizing storage size and decode
//! cost for the feed and collection views downstream.

mod jpeg;

pub use jpeg::{encode_jpeg, EncodeError};
