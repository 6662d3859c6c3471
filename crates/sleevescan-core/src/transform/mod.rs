//! Pixel transforms for the cover pipeline.
//!
//! - [`extract_region`] copies an axis-aligned pixel rectangle out of a
//!   decoded image.
//! - [`rotate_deskew`] straightens a tilted cover by rotating the whole
//!   photo onto an expanded, white-filled canvas.

mod extract;
mod rotation;

pub use extract::extract_region;
pub use rotation::{rotate_deskew, rotated_canvas_bounds};
