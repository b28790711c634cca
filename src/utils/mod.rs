//! Shared utility functions.
//!
//! - `html`: HTML escaping for safe rendering
//! - `mime`: image type detection for uploads

mod html;
mod mime;

pub use html::html_escape;
pub use mime::{detect_image_type, ImageType};
