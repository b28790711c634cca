//! HTTP request handlers for the web server.

mod api;
mod helpers;
mod pages;
mod static_files;

// Re-export handlers for use by the router
pub use api::{api_annotate, api_extract, api_health};
pub use helpers::ErrorResponse;
pub use pages::{download, extract_page, index};
pub use static_files::serve_css;
