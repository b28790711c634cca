//! Service layer for textsift.
//!
//! Domain logic separated from UI concerns, shared by the CLI and the web
//! server.

pub mod extraction;

pub use extraction::{ExtractOptions, Extraction, ExtractionService};
