//! Command-line interface for textsift.

mod commands;
pub mod icons;

pub use commands::{is_verbose, run};
