//! textsift - image text extraction with keyword highlighting.
//!
//! Extracts English and Hindi text from JPEG/PNG images through an external
//! OCR engine, highlights user keywords in the result, counts words, and
//! exports the text as plain text or JSON.

pub mod annotate;
pub mod cli;
pub mod config;
pub mod export;
pub mod ocr;
pub mod server;
pub mod services;
pub mod utils;
