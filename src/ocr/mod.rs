//! OCR module.
//!
//! Extracts text fragments from JPEG/PNG images using:
//! - Tesseract OCR via command-line (default, CPU only)
//! - EasyOCR in a persistent Python worker (CPU or GPU)
//!
//! Readers are created lazily per (backend, languages, gpu) and cached in a
//! [`ReaderCache`], so model loading happens once per configuration.
//! Uploaded bytes are staged into a temporary file for the duration of a
//! single recognition call.

mod backend;
mod easyocr;
mod model_utils;
mod reader;
mod staging;
mod tesseract;

pub use backend::{
    JoinPolicy, OcrBackend, OcrBackendType, OcrConfig, OcrError, OcrResult, TextFragment,
    DEFAULT_LANGUAGES,
};
pub use easyocr::EasyOcrBackend;
pub use model_utils::{check_binary, is_gpu_available, GpuMode};
pub use reader::{create_backend, BackendFactory, ReaderCache};
pub use staging::{with_staged_image, StagedImage};
pub use tesseract::TesseractBackend;
