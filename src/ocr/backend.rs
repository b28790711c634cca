//! OCR backend abstraction.
//!
//! Supports multiple OCR engines behind one trait:
//! - Tesseract: traditional OCR via command-line (CPU)
//! - EasyOCR: neural OCR in a long-lived Python worker (CPU/GPU)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Languages recognized when none are configured (English and Hindi).
pub const DEFAULT_LANGUAGES: &[&str] = &["en", "hi"];

/// Errors from OCR backends.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Backend not available: {0}")]
    BackendNotAvailable(String),

    #[error("OCR failed: {0}")]
    OcrFailed(String),

    #[error("Unsupported image: {0}")]
    UnsupportedImage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One recognized region of text.
///
/// Coordinates and confidence are plain `f64`; engine-specific numeric types
/// are converted before a fragment is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFragment {
    /// Polygon corners, clockwise from top-left.
    pub bounding_box: Vec<[f64; 2]>,
    pub text: String,
    /// Recognition confidence in `[0, 1]`.
    pub confidence: f64,
}

impl TextFragment {
    /// Build a fragment from an axis-aligned rectangle.
    pub fn from_rect(
        left: f64,
        top: f64,
        right: f64,
        bottom: f64,
        text: String,
        confidence: f64,
    ) -> Self {
        Self {
            bounding_box: vec![[left, top], [right, top], [right, bottom], [left, bottom]],
            text,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}

/// How fragment texts are concatenated into one blob.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum JoinPolicy {
    /// Single spaces between fragments.
    Space,
    /// One fragment per line.
    #[default]
    Line,
}

impl JoinPolicy {
    pub fn separator(&self) -> &'static str {
        match self {
            JoinPolicy::Space => " ",
            JoinPolicy::Line => "\n",
        }
    }

    /// Join fragment texts in recognition order.
    pub fn join(&self, fragments: &[TextFragment]) -> String {
        fragments
            .iter()
            .map(|f| f.text.as_str())
            .collect::<Vec<_>>()
            .join(self.separator())
    }
}

/// Result of OCR processing.
#[derive(Debug, Clone)]
pub struct OcrResult {
    /// Recognized fragments in reading order.
    pub fragments: Vec<TextFragment>,
    /// Which backend produced this result.
    pub backend: OcrBackendType,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

impl OcrResult {
    /// Concatenate fragment texts using `join`.
    pub fn text(&self, join: JoinPolicy) -> String {
        join.join(&self.fragments)
    }
}

/// Available OCR backend types.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OcrBackendType {
    /// Tesseract OCR via command-line.
    #[default]
    Tesseract,
    /// EasyOCR via a persistent Python worker.
    #[serde(alias = "easy")]
    #[value(name = "easyocr", alias = "easy")]
    EasyOcr,
}

impl OcrBackendType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OcrBackendType::Tesseract => "tesseract",
            OcrBackendType::EasyOcr => "easyocr",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "tesseract" => Some(OcrBackendType::Tesseract),
            "easyocr" | "easy" => Some(OcrBackendType::EasyOcr),
            _ => None,
        }
    }

    pub fn all() -> [OcrBackendType; 2] {
        [OcrBackendType::Tesseract, OcrBackendType::EasyOcr]
    }
}

impl std::fmt::Display for OcrBackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Trait for OCR backends.
pub trait OcrBackend: Send + Sync {
    /// Get the backend type.
    fn backend_type(&self) -> OcrBackendType;

    /// Check if this backend is available (dependencies installed, models present).
    fn is_available(&self) -> bool;

    /// Get a description of what's needed to make this backend available.
    fn availability_hint(&self) -> String;

    /// Run OCR on an image file.
    fn recognize(&self, image_path: &Path) -> Result<OcrResult, OcrError>;
}

/// Configuration for OCR backends.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OcrConfig {
    /// Languages to recognize, as short codes (e.g. "en", "hi").
    pub languages: Vec<String>,
    /// Path to model or traineddata files (for backends that need them).
    pub model_path: Option<PathBuf>,
    /// Whether to use GPU acceleration.
    pub use_gpu: bool,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            languages: DEFAULT_LANGUAGES.iter().map(|s| s.to_string()).collect(),
            model_path: None,
            use_gpu: false,
        }
    }
}

impl OcrConfig {
    /// Create a config for `languages`, falling back to the defaults when empty.
    pub fn new(languages: Vec<String>, use_gpu: bool) -> Self {
        let mut config = Self {
            use_gpu,
            ..Default::default()
        };
        if !languages.is_empty() {
            config.languages = languages;
        }
        config
    }

    pub fn with_model_path(mut self, path: Option<PathBuf>) -> Self {
        self.model_path = path;
        self
    }
}
