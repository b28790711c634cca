//! Extraction service types.

use serde::Serialize;

use crate::config::Settings;
use crate::export::{self, DownloadFormat, ExportError};
use crate::ocr::{JoinPolicy, OcrBackendType, OcrConfig, TextFragment};

/// Options for one extraction run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractOptions {
    pub backend: OcrBackendType,
    pub config: OcrConfig,
    pub join: JoinPolicy,
}

impl ExtractOptions {
    /// Build options from settings. Resolves the GPU mode, which may probe
    /// the system.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            backend: settings.backend,
            config: settings.ocr_config(),
            join: settings.join,
        }
    }
}

/// Text extracted from one image.
#[derive(Debug, Clone, Serialize)]
pub struct Extraction {
    /// Fragment texts joined by the requested policy.
    pub text: String,
    pub fragments: Vec<TextFragment>,
    pub backend: OcrBackendType,
    pub processing_time_ms: u64,
}

impl Extraction {
    /// Whether the engine found no text at all.
    pub fn is_empty(&self) -> bool {
        self.fragments.iter().all(|f| f.text.trim().is_empty())
    }

    /// Download body for `format`.
    pub fn payload(&self, format: DownloadFormat) -> Result<String, ExportError> {
        export::render(format, &self.text, &self.fragments)
    }
}
