//! Download payloads for extracted text.
//!
//! Two formats are offered: the raw joined text, and the full fragment list
//! (bounding box, text, confidence) as indented JSON.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ocr::TextFragment;

/// Errors from building or reading export payloads.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown download format: {0}")]
    UnknownFormat(String),
}

/// Download format offered next to the extracted text.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum DownloadFormat {
    #[default]
    #[serde(rename = "text", alias = "txt", alias = "plain")]
    #[value(name = "text", alias = "txt")]
    PlainText,
    Json,
}

impl DownloadFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            DownloadFormat::PlainText => "text",
            DownloadFormat::Json => "json",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "text" | "txt" | "plain" | "plain text" => Some(DownloadFormat::PlainText),
            "json" => Some(DownloadFormat::Json),
            _ => None,
        }
    }

    /// Suggested file name for the attachment.
    pub fn file_name(&self) -> &'static str {
        match self {
            DownloadFormat::PlainText => "extracted_text.txt",
            DownloadFormat::Json => "extracted_text.json",
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            DownloadFormat::PlainText => "text/plain; charset=utf-8",
            DownloadFormat::Json => "application/json",
        }
    }

    /// Human-readable label for the download button.
    pub fn label(&self) -> &'static str {
        match self {
            DownloadFormat::PlainText => "Plain Text",
            DownloadFormat::Json => "JSON",
        }
    }

    pub fn all() -> [DownloadFormat; 2] {
        [DownloadFormat::PlainText, DownloadFormat::Json]
    }
}

impl std::fmt::Display for DownloadFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DownloadFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DownloadFormat::from_str(s).ok_or_else(|| ExportError::UnknownFormat(s.to_string()))
    }
}

/// Serialize fragments as a JSON array, two-space indented, with non-ASCII
/// characters left unescaped.
pub fn to_json(fragments: &[TextFragment]) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(fragments)?)
}

/// Parse a JSON payload produced by [`to_json`].
pub fn from_json(json: &str) -> Result<Vec<TextFragment>, ExportError> {
    Ok(serde_json::from_str(json)?)
}

/// Build the download body for `format`.
pub fn render(
    format: DownloadFormat,
    text: &str,
    fragments: &[TextFragment],
) -> Result<String, ExportError> {
    match format {
        DownloadFormat::PlainText => Ok(text.to_string()),
        DownloadFormat::Json => to_json(fragments),
    }
}
