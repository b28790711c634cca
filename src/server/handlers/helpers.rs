//! Helper types and utility functions for handlers.

use askama::Template;
use axum::{
    extract::Multipart,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use super::super::template_structs::ErrorTemplate;
use super::super::AppState;
use crate::annotate::{parse_keywords, sanitize_color, HighlightStyle};
use crate::export::DownloadFormat;
use crate::ocr::OcrError;

/// Fields of the upload form.
pub struct UploadForm {
    pub image: Option<Vec<u8>>,
    pub file_name: String,
    pub keywords: Vec<String>,
    pub style: HighlightStyle,
    pub color: String,
    pub format: DownloadFormat,
}

impl UploadForm {
    fn with_defaults(state: &AppState) -> Self {
        Self {
            image: None,
            file_name: "upload".to_string(),
            keywords: Vec::new(),
            style: state.highlight_style,
            color: state.highlight_color.clone(),
            format: DownloadFormat::default(),
        }
    }
}

/// Read the multipart upload form. Missing fields keep their defaults.
pub async fn read_upload_form(
    state: &AppState,
    mut multipart: Multipart,
) -> Result<UploadForm, (StatusCode, String)> {
    let mut form = UploadForm::with_defaults(state);

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::warn!("Failed to read multipart field: {}", e);
        (e.status(), e.body_text())
    })? {
        let name = field.name().unwrap_or("").to_string();

        if name == "image" || name == "file" {
            if let Some(file_name) = field.file_name() {
                form.file_name = file_name.to_string();
            }
            let data = field.bytes().await.map_err(|e| (e.status(), e.body_text()))?;
            tracing::debug!("Read {} bytes of image data", data.len());
            if !data.is_empty() {
                form.image = Some(data.to_vec());
            }
            continue;
        }

        let value = field.text().await.map_err(|e| (e.status(), e.body_text()))?;
        match name.as_str() {
            "keywords" => form.keywords = parse_keywords(&value),
            "style" => {
                form.style = HighlightStyle::from_str(&value).unwrap_or(state.highlight_style)
            }
            "color" if !value.trim().is_empty() => {
                form.color = sanitize_color(&value).to_string()
            }
            "format" => form.format = DownloadFormat::from_str(&value).unwrap_or_default(),
            _ => tracing::debug!("Ignoring form field '{}'", name),
        }
    }

    Ok(form)
}

/// HTTP status for an OCR failure.
pub fn ocr_error_status(error: &OcrError) -> StatusCode {
    match error {
        OcrError::UnsupportedImage(_) => StatusCode::UNPROCESSABLE_ENTITY,
        OcrError::BackendNotAvailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        OcrError::OcrFailed(_) | OcrError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Render the error page with `status`.
pub fn error_page(status: StatusCode, title: &str, message: &str) -> Response {
    let template = ErrorTemplate { title, message };
    let body = template.render().unwrap_or_else(|_| message.to_string());
    (status, Html(body)).into_response()
}

/// JSON error body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// JSON error response with `status`.
pub fn api_error(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}
