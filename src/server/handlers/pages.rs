//! HTML page handlers: upload form, results, and downloads.

use askama::Template;
use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Form,
};
use serde::Deserialize;

use super::super::template_structs::{AnalysisView, IndexTemplate, ResultsTemplate, SelectOption};
use super::super::AppState;
use super::helpers::{error_page, ocr_error_status, read_upload_form};
use crate::annotate::analyze;
use crate::export::DownloadFormat;

/// Upload form.
pub async fn index(State(state): State<AppState>) -> impl IntoResponse {
    let languages = state.options.config.languages.join(", ");
    let template = IndexTemplate {
        title: "Extract text",
        styles: SelectOption::styles(state.highlight_style),
        formats: SelectOption::formats(DownloadFormat::default()),
        color: &state.highlight_color,
        languages: &languages,
        max_upload_mb: state.max_upload_bytes / (1024 * 1024),
    };

    Html(
        template
            .render()
            .unwrap_or_else(|e| format!("Template error: {}", e)),
    )
}

/// Run OCR on the uploaded image and render text, statistics, and highlights.
pub async fn extract_page(State(state): State<AppState>, multipart: Multipart) -> Response {
    let form = match read_upload_form(&state, multipart).await {
        Ok(form) => form,
        Err((status, message)) => return error_page(status, "Upload failed", &message),
    };

    let Some(image) = form.image else {
        return error_page(
            StatusCode::BAD_REQUEST,
            "No image",
            "Please choose a JPEG or PNG image to upload.",
        );
    };

    let extraction = match state
        .extraction
        .extract_upload(image, state.options.clone())
        .await
    {
        Ok(extraction) => extraction,
        Err(e) => {
            tracing::warn!("Extraction failed for {}: {}", form.file_name, e);
            return error_page(
                ocr_error_status(&e),
                "Text extraction failed",
                &e.to_string(),
            );
        }
    };

    let payload = match extraction.payload(form.format) {
        Ok(payload) => payload,
        Err(e) => {
            return error_page(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Export failed",
                &e.to_string(),
            )
        }
    };

    let analysis = analyze(
        &extraction.text,
        &form.keywords,
        form.style,
        &form.color,
        true,
    )
    .map(AnalysisView::from);

    let template = ResultsTemplate {
        title: "Extracted text",
        file_name: &form.file_name,
        text: &extraction.text,
        fragment_count: extraction.fragments.len(),
        backend: extraction.backend.as_str(),
        processing_time_ms: extraction.processing_time_ms,
        format: form.format.as_str(),
        format_label: form.format.label(),
        download_name: form.format.file_name(),
        payload: &payload,
        analysis,
    };

    Html(
        template
            .render()
            .unwrap_or_else(|e| format!("Template error: {}", e)),
    )
    .into_response()
}

/// Download form posted from the results page.
#[derive(Debug, Deserialize)]
pub struct DownloadForm {
    pub format: String,
    #[serde(default)]
    pub payload: String,
}

/// Return the posted payload as a file attachment.
///
/// Browsers submit textarea content with CRLF line breaks; they are folded
/// back to LF so the file matches the extracted text.
pub async fn download(Form(form): Form<DownloadForm>) -> Response {
    let Some(format) = DownloadFormat::from_str(&form.format) else {
        return (
            StatusCode::BAD_REQUEST,
            format!("Unknown download format: {}", form.format),
        )
            .into_response();
    };

    (
        [
            (header::CONTENT_TYPE, format.mime().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", format.file_name()),
            ),
        ],
        form.payload.replace("\r\n", "\n"),
    )
        .into_response()
}
