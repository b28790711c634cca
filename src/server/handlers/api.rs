//! JSON API handlers.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use super::super::AppState;
use super::helpers::{api_error, ocr_error_status, read_upload_form, ErrorResponse};
use crate::annotate::{analyze, parse_keywords, AnnotationResult, HighlightStyle};
use crate::services::Extraction;

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

/// Response for `POST /api/extract`.
#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    #[serde(flatten)]
    pub extraction: Extraction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnnotationResult>,
}

/// Run OCR on an uploaded image. Keywords, style and color fields are
/// optional; when keywords are given the response includes an analysis.
pub async fn api_extract(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<ExtractResponse> {
    let form = read_upload_form(&state, multipart)
        .await
        .map_err(|(status, message)| api_error(status, message))?;

    let image = form.image.ok_or_else(|| {
        api_error(
            StatusCode::BAD_REQUEST,
            "No image provided. Use field name 'image' or 'file'",
        )
    })?;

    let extraction = state
        .extraction
        .extract_upload(image, state.options.clone())
        .await
        .map_err(|e| api_error(ocr_error_status(&e), e.to_string()))?;

    let analysis = analyze(
        &extraction.text,
        &form.keywords,
        form.style,
        &form.color,
        false,
    );

    Ok(Json(ExtractResponse {
        extraction,
        analysis,
    }))
}

/// Keywords as a list or a comma-separated string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum KeywordInput {
    List(Vec<String>),
    Csv(String),
}

impl Default for KeywordInput {
    fn default() -> Self {
        KeywordInput::List(Vec::new())
    }
}

impl KeywordInput {
    pub fn keywords(&self) -> Vec<String> {
        match self {
            KeywordInput::List(list) => list
                .iter()
                .map(|k| k.trim())
                .filter(|k| !k.is_empty())
                .map(String::from)
                .collect(),
            KeywordInput::Csv(csv) => parse_keywords(csv),
        }
    }
}

/// Request body for `POST /api/annotate`.
#[derive(Debug, Deserialize)]
pub struct AnnotateRequest {
    pub text: String,
    #[serde(default)]
    pub keywords: KeywordInput,
    pub style: Option<HighlightStyle>,
    pub color: Option<String>,
    /// HTML-escape the text around the markup.
    #[serde(default)]
    pub html: bool,
}

/// Highlight keywords and count words in posted text, without OCR.
pub async fn api_annotate(
    State(state): State<AppState>,
    Json(request): Json<AnnotateRequest>,
) -> ApiResult<AnnotationResult> {
    let keywords = request.keywords.keywords();
    let style = request.style.unwrap_or(state.highlight_style);
    let color = request
        .color
        .as_deref()
        .unwrap_or(&state.highlight_color);

    analyze(&request.text, &keywords, style, color, request.html)
        .map(Json)
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "No keywords provided"))
}

/// Response for `GET /api/health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub backend: String,
    pub available: bool,
    pub hint: String,
    pub languages: Vec<String>,
    pub gpu: bool,
}

/// Report the configured backend and whether it can run.
pub async fn api_health(State(state): State<AppState>) -> Json<HealthResponse> {
    let reader = state.extraction.reader(&state.options);
    Json(HealthResponse {
        status: "ok",
        backend: reader.backend_type().to_string(),
        available: reader.is_available(),
        hint: reader.availability_hint(),
        languages: state.options.config.languages.clone(),
        gpu: state.options.config.use_gpu,
    })
}
