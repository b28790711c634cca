//! Askama template structs for the web interface.
//!
//! Each struct corresponds to an HTML template in the templates/ directory.
//! Askama provides compile-time verification that templates are valid.

use askama::Template;

use crate::annotate::{AnnotationResult, HighlightStyle};
use crate::export::DownloadFormat;

/// Option in a `<select>` control.
pub struct SelectOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

impl SelectOption {
    /// Highlight style options with `current` preselected.
    pub fn styles(current: HighlightStyle) -> Vec<Self> {
        HighlightStyle::all()
            .into_iter()
            .map(|s| Self {
                value: s.as_str(),
                label: s.label(),
                selected: s == current,
            })
            .collect()
    }

    /// Download format options with `current` preselected.
    pub fn formats(current: DownloadFormat) -> Vec<Self> {
        DownloadFormat::all()
            .into_iter()
            .map(|f| Self {
                value: f.as_str(),
                label: f.label(),
                selected: f == current,
            })
            .collect()
    }
}

/// Row in the keyword statistics table.
pub struct KeywordCountRow {
    pub keyword: String,
    pub count: usize,
}

/// Keyword analysis section of the results page.
pub struct AnalysisView {
    pub keywords: String,
    pub word_count: usize,
    pub counts: Vec<KeywordCountRow>,
    /// Pre-escaped HTML with highlight markup.
    pub annotated_html: String,
    pub warning: Option<String>,
}

impl From<AnnotationResult> for AnalysisView {
    fn from(result: AnnotationResult) -> Self {
        Self {
            keywords: result.keywords.join(", "),
            word_count: result.stats.word_count,
            counts: result
                .stats
                .keyword_counts
                .into_iter()
                .map(|(keyword, count)| KeywordCountRow { keyword, count })
                .collect(),
            annotated_html: result.annotated_text,
            warning: result.warning,
        }
    }
}

/// Upload form page.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate<'a> {
    pub title: &'a str,
    pub styles: Vec<SelectOption>,
    pub formats: Vec<SelectOption>,
    pub color: &'a str,
    pub languages: &'a str,
    pub max_upload_mb: usize,
}

/// Extraction results page.
#[derive(Template)]
#[template(path = "results.html")]
pub struct ResultsTemplate<'a> {
    pub title: &'a str,
    pub file_name: &'a str,
    pub text: &'a str,
    pub fragment_count: usize,
    pub backend: &'a str,
    pub processing_time_ms: u64,
    pub format: &'a str,
    pub format_label: &'a str,
    pub download_name: &'a str,
    /// Body posted back to `/download`.
    pub payload: &'a str,
    pub analysis: Option<AnalysisView>,
}

/// Error page template.
#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate<'a> {
    pub title: &'a str,
    pub message: &'a str,
}
