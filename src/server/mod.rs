//! Web server for extracting and annotating image text.
//!
//! Provides:
//! - An upload form with keyword, highlight style, color and format inputs
//! - A results page with extracted text, word statistics and highlights
//! - Plain text and JSON downloads of the extracted text
//! - A JSON API for extraction and annotation

mod assets;
mod handlers;
mod routes;
mod template_structs;

pub use handlers::ErrorResponse;
pub use routes::create_router;

use std::sync::Arc;

use tokio::net::TcpListener;

use crate::annotate::HighlightStyle;
use crate::config::Settings;
use crate::ocr::ReaderCache;
use crate::services::{ExtractOptions, ExtractionService};

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub extraction: ExtractionService,
    /// OCR options used for every upload.
    pub options: ExtractOptions,
    pub highlight_style: HighlightStyle,
    pub highlight_color: String,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(settings: &Settings) -> Self {
        let readers = ReaderCache::new(settings.python.clone());
        Self::with_readers(settings, Arc::new(readers))
    }

    /// Build state around an existing reader cache.
    pub fn with_readers(settings: &Settings, readers: Arc<ReaderCache>) -> Self {
        Self {
            extraction: ExtractionService::new(readers),
            options: ExtractOptions::from_settings(settings),
            highlight_style: settings.highlight_style,
            highlight_color: settings.highlight_color.clone(),
            max_upload_bytes: settings.max_upload_bytes(),
        }
    }
}

/// Start the web server.
pub async fn serve(settings: &Settings, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(settings);

    let reader = state.extraction.reader(&state.options);
    if reader.is_available() {
        tracing::info!(
            "OCR backend {} (languages: {}, gpu: {})",
            reader.backend_type(),
            state.options.config.languages.join(","),
            state.options.config.use_gpu
        );
    } else {
        tracing::warn!("{}", reader.availability_hint());
    }

    let app = create_router(state);

    let listener = bind_listener(host, port).await?;
    tracing::info!("Starting server at http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Bind the server socket. `host` may be an IP literal or a hostname.
pub async fn bind_listener(host: &str, port: u16) -> anyhow::Result<TcpListener> {
    TcpListener::bind((host, port))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind {}:{}: {}", host, port, e))
}
