//! Text extraction command.

use std::path::Path;
use std::sync::Arc;

use super::annotate::print_analysis;
use crate::annotate::{analyze, parse_keywords, HighlightStyle};
use crate::cli::icons::{info, success, warn};
use crate::config::Settings;
use crate::export::DownloadFormat;
use crate::ocr::ReaderCache;
use crate::services::{ExtractOptions, ExtractionService};

/// Extract text from an image and print or save it.
pub async fn cmd_extract(
    settings: &Settings,
    image: &Path,
    format: DownloadFormat,
    output: Option<&Path>,
    keywords: Option<&str>,
    style: Option<HighlightStyle>,
    color: Option<&str>,
) -> anyhow::Result<()> {
    if !image.exists() {
        anyhow::bail!("Image not found: {}", image.display());
    }

    let options = ExtractOptions::from_settings(settings);
    let service = ExtractionService::new(Arc::new(ReaderCache::new(settings.python.clone())));

    eprintln!(
        "{} Extracting text from {} ({}, languages: {}, gpu: {})",
        info(),
        image.display(),
        options.backend,
        options.config.languages.join(","),
        options.config.use_gpu
    );

    let path = image.to_path_buf();
    let extraction = tokio::task::spawn_blocking(move || service.extract_file(&path, &options))
        .await??;

    if extraction.is_empty() {
        eprintln!("{} No text found", warn());
    }

    let payload = extraction.payload(format)?;
    match output {
        Some(path) => {
            std::fs::write(path, &payload)?;
            eprintln!(
                "{} Wrote {} fragments to {} in {}ms",
                success(),
                extraction.fragments.len(),
                path.display(),
                extraction.processing_time_ms
            );
        }
        None => println!("{}", payload),
    }

    let keywords = keywords.map(parse_keywords).unwrap_or_default();
    let highlight = style.unwrap_or(settings.highlight_style);
    let color = color.unwrap_or(&settings.highlight_color);
    if let Some(result) = analyze(&extraction.text, &keywords, highlight, color, false) {
        eprintln!();
        print_analysis(&result);
        eprintln!("{}", console::style("Highlighted text:").bold());
        eprintln!("{}", result.annotated_text);
    }

    Ok(())
}
