//! OCR backend listing command.

use console::style;

use crate::cli::icons::{dim_arrow, error, success};
use crate::config::Settings;
use crate::ocr::{create_backend, is_gpu_available, OcrBackendType};

/// List OCR backends and whether they can run on this machine.
pub fn cmd_backends(settings: &Settings) -> anyhow::Result<()> {
    let config = settings.ocr_config();

    println!("{}", style("OCR backends").bold());
    for backend_type in OcrBackendType::all() {
        let backend = create_backend(backend_type, &config, settings.python.as_ref());
        let icon = if backend.is_available() {
            success()
        } else {
            error()
        };
        let marker = if backend_type == settings.backend {
            " (default)"
        } else {
            ""
        };
        println!("  {} {}{}", icon, backend_type, marker);
        println!("      {}", style(backend.availability_hint()).dim());
    }

    println!();
    println!(
        "{} GPU: {} (mode: {})",
        dim_arrow(),
        if is_gpu_available() { "detected" } else { "not detected" },
        settings.gpu.as_str()
    );
    println!(
        "{} Languages: {}",
        dim_arrow(),
        config.languages.join(", ")
    );
    Ok(())
}
