//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod annotate;
mod backends;
mod extract;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::annotate::HighlightStyle;
use crate::config::{load_settings_with_options, LoadOptions};
use crate::export::DownloadFormat;
use crate::ocr::{GpuMode, JoinPolicy, OcrBackendType};

#[derive(Parser)]
#[command(name = "textsift")]
#[command(about = "Extract English and Hindi text from images and highlight keywords")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true, env = "TEXTSIFT_CONFIG")]
    config: Option<PathBuf>,

    /// Resolve relative paths from current working directory instead of config file location
    #[arg(long, global = true)]
    cwd: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web interface
    Serve {
        /// Bind address: port, host, or host:port (default from config)
        bind: Option<String>,
    },

    /// Extract text from a JPEG or PNG image
    Extract {
        /// Image file
        image: PathBuf,
        /// Languages to recognize, comma-separated (e.g. en,hi)
        #[arg(short, long, value_delimiter = ',')]
        lang: Vec<String>,
        /// GPU usage
        #[arg(long, value_enum)]
        gpu: Option<GpuMode>,
        /// OCR backend
        #[arg(short, long, value_enum)]
        backend: Option<OcrBackendType>,
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: DownloadFormat,
        /// How recognized fragments are joined
        #[arg(long, value_enum)]
        join: Option<JoinPolicy>,
        /// Write output to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Keywords to highlight, comma-separated
        #[arg(short, long)]
        keywords: Option<String>,
        /// Highlight style for keyword matches
        #[arg(long, value_enum)]
        style: Option<HighlightStyle>,
        /// Highlight color for the background style
        #[arg(long)]
        color: Option<String>,
    },

    /// Highlight keywords in text and print word statistics
    Annotate {
        /// Text file to read ("-" or omitted for stdin)
        input: Option<PathBuf>,
        /// Keywords to highlight, comma-separated
        #[arg(short, long)]
        keywords: String,
        /// Highlight style for keyword matches
        #[arg(long, value_enum)]
        style: Option<HighlightStyle>,
        /// Highlight color for the background style
        #[arg(long)]
        color: Option<String>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// List OCR backends and whether they can run here
    Backends,
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
        use_cwd: cli.cwd,
    };
    let (settings, _config) = load_settings_with_options(options).await?;

    match cli.command {
        Commands::Serve { bind } => serve::cmd_serve(&settings, bind.as_deref()).await,
        Commands::Extract {
            image,
            lang,
            gpu,
            backend,
            format,
            join,
            output,
            keywords,
            style,
            color,
        } => {
            let mut settings = settings;
            if !lang.is_empty() {
                settings.languages = lang;
            }
            if let Some(gpu) = gpu {
                settings.gpu = gpu;
            }
            if let Some(backend) = backend {
                settings.backend = backend;
            }
            if let Some(join) = join {
                settings.join = join;
            }
            extract::cmd_extract(
                &settings,
                &image,
                format,
                output.as_deref(),
                keywords.as_deref(),
                style,
                color.as_deref(),
            )
            .await
        }
        Commands::Annotate {
            input,
            keywords,
            style,
            color,
            json,
        } => annotate::cmd_annotate(
            &settings,
            input.as_deref(),
            &keywords,
            style,
            color.as_deref(),
            json,
        ),
        Commands::Backends => backends::cmd_backends(&settings),
    }
}
