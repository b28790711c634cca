//! Configuration management for textsift using the prefer crate.
//!
//! Settings are resolved in layers: built-in defaults, then a config file
//! (explicit `--config` path or discovered by prefer), then `TEXTSIFT_*`
//! environment variables.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::annotate::{sanitize_color, HighlightStyle, DEFAULT_HIGHLIGHT_COLOR};
use crate::ocr::{GpuMode, JoinPolicy, OcrBackendType, OcrConfig, DEFAULT_LANGUAGES};

/// Default port for the web server.
pub const DEFAULT_PORT: u16 = 3030;

/// Default host for the web server.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default upload size limit in megabytes.
pub const DEFAULT_MAX_UPLOAD_MB: usize = 10;

/// Errors from loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Failed to parse YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Address the web server binds to.
    pub host: String,
    pub port: u16,
    /// OCR languages as short codes.
    pub languages: Vec<String>,
    pub gpu: GpuMode,
    pub backend: OcrBackendType,
    /// Model or traineddata directory handed to the backend.
    pub model_path: Option<PathBuf>,
    /// Python interpreter for the EasyOCR worker.
    pub python: Option<PathBuf>,
    /// How fragments are joined for display and plain-text download.
    pub join: JoinPolicy,
    pub highlight_style: HighlightStyle,
    pub highlight_color: String,
    pub max_upload_mb: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            languages: DEFAULT_LANGUAGES.iter().map(|s| s.to_string()).collect(),
            gpu: GpuMode::default(),
            backend: OcrBackendType::default(),
            model_path: None,
            python: None,
            join: JoinPolicy::default(),
            highlight_style: HighlightStyle::default(),
            highlight_color: DEFAULT_HIGHLIGHT_COLOR.to_string(),
            max_upload_mb: DEFAULT_MAX_UPLOAD_MB,
        }
    }
}

impl Settings {
    /// Build the OCR configuration, resolving the GPU mode.
    ///
    /// `GpuMode::Auto` probes for a GPU, so call this once and reuse the result.
    pub fn ocr_config(&self) -> OcrConfig {
        OcrConfig::new(self.languages.clone(), self.gpu.resolve())
            .with_model_path(self.model_path.clone())
    }

    /// Upload size limit in bytes.
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }

    /// Apply `TEXTSIFT_*` environment variable overrides.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides looked up through `lookup`. Empty values are ignored.
    fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(host) = get("TEXTSIFT_HOST") {
            tracing::debug!("Using TEXTSIFT_HOST from environment: {}", host);
            self.host = host;
        }
        if let Some(port) = get("TEXTSIFT_PORT") {
            self.port = port.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "TEXTSIFT_PORT",
                value: port.clone(),
            })?;
        }
        if let Some(languages) = get("TEXTSIFT_LANGUAGES") {
            self.languages = parse_languages(&languages);
        }
        if let Some(gpu) = get("TEXTSIFT_GPU") {
            self.gpu = GpuMode::from_str(&gpu).ok_or(ConfigError::InvalidValue {
                key: "TEXTSIFT_GPU",
                value: gpu.clone(),
            })?;
        }
        if let Some(backend) = get("TEXTSIFT_BACKEND") {
            self.backend =
                OcrBackendType::from_str(&backend).ok_or(ConfigError::InvalidValue {
                    key: "TEXTSIFT_BACKEND",
                    value: backend.clone(),
                })?;
        }
        Ok(())
    }
}

/// Split a comma-separated language list.
pub fn parse_languages(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|l| l.trim().to_lowercase())
        .filter(|l| !l.is_empty())
        .collect()
}

/// Highlight defaults for the web form and CLI.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HighlightConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<HighlightStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// OCR languages, e.g. `["en", "hi"]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub languages: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpu: Option<GpuMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<OcrBackendType>,
    /// Model directory; `~` and relative paths are resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub python: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join: Option<JoinPolicy>,
    #[serde(default)]
    pub highlight: HighlightConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_upload_mb: Option<usize>,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration using prefer for discovery.
    /// Falls back to defaults when no file is found or it fails to parse.
    pub async fn load() -> Self {
        match prefer::load("textsift").await {
            Ok(pref_config) => {
                if let Some(path) = pref_config.source_path() {
                    match Self::load_from_path(path).await {
                        Ok(config) => config,
                        Err(e) => {
                            tracing::warn!("Ignoring config {}: {}", path.display(), e);
                            Self::default()
                        }
                    }
                } else {
                    Self::default()
                }
            }
            Err(_) => Self::default(),
        }
    }

    /// Load configuration from a specific file path.
    /// The format is chosen by extension: TOML, YAML, or JSON (default).
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        let mut config = Self::parse(&contents, ext)?;
        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Parse config text in the format named by `ext`.
    pub fn parse(contents: &str, ext: &str) -> Result<Self, ConfigError> {
        Ok(match ext {
            "toml" => toml::from_str(contents)?,
            "yaml" | "yml" => serde_yaml::from_str(contents)?,
            _ => serde_json::from_str(contents)?,
        })
    }

    /// Get the base directory for resolving relative paths.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve a path that may be relative to the config file.
    /// - Absolute paths are returned as-is
    /// - Paths starting with ~ are expanded
    /// - Relative paths are resolved against `base_dir`
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Apply configuration to settings.
    pub fn apply_to_settings(&self, settings: &mut Settings, base_dir: &Path) {
        if let Some(ref host) = self.host {
            settings.host = host.clone();
        }
        if let Some(port) = self.port {
            settings.port = port;
        }
        if let Some(ref languages) = self.languages {
            if !languages.is_empty() {
                settings.languages = languages.clone();
            }
        }
        if let Some(gpu) = self.gpu {
            settings.gpu = gpu;
        }
        if let Some(backend) = self.backend {
            settings.backend = backend;
        }
        if let Some(ref model_path) = self.model_path {
            settings.model_path = Some(self.resolve_path(model_path, base_dir));
        }
        if let Some(ref python) = self.python {
            // Bare interpreter names are looked up on PATH, not resolved.
            settings.python = Some(if python.contains('/') || python.starts_with('~') {
                self.resolve_path(python, base_dir)
            } else {
                PathBuf::from(python)
            });
        }
        if let Some(join) = self.join {
            settings.join = join;
        }
        if let Some(style) = self.highlight.style {
            settings.highlight_style = style;
        }
        if let Some(ref color) = self.highlight.color {
            settings.highlight_color = sanitize_color(color).to_string();
        }
        if let Some(max) = self.max_upload_mb {
            settings.max_upload_mb = max;
        }
    }
}

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (overrides auto-discovery).
    pub config_path: Option<PathBuf>,
    /// Use CWD for relative paths instead of the config file directory.
    pub use_cwd: bool,
}

/// Load settings with explicit options.
/// Returns (Settings, Config) tuple.
///
/// An explicit config path that cannot be read or parsed is an error;
/// a discovered one is skipped with a warning.
pub async fn load_settings_with_options(
    options: LoadOptions,
) -> Result<(Settings, Config), ConfigError> {
    let config = match options.config_path {
        Some(ref path) => Config::load_from_path(path).await?,
        None => Config::load().await,
    };
    if let Some(ref path) = config.source_path {
        tracing::debug!("Loaded config from {}", path.display());
    }

    let cwd = || std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let base_dir = if options.use_cwd {
        cwd()
    } else {
        config.base_dir().unwrap_or_else(cwd)
    };

    let mut settings = Settings::default();
    config.apply_to_settings(&mut settings, &base_dir);
    settings.apply_env_overrides()?;

    Ok((settings, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.host, "127.0.0.1");
        assert_eq!(settings.port, 3030);
        assert_eq!(settings.languages, vec!["en", "hi"]);
        assert_eq!(settings.gpu, GpuMode::Auto);
        assert_eq!(settings.backend, OcrBackendType::Tesseract);
        assert_eq!(settings.join, JoinPolicy::Line);
        assert_eq!(settings.highlight_color, "#FFFF00");
        assert_eq!(settings.max_upload_bytes(), 10 * 1024 * 1024);
    }

    #[test]
    fn test_parse_toml() {
        let config = Config::parse(
            r##"
port = 8080
languages = ["en"]
gpu = "off"
backend = "easyocr"
join = "space"

[highlight]
style = "underline"
color = "#00ff00"
"##,
            "toml",
        )
        .unwrap();

        let mut settings = Settings::default();
        config.apply_to_settings(&mut settings, Path::new("/etc/textsift"));
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.languages, vec!["en"]);
        assert_eq!(settings.gpu, GpuMode::Off);
        assert_eq!(settings.backend, OcrBackendType::EasyOcr);
        assert_eq!(settings.join, JoinPolicy::Space);
        assert_eq!(settings.highlight_style, HighlightStyle::Underline);
        assert_eq!(settings.highlight_color, "#00ff00");
        assert_eq!(settings.host, "127.0.0.1");
    }

    #[test]
    fn test_parse_yaml_and_json() {
        let yaml = Config::parse("host: 0.0.0.0\nmax_upload_mb: 2\n", "yml").unwrap();
        assert_eq!(yaml.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(yaml.max_upload_mb, Some(2));

        let json = Config::parse(r#"{"highlight": {"style": "bold"}}"#, "json").unwrap();
        assert_eq!(json.highlight.style, Some(HighlightStyle::Bold));

        assert!(matches!(
            Config::parse("port = \"nope\"", "toml"),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_invalid_color_falls_back() {
        let config = Config::parse(r#"{"highlight": {"color": "red\" onclick=\"x"}}"#, "json")
            .unwrap();
        let mut settings = Settings::default();
        config.apply_to_settings(&mut settings, Path::new("."));
        assert_eq!(settings.highlight_color, DEFAULT_HIGHLIGHT_COLOR);
    }

    #[test]
    fn test_resolve_model_path() {
        let config = Config::parse(r#"{"model_path": "models", "python": "python3.11"}"#, "json")
            .unwrap();
        let mut settings = Settings::default();
        config.apply_to_settings(&mut settings, Path::new("/srv/textsift"));
        assert_eq!(
            settings.model_path,
            Some(PathBuf::from("/srv/textsift/models"))
        );
        assert_eq!(settings.python, Some(PathBuf::from("python3.11")));
    }

    #[test]
    fn test_env_overrides() {
        let mut settings = Settings::default();
        settings
            .apply_overrides_from(env(&[
                ("TEXTSIFT_HOST", "0.0.0.0"),
                ("TEXTSIFT_PORT", "9000"),
                ("TEXTSIFT_LANGUAGES", "en, HI ,mr"),
                ("TEXTSIFT_GPU", "off"),
                ("TEXTSIFT_BACKEND", "easy"),
            ]))
            .unwrap();
        assert_eq!(settings.host, "0.0.0.0");
        assert_eq!(settings.port, 9000);
        assert_eq!(settings.languages, vec!["en", "hi", "mr"]);
        assert_eq!(settings.gpu, GpuMode::Off);
        assert_eq!(settings.backend, OcrBackendType::EasyOcr);
    }

    #[test]
    fn test_env_overrides_reject_bad_values() {
        let mut settings = Settings::default();
        let err = settings
            .apply_overrides_from(env(&[("TEXTSIFT_PORT", "http")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "TEXTSIFT_PORT", .. }));

        let mut settings = Settings::default();
        settings
            .apply_overrides_from(env(&[("TEXTSIFT_HOST", "  ")]))
            .unwrap();
        assert_eq!(settings.host, "127.0.0.1");
    }

    #[test]
    fn test_ocr_config_from_settings() {
        let settings = Settings {
            gpu: GpuMode::On,
            languages: vec!["hi".to_string()],
            ..Default::default()
        };
        let config = settings.ocr_config();
        assert!(config.use_gpu);
        assert_eq!(config.languages, vec!["hi"]);
    }

    #[tokio::test]
    async fn test_load_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("textsift.toml");
        std::fs::write(&path, "port = 4040\nmodel_path = \"tessdata\"\n").unwrap();

        let (settings, config) = load_settings_with_options(LoadOptions {
            config_path: Some(path.clone()),
            use_cwd: false,
        })
        .await
        .unwrap();
        assert_eq!(config.source_path, Some(path));
        assert_eq!(settings.model_path, Some(dir.path().join("tessdata")));
    }

    #[tokio::test]
    async fn test_missing_explicit_path_is_error() {
        let result = load_settings_with_options(LoadOptions {
            config_path: Some(PathBuf::from("/nonexistent/textsift.toml")),
            use_cwd: false,
        })
        .await;
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
