//! EasyOCR backend implementation.
//!
//! Runs EasyOCR in a long-lived Python worker so the recognition models are
//! loaded once per backend instance. The worker reads one image path per
//! line on stdin and answers with one JSON object per line on stdout:
//!
//! - `{"ready": true}` once models are loaded
//! - `{"ok": [[box, text, confidence], ...]}` for a recognized image
//! - `{"error": "..."}` when recognition fails
//!
//! Install with: `pip install easyocr`

use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::Mutex;
use std::time::Instant;

use serde::Deserialize;

use super::backend::{OcrBackend, OcrBackendType, OcrConfig, OcrError, OcrResult, TextFragment};
use super::model_utils::check_binary;

/// Worker script, passed to the interpreter with `-c`.
const WORKER_SCRIPT: &str = include_str!("easyocr_worker.py");

/// Raw detection as emitted by the worker: (box, text, confidence).
type RawDetection = (Vec<[f64; 2]>, String, f64);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum WorkerReply {
    Ready(bool),
    Ok(Vec<RawDetection>),
    Error(String),
}

/// A running worker process.
struct Worker {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl Worker {
    fn spawn(python: &Path, config: &OcrConfig) -> Result<Self, OcrError> {
        let gpu_flag = if config.use_gpu { "1" } else { "0" };
        let mut cmd = Command::new(python);
        cmd.arg("-u")
            .arg("-c")
            .arg(WORKER_SCRIPT)
            .arg(config.languages.join(","))
            .arg(gpu_flag)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());
        if let Some(ref dir) = config.model_path {
            cmd.env("EASYOCR_MODULE_PATH", dir);
        }

        let mut child = cmd.spawn().map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => OcrError::BackendNotAvailable(format!(
                "{} not found (EasyOCR needs Python 3 with `pip install easyocr`)",
                python.display()
            )),
            _ => OcrError::Io(e),
        })?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            let _ = child.kill();
            return Err(OcrError::OcrFailed(
                "EasyOCR worker pipes unavailable".to_string(),
            ));
        };

        let mut worker = Self {
            child,
            stdin,
            stdout: BufReader::new(stdout),
        };

        tracing::info!(
            "Loading EasyOCR models (languages: {}, gpu: {})",
            config.languages.join(","),
            config.use_gpu
        );
        // A worker that exits before greeting could not import or load EasyOCR.
        match worker.read_reply()? {
            Some(WorkerReply::Ready(true)) => Ok(worker),
            Some(WorkerReply::Error(msg)) => Err(OcrError::OcrFailed(msg)),
            Some(other) => Err(OcrError::OcrFailed(format!(
                "unexpected EasyOCR worker greeting: {:?}",
                other
            ))),
            None => Err(OcrError::BackendNotAvailable(format!(
                "EasyOCR worker exited during startup (is easyocr installed for {}?)",
                python.display()
            ))),
        }
    }

    /// Read one reply line. `None` means the worker closed its stdout.
    fn read_reply(&mut self) -> Result<Option<WorkerReply>, OcrError> {
        let mut line = String::new();
        if self.stdout.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        serde_json::from_str(line.trim_end())
            .map(Some)
            .map_err(|e| OcrError::OcrFailed(format!("bad EasyOCR worker reply: {}", e)))
    }

    fn recognize(&mut self, image_path: &Path) -> Result<Vec<TextFragment>, OcrError> {
        let path = image_path.to_string_lossy();
        if path.contains('\n') {
            return Err(OcrError::UnsupportedImage(
                "image path contains a newline".to_string(),
            ));
        }
        writeln!(self.stdin, "{}", path)?;
        self.stdin.flush()?;

        match self.read_reply()? {
            Some(WorkerReply::Ok(detections)) => {
                Ok(detections.into_iter().map(to_fragment).collect())
            }
            Some(WorkerReply::Error(msg)) => Err(OcrError::OcrFailed(msg)),
            Some(WorkerReply::Ready(_)) => Err(OcrError::OcrFailed(
                "EasyOCR worker sent a second greeting".to_string(),
            )),
            None => Err(OcrError::OcrFailed(
                "EasyOCR worker exited unexpectedly".to_string(),
            )),
        }
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn to_fragment((bounding_box, text, confidence): RawDetection) -> TextFragment {
    TextFragment {
        bounding_box,
        text,
        confidence: confidence.clamp(0.0, 1.0),
    }
}

/// EasyOCR backend (neural, CPU or GPU).
pub struct EasyOcrBackend {
    config: OcrConfig,
    /// Python interpreter with EasyOCR installed.
    python: PathBuf,
    /// Worker is started on first use and restarted after a crash.
    worker: Mutex<Option<Worker>>,
}

impl EasyOcrBackend {
    /// Create a new EasyOCR backend with default configuration.
    pub fn new() -> Self {
        Self::with_config(OcrConfig::default())
    }

    /// Create a new EasyOCR backend with custom configuration.
    pub fn with_config(config: OcrConfig) -> Self {
        Self {
            config,
            python: PathBuf::from("python3"),
            worker: Mutex::new(None),
        }
    }

    /// Set the Python interpreter used to run the worker.
    pub fn with_python(mut self, python: impl Into<PathBuf>) -> Self {
        self.python = python.into();
        self
    }
}

impl Default for EasyOcrBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl OcrBackend for EasyOcrBackend {
    fn backend_type(&self) -> OcrBackendType {
        OcrBackendType::EasyOcr
    }

    fn is_available(&self) -> bool {
        check_binary(&self.python.to_string_lossy()) || self.python.exists()
    }

    fn availability_hint(&self) -> String {
        if !self.is_available() {
            format!(
                "Python not found at '{}'. Install Python 3, then: pip install easyocr",
                self.python.display()
            )
        } else {
            format!(
                "EasyOCR runs via {} (requires: pip install easyocr, gpu: {})",
                self.python.display(),
                self.config.use_gpu
            )
        }
    }

    fn recognize(&self, image_path: &Path) -> Result<OcrResult, OcrError> {
        let start = Instant::now();

        let mut guard = self
            .worker
            .lock()
            .map_err(|e| OcrError::OcrFailed(format!("Failed to lock EasyOCR worker: {}", e)))?;

        if guard.is_none() {
            *guard = Some(Worker::spawn(&self.python, &self.config)?);
        }
        let Some(worker) = guard.as_mut() else {
            return Err(OcrError::OcrFailed("EasyOCR worker missing".to_string()));
        };

        let fragments = match worker.recognize(image_path) {
            Ok(fragments) => fragments,
            Err(e) => {
                // Recognition errors reported by the worker leave it usable;
                // anything else means the pipe state is unknown.
                if !matches!(e, OcrError::OcrFailed(_)) || worker.child.try_wait()?.is_some() {
                    tracing::warn!("Restarting EasyOCR worker after error: {}", e);
                    *guard = None;
                }
                return Err(e);
            }
        };
        let elapsed = start.elapsed();

        Ok(OcrResult {
            fragments,
            backend: OcrBackendType::EasyOcr,
            processing_time_ms: elapsed.as_millis() as u64,
        })
    }
}
