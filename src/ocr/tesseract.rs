//! Tesseract OCR backend implementation.
//!
//! Uses Tesseract OCR via command-line with TSV output, so every line comes
//! back with a bounding box and a confidence score.

use std::collections::HashMap;
use std::path::Path;
use std::process::Command;
use std::time::Instant;

use super::backend::{OcrBackend, OcrBackendType, OcrConfig, OcrError, OcrResult, TextFragment};
use super::model_utils::check_binary;

/// TSV row level for individual words.
const WORD_LEVEL: u32 = 5;

/// Tesseract OCR backend.
pub struct TesseractBackend {
    config: OcrConfig,
}

impl TesseractBackend {
    /// Create a new Tesseract backend with default configuration.
    pub fn new() -> Self {
        Self {
            config: OcrConfig::default(),
        }
    }

    /// Create a new Tesseract backend with custom configuration.
    pub fn with_config(config: OcrConfig) -> Self {
        if config.use_gpu {
            tracing::debug!("Tesseract runs on CPU; GPU request ignored");
        }
        Self { config }
    }

    /// Tesseract `-l` argument for the configured languages.
    fn language_arg(&self) -> String {
        self.config
            .languages
            .iter()
            .map(|l| tesseract_language(l))
            .collect::<Vec<_>>()
            .join("+")
    }

    /// Run Tesseract on an image file and return raw TSV.
    fn run_tesseract(&self, image_path: &Path) -> Result<String, OcrError> {
        let mut cmd = Command::new("tesseract");
        cmd.arg(image_path)
            .arg("stdout")
            .args(["-l", &self.language_arg()]);
        if let Some(ref dir) = self.config.model_path {
            cmd.arg("--tessdata-dir").arg(dir);
        }
        let output = cmd.arg("tsv").output();

        match output {
            Ok(output) => {
                if output.status.success() {
                    Ok(String::from_utf8_lossy(&output.stdout).to_string())
                } else {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    Err(OcrError::OcrFailed(format!(
                        "tesseract failed: {}",
                        stderr.trim()
                    )))
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(OcrError::BackendNotAvailable(
                    "tesseract not found (install tesseract-ocr)".to_string(),
                ))
            }
            Err(e) => Err(OcrError::Io(e)),
        }
    }
}

impl Default for TesseractBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl OcrBackend for TesseractBackend {
    fn backend_type(&self) -> OcrBackendType {
        OcrBackendType::Tesseract
    }

    fn is_available(&self) -> bool {
        check_binary("tesseract")
    }

    fn availability_hint(&self) -> String {
        if !check_binary("tesseract") {
            "Tesseract not installed. Install with: apt install tesseract-ocr tesseract-ocr-hin"
                .to_string()
        } else {
            format!("Tesseract is available (languages: {})", self.language_arg())
        }
    }

    fn recognize(&self, image_path: &Path) -> Result<OcrResult, OcrError> {
        let start = Instant::now();
        let tsv = self.run_tesseract(image_path)?;
        let fragments = parse_tsv_lines(&tsv);
        let elapsed = start.elapsed();

        Ok(OcrResult {
            fragments,
            backend: OcrBackendType::Tesseract,
            processing_time_ms: elapsed.as_millis() as u64,
        })
    }
}

/// Map a short language code to Tesseract's traineddata name.
/// Unknown codes are passed through unchanged.
fn tesseract_language(code: &str) -> &str {
    match code {
        "en" => "eng",
        "hi" => "hin",
        "mr" => "mar",
        "ne" => "nep",
        "bn" => "ben",
        "ta" => "tam",
        "te" => "tel",
        "ur" => "urd",
        other => other,
    }
}

/// Words collected for one text line.
struct LineAccumulator {
    words: Vec<String>,
    confidence_sum: f64,
    left: f64,
    top: f64,
    right: f64,
    bottom: f64,
}

impl LineAccumulator {
    fn into_fragment(self) -> TextFragment {
        let confidence = self.confidence_sum / self.words.len() as f64 / 100.0;
        TextFragment::from_rect(
            self.left,
            self.top,
            self.right,
            self.bottom,
            self.words.join(" "),
            confidence,
        )
    }
}

/// Group Tesseract TSV word rows into line fragments, in reading order.
///
/// Columns: level, page, block, par, line, word, left, top, width, height,
/// conf, text. Rows with negative confidence or blank text are skipped.
fn parse_tsv_lines(tsv: &str) -> Vec<TextFragment> {
    let mut order: Vec<(u32, u32, u32, u32)> = Vec::new();
    let mut lines: HashMap<(u32, u32, u32, u32), LineAccumulator> = HashMap::new();

    for row in tsv.lines().skip(1) {
        let cols: Vec<&str> = row.split('\t').collect();
        if cols.len() < 12 {
            continue;
        }
        if cols[0].parse::<u32>().ok() != Some(WORD_LEVEL) {
            continue;
        }
        let text = cols[11].trim();
        let conf: f64 = cols[10].trim().parse().unwrap_or(-1.0);
        if text.is_empty() || conf < 0.0 {
            continue;
        }

        let num = |i: usize| cols[i].trim().parse::<u32>().unwrap_or(0);
        let key = (num(1), num(2), num(3), num(4));
        let (left, top) = (num(6) as f64, num(7) as f64);
        let (right, bottom) = (left + num(8) as f64, top + num(9) as f64);

        match lines.get_mut(&key) {
            Some(acc) => {
                acc.words.push(text.to_string());
                acc.confidence_sum += conf;
                acc.left = acc.left.min(left);
                acc.top = acc.top.min(top);
                acc.right = acc.right.max(right);
                acc.bottom = acc.bottom.max(bottom);
            }
            None => {
                order.push(key);
                lines.insert(
                    key,
                    LineAccumulator {
                        words: vec![text.to_string()],
                        confidence_sum: conf,
                        left,
                        top,
                        right,
                        bottom,
                    },
                );
            }
        }
    }

    order
        .into_iter()
        .filter_map(|key| lines.remove(&key))
        .map(LineAccumulator::into_fragment)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext";

    fn tsv(rows: &[&str]) -> String {
        let mut out = String::from(HEADER);
        for row in rows {
            out.push('\n');
            out.push_str(row);
        }
        out
    }

    #[test]
    fn test_groups_words_into_lines() {
        let input = tsv(&[
            "1\t1\t0\t0\t0\t0\t0\t0\t640\t480\t-1\t",
            "4\t1\t1\t1\t1\t0\t10\t20\t200\t30\t-1\t",
            "5\t1\t1\t1\t1\t1\t10\t20\t50\t30\t90\tHello",
            "5\t1\t1\t1\t1\t2\t70\t22\t60\t28\t80\tworld",
            "5\t1\t1\t1\t2\t1\t10\t60\t80\t30\t70\tनमस्ते",
        ]);
        let fragments = parse_tsv_lines(&input);
        assert_eq!(fragments.len(), 2);

        assert_eq!(fragments[0].text, "Hello world");
        assert!((fragments[0].confidence - 0.85).abs() < 1e-9);
        assert_eq!(
            fragments[0].bounding_box,
            vec![[10.0, 20.0], [130.0, 20.0], [130.0, 50.0], [10.0, 50.0]]
        );

        assert_eq!(fragments[1].text, "नमस्ते");
        assert!((fragments[1].confidence - 0.70).abs() < 1e-9);
    }

    #[test]
    fn test_skips_blank_and_unconfident_words() {
        let input = tsv(&[
            "5\t1\t1\t1\t1\t1\t10\t20\t50\t30\t-1\tghost",
            "5\t1\t1\t1\t1\t2\t10\t20\t50\t30\t95\t   ",
            "5\t1\t1\t1\t1\t3\t10\t20\t50\t30\t95\tkept",
        ]);
        let fragments = parse_tsv_lines(&input);
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].text, "kept");
    }

    #[test]
    fn test_preserves_reading_order() {
        let input = tsv(&[
            "5\t1\t2\t1\t1\t1\t0\t100\t10\t10\t90\tsecond",
            "5\t1\t1\t1\t1\t1\t0\t0\t10\t10\t90\tfirst",
        ]);
        let texts: Vec<_> = parse_tsv_lines(&input)
            .into_iter()
            .map(|f| f.text)
            .collect();
        assert_eq!(texts, vec!["second", "first"]);
    }

    #[test]
    fn test_empty_output() {
        assert!(parse_tsv_lines("").is_empty());
        assert!(parse_tsv_lines(HEADER).is_empty());
    }

    #[test]
    fn test_language_arg() {
        let backend = TesseractBackend::new();
        assert_eq!(backend.language_arg(), "eng+hin");

        let backend = TesseractBackend::with_config(OcrConfig::new(
            vec!["en".to_string(), "deu".to_string()],
            false,
        ));
        assert_eq!(backend.language_arg(), "eng+deu");
    }
}
