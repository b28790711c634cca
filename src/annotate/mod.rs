//! Keyword highlighting and text statistics for extracted text.
//!
//! - [`annotate`] / [`Annotator`]: wrap keyword matches in markup
//! - [`count_words`]: total word count plus per-keyword token counts
//!
//! The two deliberately use different matching rules: highlighting matches
//! substrings, counting matches whole tokens.

mod highlight;
mod stats;
mod style;

use serde::Serialize;

pub use highlight::{annotate, AnnotationError, Annotator};
pub use stats::{count_words, TextStats};
pub use style::{is_valid_color, sanitize_color, HighlightStyle, DEFAULT_HIGHLIGHT_COLOR};

/// Split comma-separated keyword input into trimmed, non-empty keywords.
pub fn parse_keywords(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .map(String::from)
        .collect()
}

/// Annotated text plus statistics for one request.
#[derive(Debug, Clone, Serialize)]
pub struct AnnotationResult {
    pub keywords: Vec<String>,
    pub annotated_text: String,
    #[serde(flatten)]
    pub stats: TextStats,
    /// Set when highlighting failed and `annotated_text` is the plain text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Analyze `text` for `keywords`. Returns `None` when there are no keywords.
///
/// When `html` is set, the annotated text is HTML-escaped around the markup.
/// Pattern failures degrade to unannotated text with a warning.
pub fn analyze(
    text: &str,
    keywords: &[String],
    style: HighlightStyle,
    color: &str,
    html: bool,
) -> Option<AnnotationResult> {
    analyze_with_limit(text, keywords, style, color, html, highlight::PATTERN_SIZE_LIMIT)
}

fn analyze_with_limit(
    text: &str,
    keywords: &[String],
    style: HighlightStyle,
    color: &str,
    html: bool,
    size_limit: usize,
) -> Option<AnnotationResult> {
    if keywords.is_empty() {
        return None;
    }

    let color = match style {
        HighlightStyle::Background => sanitize_color(color),
        _ => color,
    };
    let stats = count_words(text, keywords);
    let annotator = Annotator::with_size_limit(keywords, style, color, size_limit);
    let (annotated_text, warning) = match annotator {
        Ok(annotator) if html => (annotator.annotate_html(text), None),
        Ok(annotator) => (annotator.annotate(text), None),
        Err(e) => {
            tracing::warn!("Highlighting disabled: {}", e);
            let plain = if html {
                crate::utils::html_escape(text)
            } else {
                text.to_string()
            };
            (plain, Some(format!("Keyword highlighting failed: {}", e)))
        }
    };

    Some(AnnotationResult {
        keywords: keywords.to_vec(),
        annotated_text,
        stats,
        warning,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keywords() {
        assert_eq!(parse_keywords(" cat , dog,,"), vec!["cat", "dog"]);
        assert!(parse_keywords("").is_empty());
        assert!(parse_keywords(" , ").is_empty());
    }

    #[test]
    fn test_analyze_without_keywords() {
        assert!(analyze("text", &[], HighlightStyle::Bold, "", false).is_none());
    }

    #[test]
    fn test_analyze_combines_stats_and_markup() {
        let keywords = parse_keywords("cat");
        let result = analyze("the cat <3", &keywords, HighlightStyle::Bold, "", true).unwrap();
        assert_eq!(result.annotated_text, "the <b>cat</b> &lt;3");
        assert_eq!(result.stats.word_count, 3);
        assert_eq!(result.stats.keyword_counts.get("cat"), Some(&1));
        assert!(result.warning.is_none());
    }

    #[test]
    fn test_analyze_sanitizes_background_color() {
        let keywords = parse_keywords("cat");
        let result = analyze(
            "cat",
            &keywords,
            HighlightStyle::Background,
            "red;\"><script>",
            true,
        )
        .unwrap();
        assert_eq!(
            result.annotated_text,
            "<span style=\"background-color: #FFFF00;\">cat</span>"
        );
    }

    #[test]
    fn test_pattern_failure_falls_back_to_plain_text() {
        let keywords = parse_keywords("cat, sat");
        let text = "The cat <sat> here";

        let result =
            analyze_with_limit(text, &keywords, HighlightStyle::Bold, "", false, 1).unwrap();
        assert_eq!(result.annotated_text, text);
        assert!(result
            .warning
            .as_deref()
            .is_some_and(|w| w.starts_with("Keyword highlighting failed")));
        assert_eq!(result.stats.word_count, 4);
        assert_eq!(result.stats.keyword_counts.get("cat"), Some(&1));

        let result =
            analyze_with_limit(text, &keywords, HighlightStyle::Bold, "", true, 1).unwrap();
        assert_eq!(result.annotated_text, "The cat &lt;sat&gt; here");
        assert!(result.warning.is_some());

        let json = serde_json::to_value(&result).unwrap();
        assert!(json["warning"].is_string());
    }

    #[test]
    fn test_analyze_serializes_flat() {
        let keywords = parse_keywords("cat");
        let result = analyze("cat", &keywords, HighlightStyle::Bold, "", false).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["word_count"], 1);
        assert_eq!(json["keyword_counts"]["cat"], 1);
        assert!(json.get("warning").is_none());
    }
}
