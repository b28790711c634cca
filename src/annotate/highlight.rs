//! Keyword highlighting.
//!
//! Keywords are matched as literal, case-insensitive substrings anywhere in
//! the text (including inside longer words). Matching is a single
//! left-to-right pass. When keywords overlap, the leftmost match wins and,
//! at the same position, the longest keyword wins: keywords are ordered
//! longest-first before the alternation is built, and the regex engine uses
//! leftmost-first semantics.

use regex::{Regex, RegexBuilder};
use thiserror::Error;

use super::style::HighlightStyle;

/// Upper bound on the compiled pattern size.
pub(super) const PATTERN_SIZE_LIMIT: usize = 10 * (1 << 20);

/// Errors from building a highlight pattern.
#[derive(Debug, Error)]
pub enum AnnotationError {
    #[error("Invalid keyword pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Compiled keyword highlighter.
#[derive(Debug, Clone)]
pub struct Annotator {
    pattern: Option<Regex>,
    open: String,
    close: &'static str,
}

impl Annotator {
    /// Compile a highlighter for `keywords`.
    ///
    /// Empty keywords are ignored. With no usable keywords, or with
    /// [`HighlightStyle::None`], the annotator leaves text untouched.
    pub fn new<S: AsRef<str>>(
        keywords: &[S],
        style: HighlightStyle,
        color: &str,
    ) -> Result<Self, AnnotationError> {
        Self::with_size_limit(keywords, style, color, PATTERN_SIZE_LIMIT)
    }

    /// Like [`new`](Self::new), with an explicit bound on the compiled
    /// pattern size in bytes.
    pub fn with_size_limit<S: AsRef<str>>(
        keywords: &[S],
        style: HighlightStyle,
        color: &str,
        size_limit: usize,
    ) -> Result<Self, AnnotationError> {
        let Some((open, close)) = style.wrappers(color) else {
            return Ok(Self::passthrough());
        };

        let Some(pattern) = build_pattern(keywords, size_limit)? else {
            return Ok(Self::passthrough());
        };

        Ok(Self {
            pattern: Some(pattern),
            open,
            close,
        })
    }

    fn passthrough() -> Self {
        Self {
            pattern: None,
            open: String::new(),
            close: "",
        }
    }

    /// Whether this annotator can change its input.
    pub fn is_active(&self) -> bool {
        self.pattern.is_some()
    }

    /// Wrap every keyword match in markup. Unmatched text is copied verbatim.
    pub fn annotate(&self, text: &str) -> String {
        self.render(text, |s| s.to_string())
    }

    /// Like [`annotate`](Self::annotate), but HTML-escapes every text
    /// segment so the result can be embedded in a page. Only the markup
    /// wrappers are emitted raw.
    pub fn annotate_html(&self, text: &str) -> String {
        self.render(text, crate::utils::html_escape)
    }

    fn render(&self, text: &str, escape: impl Fn(&str) -> String) -> String {
        let Some(ref re) = self.pattern else {
            return escape(text);
        };

        let mut out = String::with_capacity(text.len() + text.len() / 4);
        let mut last = 0;
        for m in re.find_iter(text) {
            out.push_str(&escape(&text[last..m.start()]));
            out.push_str(&self.open);
            out.push_str(&escape(m.as_str()));
            out.push_str(self.close);
            last = m.end();
        }
        out.push_str(&escape(&text[last..]));
        out
    }
}

/// Build the case-insensitive alternation, longest keyword first.
fn build_pattern<S: AsRef<str>>(
    keywords: &[S],
    size_limit: usize,
) -> Result<Option<Regex>, AnnotationError> {
    let mut ordered: Vec<&str> = keywords
        .iter()
        .map(|k| k.as_ref())
        .filter(|k| !k.is_empty())
        .collect();
    if ordered.is_empty() {
        return Ok(None);
    }
    // Stable sort keeps input order among equal lengths.
    ordered.sort_by_key(|k| std::cmp::Reverse(k.chars().count()));

    let alternation = ordered
        .iter()
        .map(|k| regex::escape(k))
        .collect::<Vec<_>>()
        .join("|");

    let re = RegexBuilder::new(&format!("(?:{})", alternation))
        .case_insensitive(true)
        .size_limit(size_limit)
        .build()?;
    Ok(Some(re))
}

/// Highlight `keywords` in `text` using `style`.
///
/// `color` is only used for [`HighlightStyle::Background`].
pub fn annotate<S: AsRef<str>>(
    text: &str,
    keywords: &[S],
    style: HighlightStyle,
    color: &str,
) -> Result<String, AnnotationError> {
    Ok(Annotator::new(keywords, style, color)?.annotate(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_KEYWORDS: [&str; 0] = [];

    #[test]
    fn test_no_keywords_is_noop() {
        for style in HighlightStyle::all() {
            let out = annotate("Some text", &NO_KEYWORDS, style, "#FFFF00").unwrap();
            assert_eq!(out, "Some text");
        }
    }

    #[test]
    fn test_blank_keywords_are_ignored() {
        let out = annotate("a b c", &["", ""], HighlightStyle::Bold, "").unwrap();
        assert_eq!(out, "a b c");
    }

    #[test]
    fn test_none_style_is_identity() {
        let out = annotate("the cat", &["cat"], HighlightStyle::None, "#FFFF00").unwrap();
        assert_eq!(out, "the cat");
    }

    #[test]
    fn test_substring_match_inside_word() {
        let out = annotate("concatenate", &["cat"], HighlightStyle::Bold, "").unwrap();
        assert_eq!(out, "con<b>cat</b>enate");
    }

    #[test]
    fn test_preserves_original_case() {
        let out = annotate("Cat and CAT", &["cat"], HighlightStyle::Underline, "").unwrap();
        assert_eq!(out, "<u>Cat</u> and <u>CAT</u>");
    }

    #[test]
    fn test_background_uses_color() {
        let out = annotate("hello world", &["world"], HighlightStyle::Background, "#00FF00")
            .unwrap();
        assert_eq!(
            out,
            "hello <span style=\"background-color: #00FF00;\">world</span>"
        );
    }

    #[test]
    fn test_keywords_are_literal() {
        let out = annotate("1+1=2 and 11=2", &["1+1"], HighlightStyle::Bold, "").unwrap();
        assert_eq!(out, "<b>1+1</b>=2 and 11=2");

        let out = annotate("a.b axb", &["a.b"], HighlightStyle::Bold, "").unwrap();
        assert_eq!(out, "<b>a.b</b> axb");
    }

    #[test]
    fn test_overlap_prefers_longest_at_same_position() {
        let out = annotate("xabcx", &["ab", "abc"], HighlightStyle::Bold, "").unwrap();
        assert_eq!(out, "x<b>abc</b>x");

        let out = annotate("xabcx", &["abc", "ab"], HighlightStyle::Bold, "").unwrap();
        assert_eq!(out, "x<b>abc</b>x");
    }

    #[test]
    fn test_overlap_leftmost_wins() {
        // "bcd" would be longer but "ab" starts first.
        let out = annotate("abcd", &["ab", "bcd"], HighlightStyle::Bold, "").unwrap();
        assert_eq!(out, "<b>ab</b>cd");
    }

    #[test]
    fn test_devanagari_keywords() {
        let out = annotate("नमस्ते दुनिया", &["दुनिया"], HighlightStyle::Bold, "").unwrap();
        assert_eq!(out, "नमस्ते <b>दुनिया</b>");
    }

    #[test]
    fn test_annotate_html_escapes_segments() {
        let annotator = Annotator::new(&["a&b"], HighlightStyle::Bold, "").unwrap();
        assert_eq!(
            annotator.annotate_html("<x> a&b"),
            "&lt;x&gt; <b>a&amp;b</b>"
        );
        // The raw form leaves text untouched.
        assert_eq!(annotator.annotate("<x> a&b"), "<x> <b>a&b</b>");
    }

    #[test]
    fn test_is_active() {
        assert!(Annotator::new(&["an"], HighlightStyle::Bold, "").unwrap().is_active());
        assert!(!Annotator::new(&NO_KEYWORDS, HighlightStyle::Bold, "")
            .unwrap()
            .is_active());
        assert!(!Annotator::new(&["an"], HighlightStyle::None, "")
            .unwrap()
            .is_active());
    }

    #[test]
    fn test_pattern_over_size_limit_is_error() {
        let err = Annotator::with_size_limit(&["cat", "dog"], HighlightStyle::Bold, "", 1)
            .unwrap_err();
        assert!(matches!(err, AnnotationError::Pattern(_)));

        // The limit is irrelevant when nothing would be compiled.
        assert!(Annotator::with_size_limit(&["cat"], HighlightStyle::None, "", 1).is_ok());
    }
}
