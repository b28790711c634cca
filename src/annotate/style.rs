//! Highlight styles for keyword markup.

use serde::{Deserialize, Serialize};

/// Default background color used when none is configured.
pub const DEFAULT_HIGHLIGHT_COLOR: &str = "#FFFF00";

/// Markup wrapper applied to matched keyword spans.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum HighlightStyle {
    /// Colored-background `<span>`.
    #[default]
    Background,
    /// `<u>` underline.
    Underline,
    /// `<b>` bold.
    Bold,
    /// No markup.
    None,
}

impl HighlightStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            HighlightStyle::Background => "background",
            HighlightStyle::Underline => "underline",
            HighlightStyle::Bold => "bold",
            HighlightStyle::None => "none",
        }
    }

    /// Parse a style name. Accepts the short names and the labels shown in
    /// the web form.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "background" | "highlight" | "highlight with background color" => {
                Some(HighlightStyle::Background)
            }
            "underline" => Some(HighlightStyle::Underline),
            "bold" => Some(HighlightStyle::Bold),
            "none" | "" => Some(HighlightStyle::None),
            _ => None,
        }
    }

    /// Parse a style name, treating anything unrecognized as no highlighting.
    pub fn from_str_lossy(s: &str) -> Self {
        Self::from_str(s).unwrap_or(HighlightStyle::None)
    }

    /// Human-readable label for form controls.
    pub fn label(&self) -> &'static str {
        match self {
            HighlightStyle::Background => "Highlight with background color",
            HighlightStyle::Underline => "Underline",
            HighlightStyle::Bold => "Bold",
            HighlightStyle::None => "None",
        }
    }

    /// All styles in display order.
    pub fn all() -> [HighlightStyle; 4] {
        [
            HighlightStyle::Background,
            HighlightStyle::Underline,
            HighlightStyle::Bold,
            HighlightStyle::None,
        ]
    }

    /// Opening and closing markup for this style, or `None` when the style
    /// adds no markup.
    ///
    /// `color` is only consulted for [`HighlightStyle::Background`].
    pub fn wrappers(&self, color: &str) -> Option<(String, &'static str)> {
        match self {
            HighlightStyle::Background => Some((
                format!("<span style=\"background-color: {};\">", color),
                "</span>",
            )),
            HighlightStyle::Underline => Some(("<u>".to_string(), "</u>")),
            HighlightStyle::Bold => Some(("<b>".to_string(), "</b>")),
            HighlightStyle::None => None,
        }
    }
}

impl std::fmt::Display for HighlightStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Check that a color value is safe to place inside a `style` attribute.
///
/// Accepts `#rgb`, `#rrggbb`, `#rrggbbaa` and plain ASCII color names.
pub fn is_valid_color(color: &str) -> bool {
    if let Some(hex) = color.strip_prefix('#') {
        matches!(hex.len(), 3 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit())
    } else {
        !color.is_empty() && color.len() <= 32 && color.chars().all(|c| c.is_ascii_alphabetic())
    }
}

/// Return `color` if valid, otherwise the default highlight color.
pub fn sanitize_color(color: &str) -> &str {
    let trimmed = color.trim();
    if is_valid_color(trimmed) {
        trimmed
    } else {
        tracing::warn!("Invalid highlight color {:?}, using default", color);
        DEFAULT_HIGHLIGHT_COLOR
    }
}
