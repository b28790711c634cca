//! Keyword annotation command.

use std::io::Read;
use std::path::Path;

use console::style;

use crate::annotate::{analyze, parse_keywords, AnnotationResult, HighlightStyle};
use crate::cli::icons::{dim_arrow, warn};
use crate::config::Settings;

/// Highlight keywords in a text file (or stdin) and print statistics.
///
/// The annotated text goes to stdout; statistics go to stderr unless
/// `json` is set, in which case the whole result is printed as JSON.
pub fn cmd_annotate(
    settings: &Settings,
    input: Option<&Path>,
    keywords: &str,
    style: Option<HighlightStyle>,
    color: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let keywords = parse_keywords(keywords);
    if keywords.is_empty() {
        anyhow::bail!("No keywords given. Use --keywords \"word, other\"");
    }

    let text = read_input(input)?;
    let style = style.unwrap_or(settings.highlight_style);
    let color = color.unwrap_or(&settings.highlight_color);

    let Some(result) = analyze(&text, &keywords, style, color, false) else {
        anyhow::bail!("No keywords given");
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_analysis(&result);
        println!("{}", result.annotated_text);
    }
    Ok(())
}

/// Read text from `input`, or stdin when it is absent or "-".
fn read_input(input: Option<&Path>) -> anyhow::Result<String> {
    match input {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e)),
        _ => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

/// Print keyword statistics to stderr.
pub(super) fn print_analysis(result: &AnnotationResult) {
    eprintln!("{} {}", style("Keywords:").bold(), result.keywords.join(", "));
    eprintln!(
        "{} {}",
        style("Total words:").bold(),
        result.stats.word_count
    );
    if result.stats.keyword_counts.is_empty() {
        eprintln!("  {} no whole-word keyword matches", dim_arrow());
    }
    for (keyword, count) in &result.stats.keyword_counts {
        eprintln!("  {} {}: {}", dim_arrow(), keyword, count);
    }
    if let Some(ref warning) = result.warning {
        eprintln!("{} {}", warn(), warning);
    }
}
