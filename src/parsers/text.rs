use crate::results::{NO_TITLE, Page};

/// Parses a plain text document
///
/// Lines are trimmed and blank lines dropped, so the result has the same
/// one-block-per-line shape as HTML extraction. Plain text carries no title
/// and no links.
pub fn parse(url: &str, text: &str) -> Page {
    Page::new(
        url.to_string(),
        NO_TITLE.to_string(),
        normalize_lines(text),
        Vec::new(),
    )
}

/// Trims each line and removes empty ones
pub fn normalize_lines(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
