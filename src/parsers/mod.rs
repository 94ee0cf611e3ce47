pub mod html;
pub mod text;


use crate::results::Page;

/// Kind of document returned by a fetch, used to pick a parser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// HTML (or anything we can't identify, which is treated as HTML)
    Html,
    /// Plain text
    Text,
}

impl ContentKind {
    /// Determines the content kind from a `Content-Type` header value
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        let Some(value) = content_type else {
            ::log::debug!("No content type, classifying as HTML");
            return ContentKind::Html;
        };

        let mime = value
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        if mime == "text/plain" {
            ::log::debug!("Classifying as Text: {}", value);
            ContentKind::Text
        } else {
            ::log::debug!("Classifying as HTML: {}", value);
            ContentKind::Html
        }
    }
}

/// Main parser that delegates to the format-specific parsers
pub struct Parser;

impl Parser {
    /// Parse a fetched document into a [`Page`]
    pub fn parse(url: &str, content: &str, kind: ContentKind) -> Page {
        match kind {
            ContentKind::Html => html::parse(url, content),
            ContentKind::Text => text::parse(url, content),
        }
    }

    /// Determine the content kind from the header and then parse
    pub fn parse_with_content_type(url: &str, content: &str, content_type: Option<&str>) -> Page {
        Self::parse(url, content, ContentKind::from_content_type(content_type))
    }
}
