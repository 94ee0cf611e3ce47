use crate::results::{NO_TITLE, Page};
use scraper::{ElementRef, Html, Node, Selector};
use std::sync::LazyLock;

/// Elements whose text never reaches the extracted body
pub const REMOVED_ELEMENTS: [&str; 4] = ["script", "style", "img", "input"];

static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());
static BODY: LazyLock<Selector> = LazyLock::new(|| Selector::parse("body").unwrap());
static ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());

/// Parses an HTML document into a page with title, body text and links
pub fn parse(url: &str, html: &str) -> Page {
    let doc = Html::parse_document(html);

    let title = extract_title(&doc);
    let body_text = extract_body_text(&doc);
    let links = extract_links(&doc);

    ::log::debug!("HTML parser found {} links on {}", links.len(), url);
    if !links.is_empty() {
        ::log::trace!(
            "First few links: {:?}",
            links.iter().take(5).collect::<Vec<_>>()
        );
    }

    Page::new(url.to_string(), title, body_text, links)
}

/// Text of the first `<title>`, or the sentinel when missing or blank
pub fn extract_title(doc: &Html) -> String {
    doc.select(&TITLE)
        .next()
        .map(|t| t.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| NO_TITLE.to_string())
}

/// Visible text under `<body>`, one trimmed text node per line
///
/// Returns an empty string when the document has no body (e.g. framesets).
pub fn extract_body_text(doc: &Html) -> String {
    match doc.select(&BODY).next() {
        Some(body) => visible_text(body).join("\n"),
        None => String::new(),
    }
}

/// `href` of every anchor in the whole document, empties dropped
pub fn extract_links(doc: &Html) -> Vec<String> {
    doc.select(&ANCHOR)
        .filter_map(|e| e.value().attr("href"))
        .filter(|href| !href.is_empty())
        .map(|s| s.to_string())
        .collect()
}

fn visible_text(root: ElementRef<'_>) -> Vec<String> {
    root.descendants()
        .filter_map(|node| match node.value() {
            Node::Text(text) => {
                let removed = node.ancestors().any(|a| {
                    a.value()
                        .as_element()
                        .is_some_and(|e| REMOVED_ELEMENTS.contains(&e.name()))
                });
                if removed { None } else { Some(text.trim()) }
            }
            _ => None,
        })
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect()
}
