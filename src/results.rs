use serde::{Deserialize, Serialize};

/// Title used when a document has no usable `<title>`
pub const NO_TITLE: &str = "No title found";

/// One fetched URL, reduced to its title, visible text and outbound links
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// URL the page was fetched from
    pub url: String,

    /// Document title, or [`NO_TITLE`]
    pub title: String,

    /// Visible text with markup removed, one text node per line
    pub body_text: String,

    /// `href` values of every anchor, in document order, empties removed
    pub links: Vec<String>,
}

impl Page {
    /// Create a new page
    pub fn new(url: String, title: String, body_text: String, links: Vec<String>) -> Self {
        Self {
            url,
            title,
            body_text,
            links,
        }
    }

    /// Title and text block used when building prompts
    pub fn contents(&self) -> String {
        format!(
            "Webpage Title:\n{}\nWebpage Contents:\n{}\n\n",
            self.title, self.body_text
        )
    }
}

/// A link the relevance filter picked out, with a free-text label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkClassification {
    /// Label such as "about page" or "careers page"
    #[serde(rename = "type")]
    pub kind: String,

    /// Absolute URL of the linked page
    pub url: String,
}

impl LinkClassification {
    pub fn new(kind: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            url: url.into(),
        }
    }
}

/// Envelope the classifier is asked to respond with
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifiedLinks {
    pub links: Vec<LinkClassification>,
}

/// Concatenated page text, cut to a character budget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptDocument {
    /// The (possibly truncated) document text
    pub text: String,

    /// URLs whose content made it into the document, in order
    pub pages: Vec<String>,

    /// Whether the character budget cut the text
    pub truncated: bool,
}

impl PromptDocument {
    /// Number of characters in the document
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}
