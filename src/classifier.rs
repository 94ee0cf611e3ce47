use crate::error::{Error, Result};
use crate::llm::Generator;
use crate::prompts;
use crate::results::{ClassifiedLinks, LinkClassification, Page};
use async_trait::async_trait;

/// Picks the links on a page worth including in a brochure
///
/// Model-backed implementations are not deterministic: the same page can be
/// classified differently across calls.
#[async_trait]
pub trait LinkClassifier: Send + Sync {
    async fn classify(&self, page: &Page) -> Result<Vec<LinkClassification>>;
}

#[async_trait]
impl<T: LinkClassifier + ?Sized> LinkClassifier for Box<T> {
    async fn classify(&self, page: &Page) -> Result<Vec<LinkClassification>> {
        (**self).classify(page).await
    }
}

/// Asks a generation backend to choose and label links, in JSON
pub struct ModelLinkClassifier<G> {
    generator: G,
}

impl<G: Generator> ModelLinkClassifier<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl<G: Generator> LinkClassifier for ModelLinkClassifier<G> {
    async fn classify(&self, page: &Page) -> Result<Vec<LinkClassification>> {
        ::log::info!("Classifying {} links from {}", page.links.len(), page.url);
        let raw = self
            .generator
            .complete_json(&prompts::links_messages(page))
            .await?;
        let links = parse_classification(&raw)?;
        ::log::debug!("Model selected {} links: {:?}", links.len(), links);
        Ok(links)
    }
}

/// Parses `{"links": [{"type": ..., "url": ...}]}`
pub fn parse_classification(raw: &str) -> Result<Vec<LinkClassification>> {
    serde_json::from_str::<ClassifiedLinks>(raw.trim())
        .map(|parsed| parsed.links)
        .map_err(|e| Error::SchemaParse(format!("{} in response {:?}", e, raw)))
}

/// Returns a fixed list regardless of the page
#[derive(Debug, Clone, Default)]
pub struct FixedClassifier {
    links: Vec<LinkClassification>,
}

impl FixedClassifier {
    pub fn new(links: Vec<LinkClassification>) -> Self {
        Self { links }
    }
}

#[async_trait]
impl LinkClassifier for FixedClassifier {
    async fn classify(&self, _page: &Page) -> Result<Vec<LinkClassification>> {
        Ok(self.links.clone())
    }
}
