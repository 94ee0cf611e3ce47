// Re-export modules
pub mod assembler;
pub mod classifier;
pub mod config;
pub mod error;
pub mod fetchers;
pub mod filter;
pub mod llm;
pub mod parsers;
pub mod prompts;
pub mod results;
pub mod retry;
pub mod utils;

// Re-export commonly used types for convenience
pub use assembler::{Assembler, AssemblerOptions, LinkFailurePolicy};
pub use classifier::LinkClassifier;
pub use error::{Error, Result};
pub use fetchers::Fetcher;
pub use llm::{Generator, ModelChoice, TextStream};
pub use results::{LinkClassification, Page, PromptDocument};

use config::{BrochureConfig, ClassifierKind, FetcherKind};
use prompts::Tone;
use std::sync::Arc;

/// Brochure runner with every capability boxed behind its trait, as built
/// from configuration
pub type ConfiguredBrochure = Brochure<Box<dyn Fetcher>, Box<dyn LinkClassifier>, Arc<dyn Generator>>;

/// Summarizes pages and writes company brochures from a landing page
///
/// Every step runs to completion before the next starts: fetch the landing
/// page, pick its relevant links, fetch those, assemble the document, call
/// the model. Any error ends the operation.
pub struct Brochure<F, C, G> {
    assembler: Assembler<F>,
    classifier: C,
    generator: G,
    tone: Tone,
}

impl<F, C, G> Brochure<F, C, G>
where
    F: Fetcher,
    C: LinkClassifier,
    G: Generator,
{
    /// Create a runner with default assembler options
    pub fn new(fetcher: F, classifier: C, generator: G) -> Self {
        Self {
            assembler: Assembler::new(fetcher, AssemblerOptions::default()),
            classifier,
            generator,
            tone: Tone::default(),
        }
    }

    /// Set the assembler options (character budget, failure policy, ...)
    pub fn with_options(self, options: AssemblerOptions) -> Self {
        let Brochure {
            assembler,
            classifier,
            generator,
            tone,
        } = self;
        let fetcher = assembler.into_fetcher();
        Self {
            assembler: Assembler::new(fetcher, options),
            classifier,
            generator,
            tone,
        }
    }

    /// Set the voice of the brochure
    pub fn with_tone(mut self, tone: Tone) -> Self {
        self.tone = tone;
        self
    }

    pub fn options(&self) -> &AssemblerOptions {
        self.assembler.options()
    }

    /// Fetch a single page
    pub async fn fetch(&self, url: &str) -> Result<Page> {
        self.assembler.fetch(url).await
    }

    /// Short markdown summary of one page
    pub async fn summarize(&self, url: &str) -> Result<String> {
        let page = self.fetch(url).await?;
        self.generator
            .complete(&prompts::summary_messages(&page))
            .await
    }

    /// Links on the landing page the classifier considers relevant
    pub async fn relevant_links(&self, url: &str) -> Result<Vec<LinkClassification>> {
        let page = self.fetch(url).await?;
        self.classifier.classify(&page).await
    }

    /// Landing page plus classified pages, within the character budget
    pub async fn document(&self, url: &str) -> Result<PromptDocument> {
        let primary = self.fetch(url).await?;
        let links = self.classifier.classify(&primary).await?;
        ::log::info!("Found {} relevant links on {}", links.len(), url);
        self.assembler.assemble_from_page(&primary, &links).await
    }

    /// The user prompt sent for a brochure
    pub async fn brochure_prompt(&self, company_name: &str, url: &str) -> Result<String> {
        let document = self.document(url).await?;
        Ok(prompts::brochure_user_prompt(company_name, &document.text))
    }

    /// Generate a brochure and return it in one piece
    pub async fn create_brochure(&self, company_name: &str, url: &str) -> Result<String> {
        let document = self.document(url).await?;
        let messages = prompts::brochure_messages(self.tone, company_name, &document.text);
        self.generator.complete(&messages).await
    }

    /// Generate a brochure as a stream of markdown fragments
    pub async fn stream_brochure(&self, company_name: &str, url: &str) -> Result<TextStream> {
        let document = self.document(url).await?;
        let messages = prompts::brochure_messages(self.tone, company_name, &document.text);
        self.generator.stream(&messages).await
    }

    /// Release fetcher resources such as a browser session
    pub async fn shutdown(&self) {
        self.assembler.fetcher().shutdown().await;
    }
}

impl ConfiguredBrochure {
    /// Build a runner from configuration
    ///
    /// The model selection is resolved first, so an unknown name fails
    /// before any network traffic.
    pub fn from_config(config: &BrochureConfig) -> Result<Self> {
        let choice = config.model_choice()?;
        let generator: Arc<dyn Generator> = Arc::from(llm::generator_for(choice, config)?);

        let fetcher: Box<dyn Fetcher> = match config.fetcher {
            FetcherKind::Http => Box::new(fetchers::HttpFetcher::new(
                &config.user_agent,
                config.timeout(),
            )?),
            FetcherKind::Webdriver => Box::new(fetchers::WebDriverFetcher::new(&config.webdriver_url)),
        };

        let classifier: Box<dyn LinkClassifier> = match config.classifier {
            ClassifierKind::Model => Box::new(classifier::ModelLinkClassifier::new(generator.clone())),
            ClassifierKind::Rules => Box::new(
                filter::RuleLinkClassifier::new(config.link_filter.clone())
                    .map_err(|e| Error::Config(format!("invalid link rule: {}", e)))?,
            ),
        };

        Ok(Brochure::new(fetcher, classifier, generator)
            .with_options(config.assembler_options())
            .with_tone(config.tone))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{FixedClassifier, ModelLinkClassifier};
    use crate::fetchers::fake::FakeFetcher;
    use crate::llm::Role;
    use crate::llm::fake::FakeGenerator;
    use futures::StreamExt;

    fn acme() -> FakeFetcher {
        FakeFetcher::default()
            .with_page("https://acme.example", "Acme", "We make anvils")
            .with_links("https://acme.example", &["/about", "/privacy"])
            .with_page("https://acme.example/about", "About Acme", "Founded in 1949")
    }

    fn about() -> Vec<LinkClassification> {
        vec![LinkClassification::new(
            "about page",
            "https://acme.example/about",
        )]
    }

    #[tokio::test]
    async fn test_create_brochure_sends_assembled_document() {
        let brochure = Brochure::new(
            acme(),
            FixedClassifier::new(about()),
            FakeGenerator::replying("# Acme\nAnvils for everyone"),
        );

        let text = brochure.create_brochure("Acme", "https://acme.example").await.unwrap();
        assert_eq!(text, "# Acme\nAnvils for everyone");

        let calls = brochure.generator.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0][0].role, Role::System);
        assert_eq!(calls[0][0].content, Tone::Professional.brochure_system_prompt());
        let user = &calls[0][1].content;
        assert!(user.starts_with("You are looking at a company called: Acme\n"));
        assert!(user.contains("Landing page:\nWebpage Title:\nAcme"));
        assert!(user.contains("\n\nabout page\nWebpage Title:\nAbout Acme"));
    }

    #[tokio::test]
    async fn test_landing_page_fetched_once() {
        let brochure = Brochure::new(acme(), FixedClassifier::new(about()), FakeGenerator::replying("ok"));
        brochure.create_brochure("Acme", "https://acme.example").await.unwrap();
        assert_eq!(
            brochure.assembler.fetcher().requests(),
            vec!["https://acme.example", "https://acme.example/about"]
        );
    }

    #[tokio::test]
    async fn test_model_classifier_end_to_end() {
        let generator = Arc::new(
            FakeGenerator::replying("brochure").with_json(
                r#"{"links": [{"type": "about page", "url": "https://acme.example/about"}]}"#,
            ),
        );
        let brochure = Brochure::new(
            acme(),
            ModelLinkClassifier::new(generator.clone()),
            generator.clone(),
        );

        let prompt = brochure.brochure_prompt("Acme", "https://acme.example").await.unwrap();
        assert!(prompt.contains("about page\nWebpage Title:\nAbout Acme"));

        let calls = generator.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0][1].content.ends_with("/about\n/privacy"));
    }

    #[tokio::test]
    async fn test_schema_error_aborts_brochure() {
        let generator = Arc::new(FakeGenerator::replying("brochure").with_json("not json"));
        let brochure = Brochure::new(
            acme(),
            ModelLinkClassifier::new(generator.clone()),
            generator.clone(),
        );

        let result = brochure.create_brochure("Acme", "https://acme.example").await;
        assert!(matches!(result, Err(Error::SchemaParse(_))));
        // Only the classification call was made
        assert_eq!(generator.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_stream_brochure_yields_fragments() {
        let brochure = Brochure::new(
            acme(),
            FixedClassifier::default(),
            FakeGenerator::replying("Acme makes anvils"),
        )
        .with_tone(Tone::Humorous);

        let stream = brochure.stream_brochure("Acme", "https://acme.example").await.unwrap();
        let fragments: Vec<String> = stream.map(|f| f.unwrap()).collect().await;
        assert_eq!(fragments, vec!["Acme ", "makes ", "anvils"]);
        assert!(brochure.generator.calls()[0][0].content.contains("humorous"));
    }

    #[tokio::test]
    async fn test_generation_failure_propagates() {
        let brochure = Brochure::new(acme(), FixedClassifier::default(), FakeGenerator::failing());
        let result = brochure.summarize("https://acme.example").await;
        assert!(matches!(result, Err(Error::Generation(_))));
    }

    #[tokio::test]
    async fn test_options_apply_to_document() {
        let brochure = Brochure::new(acme(), FixedClassifier::new(about()), FakeGenerator::replying("ok"))
            .with_options(AssemblerOptions {
                char_limit: 30,
                ..AssemblerOptions::default()
            });
        let document = brochure.document("https://acme.example").await.unwrap();
        assert_eq!(document.char_len(), 30);
        assert!(document.truncated);
    }

    #[test]
    fn test_from_config_rejects_unknown_model() {
        let config = BrochureConfig::from_json(r#"{"model": "gemini"}"#).unwrap();
        assert!(matches!(
            ConfiguredBrochure::from_config(&config),
            Err(Error::UnknownSelection(_))
        ));
    }
}
