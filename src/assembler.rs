use crate::error::Result;
use crate::fetchers::Fetcher;
use crate::results::{LinkClassification, Page, PromptDocument};
use crate::retry::RetryPolicy;
use crate::utils::truncate_chars;
use futures::{StreamExt, stream};
use serde::{Deserialize, Serialize};

/// Default character budget of an assembled document
pub const DEFAULT_CHAR_LIMIT: usize = 20_000;

/// What to do when one of the classified links can't be fetched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkFailurePolicy {
    /// Fail the whole assembly, discarding pages already fetched
    #[default]
    AbortOnLinkFailure,
    /// Leave the failed page out and keep going
    SkipAndContinue,
}

/// Knobs for [`Assembler`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssemblerOptions {
    /// Maximum characters in the final document
    pub char_limit: usize,
    pub link_failure: LinkFailurePolicy,
    /// Linked pages fetched at once; 1 fetches strictly one after another
    pub max_concurrency: usize,
    pub retry: RetryPolicy,
}

impl Default for AssemblerOptions {
    fn default() -> Self {
        Self {
            char_limit: DEFAULT_CHAR_LIMIT,
            link_failure: LinkFailurePolicy::default(),
            max_concurrency: 1,
            retry: RetryPolicy::default(),
        }
    }
}

/// Concatenates a landing page and its classified links into one
/// bounded-length document
pub struct Assembler<F> {
    fetcher: F,
    options: AssemblerOptions,
}

impl<F: Fetcher> Assembler<F> {
    pub fn new(fetcher: F, options: AssemblerOptions) -> Self {
        Self { fetcher, options }
    }

    pub fn options(&self) -> &AssemblerOptions {
        &self.options
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn into_fetcher(self) -> F {
        self.fetcher
    }

    /// Fetches a page, honoring the retry policy
    pub async fn fetch(&self, url: &str) -> Result<Page> {
        self.options
            .retry
            .run(url, || self.fetcher.fetch(url))
            .await
    }

    /// Fetches the primary page and every classified link, then concatenates
    pub async fn assemble(
        &self,
        primary_url: &str,
        classifications: &[LinkClassification],
    ) -> Result<PromptDocument> {
        let primary = self.fetch(primary_url).await?;
        self.assemble_from_page(&primary, classifications).await
    }

    /// Like [`Assembler::assemble`] for a primary page that is already fetched
    pub async fn assemble_from_page(
        &self,
        primary: &Page,
        classifications: &[LinkClassification],
    ) -> Result<PromptDocument> {
        let linked = self.fetch_linked(classifications).await?;

        let mut text = String::from("Landing page:\n");
        text.push_str(&primary.contents());
        let mut pages = vec![primary.url.clone()];

        for (classification, page) in classifications.iter().zip(linked) {
            let Some(page) = page else { continue };
            text.push_str(&format!("\n\n{}\n", classification.kind));
            text.push_str(&page.contents());
            pages.push(page.url);
        }

        let full_len = text.chars().count();
        let text = truncate_chars(&text, self.options.char_limit).to_string();
        let truncated = full_len > self.options.char_limit;
        if truncated {
            ::log::info!(
                "Truncated document from {} to {} characters",
                full_len,
                self.options.char_limit
            );
        }

        Ok(PromptDocument {
            text,
            pages,
            truncated,
        })
    }

    /// One slot per classification, in input order; `None` marks a page
    /// skipped under [`LinkFailurePolicy::SkipAndContinue`].
    async fn fetch_linked(
        &self,
        classifications: &[LinkClassification],
    ) -> Result<Vec<Option<Page>>> {
        let concurrency = self.options.max_concurrency.max(1);
        ::log::debug!(
            "Fetching {} linked pages, {} at a time",
            classifications.len(),
            concurrency
        );

        let mut fetches = stream::iter(classifications.iter().enumerate())
            .map(|(index, classification)| async move {
                (index, self.fetch(&classification.url).await)
            })
            .buffer_unordered(concurrency);

        let mut pages: Vec<Option<Page>> = vec![None; classifications.len()];
        while let Some((index, result)) = fetches.next().await {
            match result {
                Ok(page) => pages[index] = Some(page),
                Err(e) => match self.options.link_failure {
                    LinkFailurePolicy::AbortOnLinkFailure => return Err(e),
                    LinkFailurePolicy::SkipAndContinue => {
                        ::log::warn!(
                            "Skipping {} ({}): {}",
                            classifications[index].url,
                            classifications[index].kind,
                            e
                        );
                    }
                },
            }
        }
        Ok(pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::fetchers::fake::FakeFetcher;

    fn acme() -> FakeFetcher {
        FakeFetcher::default()
            .with_page("https://acme.example", "Acme", "We make anvils")
            .with_page("https://acme.example/about", "About Acme", "Founded in 1949")
            .with_page("https://acme.example/jobs", "Jobs", "Hiring coyote wranglers")
    }

    fn about() -> LinkClassification {
        LinkClassification::new("about page", "https://acme.example/about")
    }

    fn jobs() -> LinkClassification {
        LinkClassification::new("careers page", "https://acme.example/jobs")
    }

    #[tokio::test]
    async fn test_primary_then_links_in_order() {
        let assembler = Assembler::new(acme(), AssemblerOptions::default());
        let document = assembler
            .assemble("https://acme.example", &[about()])
            .await
            .unwrap();

        assert_eq!(
            assembler.fetcher.requests(),
            vec!["https://acme.example", "https://acme.example/about"]
        );
        assert_eq!(
            document.text,
            "Landing page:\n\
             Webpage Title:\nAcme\nWebpage Contents:\nWe make anvils\n\n\
             \n\nabout page\n\
             Webpage Title:\nAbout Acme\nWebpage Contents:\nFounded in 1949\n\n"
        );
        assert_eq!(
            document.pages,
            vec!["https://acme.example", "https://acme.example/about"]
        );
        assert!(!document.truncated);
    }

    #[tokio::test]
    async fn test_no_classifications_is_primary_only() {
        let assembler = Assembler::new(acme(), AssemblerOptions::default());
        let document = assembler.assemble("https://acme.example", &[]).await.unwrap();

        let primary = assembler.fetch("https://acme.example").await.unwrap();
        assert_eq!(document.text, format!("Landing page:\n{}", primary.contents()));
    }

    #[tokio::test]
    async fn test_truncates_to_exact_prefix() {
        let long_text = "x".repeat(30_000);
        let fetcher = FakeFetcher::default().with_page("https://acme.example", "Acme", &long_text);
        let assembler = Assembler::new(fetcher, AssemblerOptions::default());

        let document = assembler.assemble("https://acme.example", &[]).await.unwrap();
        let untruncated = format!("Landing page:\nWebpage Title:\nAcme\nWebpage Contents:\n{}\n\n", long_text);

        assert!(document.truncated);
        assert_eq!(document.char_len(), DEFAULT_CHAR_LIMIT);
        assert_eq!(document.text, untruncated[..DEFAULT_CHAR_LIMIT]);
    }

    #[tokio::test]
    async fn test_length_never_exceeds_limit() {
        for limit in [0, 1, 17, 64, 500] {
            let options = AssemblerOptions {
                char_limit: limit,
                ..AssemblerOptions::default()
            };
            let assembler = Assembler::new(acme(), options);
            let document = assembler
                .assemble("https://acme.example", &[about(), jobs()])
                .await
                .unwrap();
            assert!(document.char_len() <= limit);
        }
    }

    #[tokio::test]
    async fn test_truncation_counts_characters_not_bytes() {
        let fetcher = FakeFetcher::default().with_page("https://acme.example", "Café", "héllo wörld");
        let options = AssemblerOptions {
            char_limit: 40,
            ..AssemblerOptions::default()
        };
        let assembler = Assembler::new(fetcher, options);
        let document = assembler.assemble("https://acme.example", &[]).await.unwrap();
        assert_eq!(document.char_len(), 40);
    }

    #[tokio::test]
    async fn test_failed_link_aborts_by_default() {
        let assembler = Assembler::new(acme(), AssemblerOptions::default());
        let missing = LinkClassification::new("blog", "https://acme.example/blog");

        let result = assembler
            .assemble("https://acme.example", &[about(), missing, jobs()])
            .await;
        assert!(matches!(result, Err(Error::Fetch { ref url, .. }) if url == "https://acme.example/blog"));
        assert_eq!(
            assembler.fetcher.requests(),
            vec![
                "https://acme.example",
                "https://acme.example/about",
                "https://acme.example/blog"
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_link_skipped_when_configured() {
        let options = AssemblerOptions {
            link_failure: LinkFailurePolicy::SkipAndContinue,
            ..AssemblerOptions::default()
        };
        let assembler = Assembler::new(acme(), options);
        let missing = LinkClassification::new("blog", "https://acme.example/blog");

        let document = assembler
            .assemble("https://acme.example", &[about(), missing, jobs()])
            .await
            .unwrap();
        assert_eq!(
            document.pages,
            vec![
                "https://acme.example",
                "https://acme.example/about",
                "https://acme.example/jobs"
            ]
        );
        assert!(!document.text.contains("\n\nblog\n"));
        assert!(document.text.contains("\n\ncareers page\n"));
    }

    #[tokio::test]
    async fn test_primary_failure_always_propagates() {
        let options = AssemblerOptions {
            link_failure: LinkFailurePolicy::SkipAndContinue,
            ..AssemblerOptions::default()
        };
        let assembler = Assembler::new(acme(), options);
        let result = assembler.assemble("https://nowhere.example", &[about()]).await;
        assert!(matches!(result, Err(Error::Fetch { .. })));
    }

    #[tokio::test]
    async fn test_concurrent_fetch_keeps_classification_order() {
        let sequential = Assembler::new(acme(), AssemblerOptions::default());
        let concurrent = Assembler::new(
            acme(),
            AssemblerOptions {
                max_concurrency: 4,
                ..AssemblerOptions::default()
            },
        );
        let links = [jobs(), about(), jobs()];

        let a = sequential.assemble("https://acme.example", &links).await.unwrap();
        let b = concurrent.assemble("https://acme.example", &links).await.unwrap();
        assert_eq!(a, b);
        assert!(a.text.find("careers page").unwrap() < a.text.find("about page").unwrap());
    }

    #[tokio::test]
    async fn test_retry_policy_applies_to_fetches() {
        let options = AssemblerOptions {
            retry: RetryPolicy::new(3, crate::retry::Backoff::None),
            ..AssemblerOptions::default()
        };
        let assembler = Assembler::new(acme(), options);
        let result = assembler.assemble("https://nowhere.example", &[]).await;
        assert!(result.is_err());
        assert_eq!(assembler.fetcher.requests().len(), 3);
    }
}
