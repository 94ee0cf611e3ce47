use crate::error::{Error, Result};
use crate::fetchers::Fetcher;
use crate::parsers::Parser;
use crate::results::Page;
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use std::time::Duration;

/// Default user agent; some sites refuse requests without a browser-like one
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/117.0.0.0 Safari/537.36";

/// Fetches pages with a plain HTTP GET
///
/// Pages rendered by JavaScript come back mostly empty; use
/// [`crate::fetchers::WebDriverFetcher`] for those.
pub struct HttpFetcher {
    client: reqwest::Client,
    user_agent: String,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self {
            client: reqwest::Client::new(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl HttpFetcher {
    /// Create a fetcher with a user agent and an optional request timeout
    pub fn new(user_agent: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| Error::Config(format!("could not build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            user_agent: user_agent.to_string(),
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Page> {
        ::log::info!("Fetching {}", url);
        let started = std::time::Instant::now();

        let response = self
            .client
            .get(url)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await
            .map_err(|e| Error::fetch(url, e))?;

        let response = response
            .error_for_status()
            .map_err(|e| Error::fetch(url, e))?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());

        let body = response.text().await.map_err(|e| Error::fetch(url, e))?;

        let page = Parser::parse_with_content_type(url, &body, content_type.as_deref());
        ::log::debug!(
            "Fetched {} ({} chars of text, {} links) in {:.2} seconds",
            url,
            page.body_text.chars().count(),
            page.links.len(),
            started.elapsed().as_secs_f64()
        );
        Ok(page)
    }
}
