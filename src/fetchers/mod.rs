pub mod http;
pub mod web;

#[cfg(test)]
pub(crate) mod canned;

use crate::error::Result;
use crate::results::Page;
use async_trait::async_trait;

pub use http::HttpFetcher;
pub use web::WebDriverFetcher;

/// Retrieves a URL and reduces it to a [`Page`]
///
/// Implementations issue exactly one retrieval per call and never retry;
/// retrying is the caller's decision (see [`crate::retry::RetryPolicy`]).
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Page>;

    /// Releases anything held between fetches
    async fn shutdown(&self) {}
}

#[async_trait]
impl<T: Fetcher + ?Sized> Fetcher for Box<T> {
    async fn fetch(&self, url: &str) -> Result<Page> {
        (**self).fetch(url).await
    }

    async fn shutdown(&self) {
        (**self).shutdown().await
    }
}

#[async_trait]
impl<T: Fetcher + ?Sized> Fetcher for std::sync::Arc<T> {
    async fn fetch(&self, url: &str) -> Result<Page> {
        (**self).fetch(url).await
    }

    async fn shutdown(&self) {
        (**self).shutdown().await
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use crate::error::Error;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory fetcher that records the order of requests
    #[derive(Default)]
    pub struct FakeFetcher {
        pages: HashMap<String, Page>,
        pub requests: Mutex<Vec<String>>,
    }

    impl FakeFetcher {
        pub fn with_page(mut self, url: &str, title: &str, body_text: &str) -> Self {
            self.pages.insert(
                url.to_string(),
                Page::new(
                    url.to_string(),
                    title.to_string(),
                    body_text.to_string(),
                    Vec::new(),
                ),
            );
            self
        }

        pub fn with_links(mut self, url: &str, links: &[&str]) -> Self {
            if let Some(page) = self.pages.get_mut(url) {
                page.links = links.iter().map(|l| l.to_string()).collect();
            }
            self
        }

        pub fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Fetcher for FakeFetcher {
        async fn fetch(&self, url: &str) -> Result<Page> {
            self.requests.lock().unwrap().push(url.to_string());
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| Error::fetch(url, "404 Not Found"))
        }
    }
}
