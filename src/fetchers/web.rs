use crate::error::{Error, Result};
use crate::fetchers::Fetcher;
use crate::parsers::{ContentKind, Parser};
use crate::results::Page;
use async_trait::async_trait;
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::timeout;

/// Default WebDriver endpoint (geckodriver / selenium standalone)
pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:4444";

/// Driver endpoints tried when the configured one refuses the connection
const FALLBACK_WEBDRIVER_URLS: [&str; 3] = [
    "http://localhost:9515", // ChromeDriver default
    "http://localhost:9222", // Chrome debug port default
    "http://127.0.0.1:4444", // Try with IP instead of localhost
];

/// Upper bound for navigating to a page and reading its source
const SCRAPE_TIMEOUT: Duration = Duration::from_secs(45);

/// Fetches pages through a WebDriver-controlled browser so client-side
/// rendered content is present in the source.
///
/// The browser session is opened on first use and reused; call
/// [`Fetcher::shutdown`] when done.
pub struct WebDriverFetcher {
    webdriver_url: String,
    client: Mutex<Option<Client>>,
}

impl WebDriverFetcher {
    pub fn new(webdriver_url: &str) -> Self {
        Self {
            webdriver_url: webdriver_url.to_string(),
            client: Mutex::new(None),
        }
    }

    async fn scrape(&self, client: &Client, url: &str) -> Result<Scrape> {
        let result = timeout(SCRAPE_TIMEOUT, async {
            client.goto(url).await?;
            Ok::<_, CmdError>(client.source().await?)
        })
        .await;

        match result {
            Ok(Ok(source)) => Ok(Scrape::Source(source)),
            Ok(Err(e)) if is_lost_session(&e) => Ok(Scrape::LostSession),
            Ok(Err(e)) => Err(Error::fetch(url, e)),
            Err(_) => Err(Error::fetch(url, "timed out loading page in browser")),
        }
    }
}

/// Outcome of loading one page in the browser
enum Scrape {
    Source(String),
    /// The driver no longer knows the session (browser crashed or restarted)
    LostSession,
}

fn is_lost_session(e: &CmdError) -> bool {
    e.is_invalid_session_id() || e.to_string().contains("Unable to find session")
}

#[async_trait]
impl Fetcher for WebDriverFetcher {
    async fn fetch(&self, url: &str) -> Result<Page> {
        ::log::info!("Fetching {} through WebDriver", url);
        let mut guard = self.client.lock().await;

        if guard.is_none() {
            *guard = Some(connect_to_webdriver(&self.webdriver_url).await?);
        }
        let client = guard
            .as_ref()
            .ok_or_else(|| Error::fetch(url, "no WebDriver session"))?
            .clone();

        let source = match self.scrape(&client, url).await? {
            Scrape::Source(source) => source,
            Scrape::LostSession => {
                ::log::warn!("Lost WebDriver session while loading {}, reconnecting", url);
                drop(client);
                if let Some(stale) = guard.take() {
                    close_session(stale).await;
                }
                let fresh = connect_to_webdriver(&self.webdriver_url).await?;
                *guard = Some(fresh.clone());
                match self.scrape(&fresh, url).await? {
                    Scrape::Source(source) => source,
                    Scrape::LostSession => {
                        return Err(Error::fetch(url, "WebDriver session lost again after reconnecting"));
                    }
                }
            }
        };

        Ok(Parser::parse(url, &source, ContentKind::Html))
    }

    /// Ends the browser session if one is open
    async fn shutdown(&self) {
        if let Some(client) = self.client.lock().await.take() {
            close_session(client).await;
        }
    }
}

/// Ends a browser session, logging rather than failing
async fn close_session(client: Client) {
    if let Err(e) = client.close().await {
        ::log::warn!("Failed to close WebDriver session: {}", e);
    }
}

/// Connects to the WebDriver instance, trying common alternative ports
async fn connect_to_webdriver(webdriver_url: &str) -> Result<Client> {
    match ClientBuilder::native().connect(webdriver_url).await {
        Ok(client) => {
            ::log::debug!("Connected to WebDriver at {}", webdriver_url);
            return Ok(client);
        }
        Err(e) => {
            ::log::error!(
                "Failed to connect to WebDriver at {}: {}",
                webdriver_url,
                e
            );
        }
    }

    for url in FALLBACK_WEBDRIVER_URLS.iter() {
        if *url == webdriver_url {
            continue;
        }

        ::log::info!("Trying fallback WebDriver URL: {}", url);
        if let Ok(client) = ClientBuilder::native().connect(url).await {
            ::log::debug!("Connected to fallback WebDriver at {}", url);
            return Ok(client);
        }
    }

    Err(Error::fetch(
        webdriver_url,
        "could not connect to any WebDriver server; start one or set WEBDRIVER_URL",
    ))
}
