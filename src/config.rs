use crate::assembler::{AssemblerOptions, DEFAULT_CHAR_LIMIT, LinkFailurePolicy};
use crate::error::{Error, Result};
use crate::fetchers::http::DEFAULT_USER_AGENT;
use crate::fetchers::web::DEFAULT_WEBDRIVER_URL;
use crate::filter::LinkFilterConfig;
use crate::llm::ModelChoice;
use crate::llm::anthropic::{DEFAULT_ANTHROPIC_MODEL, DEFAULT_MAX_TOKENS};
use crate::llm::openai::DEFAULT_OPENAI_MODEL;
use crate::prompts::Tone;
use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

/// How pages are retrieved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetcherKind {
    /// Plain HTTP GET
    #[default]
    Http,
    /// Through a browser driven by a WebDriver server
    Webdriver,
}

/// How the landing page's links are picked
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierKind {
    /// Ask the selected model
    #[default]
    Model,
    /// Regex rules from `link_filter`
    Rules,
}

/// Configuration for brochure generation
///
/// API keys are never part of the file; they come from `OPENAI_API_KEY` and
/// `ANTHROPIC_API_KEY`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrochureConfig {
    /// Backend selection token ("gpt" or "claude")
    #[serde(default = "default_model")]
    pub model: String,

    /// Model name sent to OpenAI
    #[serde(default = "default_openai_model")]
    pub openai_model: String,

    /// Model name sent to Anthropic
    #[serde(default = "default_anthropic_model")]
    pub anthropic_model: String,

    /// Reply length cap for backends that require one
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Character budget of the assembled document
    #[serde(default = "default_char_limit")]
    pub char_limit: usize,

    /// Linked pages fetched at once
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    #[serde(default)]
    pub link_failure: LinkFailurePolicy,

    #[serde(default)]
    pub retry: RetryPolicy,

    #[serde(default)]
    pub fetcher: FetcherKind,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout for HTTP fetches; the client default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    #[serde(default)]
    pub tone: Tone,

    #[serde(default)]
    pub classifier: ClassifierKind,

    /// Rules used when `classifier` is "rules"
    #[serde(default)]
    pub link_filter: LinkFilterConfig,
}

fn default_model() -> String {
    "gpt".to_string()
}

fn default_openai_model() -> String {
    DEFAULT_OPENAI_MODEL.to_string()
}

fn default_anthropic_model() -> String {
    DEFAULT_ANTHROPIC_MODEL.to_string()
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

fn default_char_limit() -> usize {
    DEFAULT_CHAR_LIMIT
}

fn default_max_concurrency() -> usize {
    1
}

fn default_webdriver_url() -> String {
    DEFAULT_WEBDRIVER_URL.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl Default for BrochureConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            openai_model: default_openai_model(),
            anthropic_model: default_anthropic_model(),
            max_tokens: default_max_tokens(),
            char_limit: default_char_limit(),
            max_concurrency: default_max_concurrency(),
            link_failure: LinkFailurePolicy::default(),
            retry: RetryPolicy::default(),
            fetcher: FetcherKind::default(),
            webdriver_url: default_webdriver_url(),
            user_agent: default_user_agent(),
            timeout_secs: None,
            tone: Tone::default(),
            classifier: ClassifierKind::default(),
            link_filter: LinkFilterConfig::default(),
        }
    }
}

impl BrochureConfig {
    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut file = File::open(path)
            .map_err(|e| Error::Config(format!("cannot open {}: {}", path.display(), e)))?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))
    }

    /// Apply overrides from the environment
    pub fn apply_env(&mut self) {
        // Override the WebDriver URL with an environment variable if provided
        if let Ok(webdriver_url) = std::env::var("WEBDRIVER_URL") {
            if !webdriver_url.is_empty() {
                self.webdriver_url = webdriver_url;
            }
        }
    }

    /// Resolve the backend selection token
    pub fn model_choice(&self) -> Result<ModelChoice> {
        self.model.parse()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn assembler_options(&self) -> AssemblerOptions {
        AssemblerOptions {
            char_limit: self.char_limit,
            link_failure: self.link_failure,
            max_concurrency: self.max_concurrency,
            retry: self.retry,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_gives_defaults() {
        let config = BrochureConfig::from_json("{}").unwrap();
        assert_eq!(config.model, "gpt");
        assert_eq!(config.char_limit, 20_000);
        assert_eq!(config.max_concurrency, 1);
        assert_eq!(config.link_failure, LinkFailurePolicy::AbortOnLinkFailure);
        assert_eq!(config.retry, RetryPolicy::no_retry());
        assert_eq!(config.fetcher, FetcherKind::Http);
        assert_eq!(config.classifier, ClassifierKind::Model);
        assert!(config.timeout().is_none());
    }

    #[test]
    fn test_full_config() {
        let config = BrochureConfig::from_json(
            r#"{
                "model": "claude",
                "char_limit": 5000,
                "max_concurrency": 3,
                "link_failure": "skip-and-continue",
                "retry": {"max_attempts": 2, "backoff": {"kind": "fixed", "delay_ms": 500}},
                "fetcher": "webdriver",
                "timeout_secs": 30,
                "tone": "humorous",
                "classifier": "rules",
                "link_filter": {"allow_external": true}
            }"#,
        )
        .unwrap();

        assert_eq!(config.model_choice().unwrap(), ModelChoice::Claude);
        assert_eq!(config.fetcher, FetcherKind::Webdriver);
        assert_eq!(config.tone, Tone::Humorous);
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
        assert!(config.link_filter.allow_external);
        assert!(!config.link_filter.rules.is_empty());

        let options = config.assembler_options();
        assert_eq!(options.char_limit, 5000);
        assert_eq!(options.max_concurrency, 3);
        assert_eq!(options.link_failure, LinkFailurePolicy::SkipAndContinue);
        assert_eq!(options.retry.max_attempts, 2);
    }

    #[test]
    fn test_unknown_model_surfaces_on_selection() {
        let config = BrochureConfig::from_json(r#"{"model": "bard"}"#).unwrap();
        assert!(matches!(
            config.model_choice(),
            Err(Error::UnknownSelection(name)) if name == "bard"
        ));
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        assert!(matches!(
            BrochureConfig::from_json("{not json"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            BrochureConfig::from_file("/nonexistent/brochure.json"),
            Err(Error::Config(_))
        ));
    }
}
