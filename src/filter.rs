use crate::classifier::LinkClassifier;
use crate::error::Result;
use crate::results::{LinkClassification, Page};
use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use url::Url;

/// A label applied to links whose resolved URL matches `pattern`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkRule {
    /// Label such as "about page"
    pub label: String,

    /// Regex matched against the path of the resolved URL
    pub pattern: String,
}

impl LinkRule {
    pub fn new(label: &str, pattern: &str) -> Self {
        Self {
            label: label.to_string(),
            pattern: pattern.to_string(),
        }
    }
}

/// Configuration for rule-based link classification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkFilterConfig {
    /// Whether links to other domains may be selected
    #[serde(default)]
    pub allow_external: bool,

    /// Labelled patterns, first match wins; a link matching none is dropped
    #[serde(default = "default_rules")]
    pub rules: Vec<LinkRule>,

    /// Regex patterns for links to drop (these take precedence over rules)
    #[serde(default = "default_exclude_patterns")]
    pub exclude_patterns: Vec<String>,
}

fn default_rules() -> Vec<LinkRule> {
    vec![
        LinkRule::new(
            "about page",
            r"(?i)/(about|about-us|company|team|who-we-are)(/|$)",
        ),
        LinkRule::new(
            "careers page",
            r"(?i)/(careers?|jobs|join-us|hiring)(/|$)",
        ),
        LinkRule::new("customers page", r"(?i)/(customers|case-studies)(/|$)"),
    ]
}

fn default_exclude_patterns() -> Vec<String> {
    vec![
        r"(?i)(terms|privacy|legal|cookie)".to_string(),
        r"^(mailto|tel|javascript):".to_string(),
        r"\.(jpg|jpeg|png|gif|css|js|ico|svg|pdf)$".to_string(),
    ]
}

impl Default for LinkFilterConfig {
    fn default() -> Self {
        Self {
            allow_external: false,
            rules: default_rules(),
            exclude_patterns: default_exclude_patterns(),
        }
    }
}

/// Deterministic link classifier driven by regex rules
///
/// Relative links are resolved against the page URL, fragments are dropped
/// and each resolved URL is selected at most once.
#[derive(Debug)]
pub struct RuleLinkClassifier {
    config: LinkFilterConfig,
    rules: Vec<(String, Regex)>,
    exclude_regexes: Vec<Regex>,
}

impl Default for RuleLinkClassifier {
    fn default() -> Self {
        Self::new(LinkFilterConfig::default()).expect("Default regex patterns should be valid")
    }
}

impl RuleLinkClassifier {
    /// Create a new classifier from configuration
    pub fn new(config: LinkFilterConfig) -> std::result::Result<Self, regex::Error> {
        let mut rules = Vec::with_capacity(config.rules.len());
        for rule in &config.rules {
            rules.push((rule.label.clone(), Regex::new(&rule.pattern)?));
        }

        let mut exclude_regexes = Vec::with_capacity(config.exclude_patterns.len());
        for pattern in &config.exclude_patterns {
            exclude_regexes.push(Regex::new(pattern)?);
        }

        Ok(Self {
            config,
            rules,
            exclude_regexes,
        })
    }

    /// Classify the links of a page without any I/O
    pub fn classify_links(&self, page: &Page) -> Vec<LinkClassification> {
        let Ok(base) = Url::parse(&page.url) else {
            ::log::warn!("Cannot resolve links against invalid URL {}", page.url);
            return Vec::new();
        };
        let own = self.normalize_url(&base);

        let mut seen = HashSet::new();
        let mut selected = Vec::new();

        for link in &page.links {
            if self.is_excluded(link) {
                ::log::trace!("Link filter rejected: {}", link);
                continue;
            }

            let Ok(resolved) = base.join(link) else {
                continue;
            };
            if !matches!(resolved.scheme(), "http" | "https") {
                continue;
            }
            if !self.is_in_domain_scope(&resolved, &base) || self.is_excluded(resolved.as_str()) {
                ::log::trace!("Link filter rejected: {}", resolved);
                continue;
            }

            let normalized = self.normalize_url(&resolved);
            if normalized == own || seen.contains(normalized.as_str()) {
                continue;
            }

            if let Some(label) = self.label_for(&normalized) {
                ::log::debug!("Link filter selected {} as {}", normalized, label);
                seen.insert(normalized.to_string());
                selected.push(LinkClassification::new(label, normalized.to_string()));
            }
        }

        selected
    }

    fn is_excluded(&self, link: &str) -> bool {
        self.exclude_regexes.iter().any(|regex| regex.is_match(link))
    }

    fn label_for(&self, url: &Url) -> Option<&str> {
        self.rules
            .iter()
            .find(|(_, regex)| regex.is_match(url.path()))
            .map(|(label, _)| label.as_str())
    }

    /// Check if a URL is within the allowed domain scope
    fn is_in_domain_scope(&self, url: &Url, base: &Url) -> bool {
        if self.config.allow_external {
            return true;
        }
        match (url.host_str(), base.host_str()) {
            (Some(host), Some(base_host)) => host == base_host,
            _ => false,
        }
    }

    /// Create a normalized version of the URL (e.g., removing fragments)
    pub fn normalize_url(&self, url: &Url) -> Url {
        let mut normalized = url.clone();
        normalized.set_fragment(None);
        normalized
    }
}

#[async_trait]
impl LinkClassifier for RuleLinkClassifier {
    async fn classify(&self, page: &Page) -> Result<Vec<LinkClassification>> {
        let links = self.classify_links(page);
        ::log::info!(
            "Rules selected {} of {} links from {}",
            links.len(),
            page.links.len(),
            page.url
        );
        Ok(links)
    }
}
