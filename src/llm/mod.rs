pub mod anthropic;
pub mod openai;

use crate::error::{Error, Result};
use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use anthropic::AnthropicGenerator;
pub use openai::OpenAiGenerator;

/// Incrementally delivered text fragments of one generation call
pub type TextStream = BoxStream<'static, Result<String>>;

/// Speaker of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One message of a chat-style prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A remote text-generation capability
#[async_trait]
pub trait Generator: Send + Sync {
    /// Returns the complete reply
    async fn complete(&self, messages: &[Message]) -> Result<String>;

    /// Returns a reply the backend was asked to shape as a JSON object
    async fn complete_json(&self, messages: &[Message]) -> Result<String>;

    /// Returns the reply as a stream of fragments
    async fn stream(&self, messages: &[Message]) -> Result<TextStream>;
}

#[async_trait]
impl<T: Generator + ?Sized> Generator for Box<T> {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        (**self).complete(messages).await
    }

    async fn complete_json(&self, messages: &[Message]) -> Result<String> {
        (**self).complete_json(messages).await
    }

    async fn stream(&self, messages: &[Message]) -> Result<TextStream> {
        (**self).stream(messages).await
    }
}

#[async_trait]
impl<T: Generator + ?Sized> Generator for std::sync::Arc<T> {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        (**self).complete(messages).await
    }

    async fn complete_json(&self, messages: &[Message]) -> Result<String> {
        (**self).complete_json(messages).await
    }

    async fn stream(&self, messages: &[Message]) -> Result<TextStream> {
        (**self).stream(messages).await
    }
}

/// Backend selected by the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelChoice {
    Gpt,
    Claude,
}

impl FromStr for ModelChoice {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gpt" | "openai" => Ok(ModelChoice::Gpt),
            "claude" | "anthropic" => Ok(ModelChoice::Claude),
            _ => Err(Error::UnknownSelection(s.to_string())),
        }
    }
}

impl fmt::Display for ModelChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelChoice::Gpt => write!(f, "gpt"),
            ModelChoice::Claude => write!(f, "claude"),
        }
    }
}

/// Builds the generator for a selection from the loaded configuration
pub fn generator_for(
    choice: ModelChoice,
    config: &crate::config::BrochureConfig,
) -> Result<Box<dyn Generator>> {
    ::log::debug!("Using {} backend", choice);
    Ok(match choice {
        ModelChoice::Gpt => Box::new(OpenAiGenerator::new(&config.openai_model)),
        ModelChoice::Claude => Box::new(AnthropicGenerator::from_env(
            &config.anthropic_model,
            config.max_tokens,
        )?),
    })
}
