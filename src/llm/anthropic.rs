use crate::error::{Error, Result};
use crate::llm::{Generator, Message, Role, TextStream};
use async_trait::async_trait;
use futures::{StreamExt, future, stream};
use serde::{Deserialize, Serialize};

pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-sonnet-20240620";
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

/// Chat completions against the Anthropic Messages API
pub struct AnthropicGenerator {
    client: reqwest::Client,
    api_key: String,
    model: String,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ApiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<ApiMessage<'a>>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

impl AnthropicGenerator {
    pub fn new(model: &str, max_tokens: u32, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model: model.to_string(),
            max_tokens,
        }
    }

    /// Reads the key from `ANTHROPIC_API_KEY`
    pub fn from_env(model: &str, max_tokens: u32) -> Result<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .map_err(|_| Error::Config("ANTHROPIC_API_KEY is not set".to_string()))?;
        Ok(Self::new(model, max_tokens, api_key))
    }

    fn request<'a>(&'a self, messages: &'a [Message], stream: bool) -> ApiRequest<'a> {
        // The API takes the system prompt separately from the conversation
        let system = messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>();

        ApiRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            system: if system.is_empty() {
                None
            } else {
                Some(system.join("\n"))
            },
            messages: messages
                .iter()
                .filter_map(|m| match m.role {
                    Role::System => None,
                    Role::User => Some(ApiMessage {
                        role: "user",
                        content: &m.content,
                    }),
                    Role::Assistant => Some(ApiMessage {
                        role: "assistant",
                        content: &m.content,
                    }),
                })
                .collect(),
            stream,
        }
    }

    async fn send(&self, body: &ApiRequest<'_>) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(MESSAGES_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Generation(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(Error::Generation(format!(
                "anthropic http {}: {}",
                status, detail
            )));
        }
        Ok(response)
    }
}

#[async_trait]
impl Generator for AnthropicGenerator {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        let response = self.send(&self.request(messages, false)).await?;
        let body: ApiResponse = response
            .json()
            .await
            .map_err(|e| Error::Generation(e.to_string()))?;

        let text: String = body.content.into_iter().filter_map(|b| b.text).collect();
        if text.is_empty() {
            return Err(Error::Generation(
                "no content in Anthropic response".to_string(),
            ));
        }
        Ok(text)
    }

    /// There is no JSON switch on this API, so the reply is prefilled with
    /// the opening brace of an object.
    async fn complete_json(&self, messages: &[Message]) -> Result<String> {
        let mut prefilled = messages.to_vec();
        prefilled.push(Message::assistant("{"));
        let rest = self.complete(&prefilled).await?;
        Ok(format!("{{{}", rest))
    }

    async fn stream(&self, messages: &[Message]) -> Result<TextStream> {
        let response = self.send(&self.request(messages, true)).await?;

        let fragments = response
            .bytes_stream()
            .scan(SseDecoder::default(), |decoder, chunk| {
                let items: Vec<Result<String>> = match chunk {
                    Ok(bytes) => decoder
                        .push(&bytes)
                        .into_iter()
                        .filter_map(|data| text_delta(&data))
                        .collect(),
                    Err(e) => vec![Err(Error::Generation(e.to_string()))],
                };
                future::ready(Some(items))
            })
            .flat_map(stream::iter);

        Ok(fragments.boxed())
    }
}

/// Splits a server-sent event byte stream into `data:` payloads
#[derive(Debug, Default)]
pub struct SseDecoder {
    buf: Vec<u8>,
}

impl SseDecoder {
    /// Feeds a chunk and returns every complete `data:` line it finished
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(bytes);
        let mut data = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let line = self.buf.drain(..=pos).collect::<Vec<u8>>();
            let line = String::from_utf8_lossy(&line);
            if let Some(rest) = line.strip_prefix("data:") {
                let payload = rest.trim();
                if !payload.is_empty() {
                    data.push(payload.to_string());
                }
            }
        }
        data
    }
}

/// Text carried by a streaming event, or the error it reports
pub fn text_delta(data: &str) -> Option<Result<String>> {
    let event: serde_json::Value = serde_json::from_str(data).ok()?;
    match event.get("type").and_then(|t| t.as_str()) {
        Some("content_block_delta") => event
            .get("delta")
            .and_then(|d| d.get("text"))
            .and_then(|t| t.as_str())
            .map(|t| Ok(t.to_string())),
        Some("error") => Some(Err(Error::Generation(
            event
                .get("error")
                .map(|e| e.to_string())
                .unwrap_or_else(|| data.to_string()),
        ))),
        _ => None,
    }
}
