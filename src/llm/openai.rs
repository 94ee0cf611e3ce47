use crate::error::{Error, Result};
use crate::llm::{Generator, Message, Role, TextStream};
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequest, CreateChatCompletionRequestArgs, ResponseFormat,
    },
};
use async_trait::async_trait;
use futures::{StreamExt, future};

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// Chat completions against the OpenAI API
///
/// The key is read from `OPENAI_API_KEY` unless one is given explicitly.
pub struct OpenAiGenerator {
    client: Client<OpenAIConfig>,
    model: String,
}

impl Default for OpenAiGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_OPENAI_MODEL)
    }
}

impl OpenAiGenerator {
    pub fn new(model: &str) -> Self {
        Self {
            client: Client::new(),
            model: model.to_string(),
        }
    }

    pub fn with_api_key(model: &str, api_key: String) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key);
        Self {
            client: Client::with_config(config),
            model: model.to_string(),
        }
    }

    fn request(&self, messages: &[Message], json: bool) -> Result<CreateChatCompletionRequest> {
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(&self.model).messages(request_messages(messages)?);
        if json {
            args.response_format(ResponseFormat::JsonObject);
        }
        Ok(args.build()?)
    }

    async fn first_choice(&self, request: CreateChatCompletionRequest) -> Result<String> {
        let response = self.client.chat().create(request).await?;
        ::log::debug!(
            "OpenAI response {} used {:?}",
            response.id,
            response.usage.as_ref().map(|u| u.total_tokens)
        );

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| Error::Generation("no content in OpenAI response".to_string()))
    }
}

fn request_messages(messages: &[Message]) -> Result<Vec<ChatCompletionRequestMessage>> {
    messages
        .iter()
        .map(|m| {
            let message: ChatCompletionRequestMessage = match m.role {
                Role::System => ChatCompletionRequestSystemMessageArgs::default()
                    .content(m.content.as_str())
                    .build()?
                    .into(),
                Role::User => ChatCompletionRequestUserMessageArgs::default()
                    .content(m.content.as_str())
                    .build()?
                    .into(),
                Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                    .content(m.content.as_str())
                    .build()?
                    .into(),
            };
            Ok(message)
        })
        .collect()
}

#[async_trait]
impl Generator for OpenAiGenerator {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        let request = self.request(messages, false)?;
        self.first_choice(request).await
    }

    async fn complete_json(&self, messages: &[Message]) -> Result<String> {
        let request = self.request(messages, true)?;
        self.first_choice(request).await
    }

    async fn stream(&self, messages: &[Message]) -> Result<TextStream> {
        let request = self.request(messages, false)?;
        let stream = self.client.chat().create_stream(request).await?;

        let fragments = stream
            .map(|chunk| -> Result<String> {
                let chunk = chunk?;
                Ok(chunk
                    .choices
                    .into_iter()
                    .filter_map(|choice| choice.delta.content)
                    .collect())
            })
            .filter(|fragment| future::ready(!matches!(fragment, Ok(text) if text.is_empty())));

        Ok(fragments.boxed())
    }
}
