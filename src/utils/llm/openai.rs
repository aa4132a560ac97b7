use std::sync::Arc;
use std::time::Duration;
use anyhow::{anyhow, Result};
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequest, CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use futures::StreamExt;
use log::debug;
use url::Url;

use crate::utils::llm::{ChatModel, Message, Role, TextStream};

/// Request parameters for an OpenAI-compatible chat completion endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationConfig {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub timeout: Duration,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4".to_string(),
            temperature: 0.0,
            max_tokens: None,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Chat model served by an OpenAI-compatible API (OpenAI itself, LiteLLM, ...).
#[derive(Clone, Debug)]
pub struct OpenAIChat {
    pub client: Client<OpenAIConfig>,
    pub config: ConversationConfig,
}

impl OpenAIChat {
    /// Build a client for `api_base` with the timeout of `config`.
    pub fn new(api_key: &str, api_base: &Url, config: ConversationConfig) -> Result<Self> {
        let openai_config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(api_base.as_str().trim_end_matches('/'));
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        let client = Client::with_config(openai_config).with_http_client(http_client);
        Ok(Self { client, config })
    }

    /// Return a copy with adjusted request parameters, keeping the same client.
    pub fn bind(&self, adjust: impl FnOnce(&mut ConversationConfig)) -> Self {
        let mut bound = self.clone();
        adjust(&mut bound.config);
        bound
    }

    fn build_request(&self, messages: &[Message], stream: bool) -> Result<CreateChatCompletionRequest> {
        let messages = messages.iter()
            .map(to_request_message)
            .collect::<Result<Vec<_>>>()?;
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(self.config.model.as_str())
            .messages(messages)
            .temperature(self.config.temperature)
            .stream(stream);
        if let Some(max_tokens) = self.config.max_tokens {
            args.max_tokens(u16::try_from(max_tokens).unwrap_or(u16::MAX));
        }
        Ok(args.build()?)
    }
}

fn to_request_message(message: &Message) -> Result<ChatCompletionRequestMessage> {
    let request_message = match message.role {
        Role::System => ChatCompletionRequestSystemMessageArgs::default()
            .content(message.content.as_str())
            .build()?
            .into(),
        Role::Human => ChatCompletionRequestUserMessageArgs::default()
            .content(message.content.as_str())
            .build()?
            .into(),
        Role::Ai => ChatCompletionRequestAssistantMessageArgs::default()
            .content(message.content.as_str())
            .build()?
            .into(),
    };
    Ok(request_message)
}

#[async_trait]
impl ChatModel for OpenAIChat {
    fn model_name(&self) -> &str {
        &self.config.model
    }

    async fn invoke(&self, messages: &[Message]) -> Result<String> {
        let request = self.build_request(messages, false)?;
        debug!("chat completion request to model {}", self.config.model);
        let response = self.client.chat().create(request).await?;
        response.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| anyhow!("model {} returned an empty response", self.config.model))
    }

    async fn stream(&self, messages: &[Message]) -> Result<TextStream> {
        let request = self.build_request(messages, true)?;
        let stream = self.client.chat().create_stream(request).await?;
        let chunks = stream.map(|response| {
            response
                .map(|response| {
                    response.choices
                        .into_iter()
                        .filter_map(|choice| choice.delta.content)
                        .collect::<String>()
                })
                .map_err(anyhow::Error::from)
        });
        Ok(chunks.boxed())
    }

    fn with_max_tokens(&self, max_tokens: u32) -> Arc<dyn ChatModel> {
        Arc::new(self.bind(|config| config.max_tokens = Some(max_tokens)))
    }
}

#[cfg(test)]
mod test_openai {
    use super::*;

    fn model() -> OpenAIChat {
        let base = Url::parse("http://localhost:4000/v1/").unwrap();
        OpenAIChat::new("sk-test", &base, ConversationConfig::default()).unwrap()
    }

    #[test]
    fn test_bind_keeps_other_settings() {
        let chat = model();
        let bound = chat.bind(|c| c.max_tokens = Some(50));
        assert_eq!(Some(50), bound.config.max_tokens);
        assert_eq!(chat.config.model, bound.config.model);
        assert_eq!(None, chat.config.max_tokens);
    }

    #[test]
    fn test_build_request() {
        let chat = model().bind(|c| {
            c.max_tokens = Some(1000);
            c.temperature = 0.7;
        });
        let request = chat.build_request(&[
            Message::system("You are a helpful Python tutor"),
            Message::human("Explain variables to a beginner"),
            Message::ai("Sure"),
        ], false).unwrap();
        assert_eq!("gpt-4", request.model);
        assert_eq!(3, request.messages.len());
        assert_eq!(Some(0.7), request.temperature);
        assert!(matches!(request.messages[0], ChatCompletionRequestMessage::System(_)));
        assert!(matches!(request.messages[2], ChatCompletionRequestMessage::Assistant(_)));
    }
}
