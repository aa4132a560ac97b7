//! The chat model seam.
//!
//! Everything that talks to a language model goes through [ChatModel], so chains, memory and the
//! assistant work the same against [OpenAIChat](openai::OpenAIChat) and the offline
//! [DemoChat](demo::DemoChat).

pub mod message;
pub mod openai;
pub mod demo;

use std::sync::Arc;
use anyhow::Result;
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};

pub use message::{Message, Role};

/// A stream of text chunks from a model.
pub type TextStream = BoxStream<'static, Result<String>>;

#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Model name, e.g. `gpt-4`.
    fn model_name(&self) -> &str;

    /// Send the messages and return the reply content.
    async fn invoke(&self, messages: &[Message]) -> Result<String>;

    /// Send a single human message.
    async fn invoke_prompt(&self, prompt: &str) -> Result<String> {
        self.invoke(&[Message::human(prompt)]).await
    }

    /// Stream the reply in chunks. Defaults to one chunk holding the whole reply.
    async fn stream(&self, messages: &[Message]) -> Result<TextStream> {
        let reply = self.invoke(messages).await?;
        Ok(stream::once(async move { Ok(reply) }).boxed())
    }

    /// A copy of this model whose replies are capped at `max_tokens`.
    fn with_max_tokens(&self, max_tokens: u32) -> Arc<dyn ChatModel>;
}

#[cfg(test)]
pub(crate) mod testing {
    //! Models for tests.

    use std::sync::Arc;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use super::{ChatModel, Message};

    /// Replies with `echo: <last message content>` and records every request.
    #[derive(Default)]
    pub struct EchoChat {
        pub requests: Mutex<Vec<Vec<Message>>>,
    }

    #[async_trait]
    impl ChatModel for EchoChat {
        fn model_name(&self) -> &str {
            "echo"
        }

        async fn invoke(&self, messages: &[Message]) -> Result<String> {
            self.requests.lock().push(messages.to_vec());
            let last = messages.last().map(|m| m.content.as_str()).unwrap_or("");
            Ok(format!("echo: {}", last))
        }

        fn with_max_tokens(&self, _max_tokens: u32) -> Arc<dyn ChatModel> {
            Arc::new(EchoChat::default())
        }
    }

    /// Always fails.
    pub struct FailingChat;

    #[async_trait]
    impl ChatModel for FailingChat {
        fn model_name(&self) -> &str {
            "failing"
        }

        async fn invoke(&self, _messages: &[Message]) -> Result<String> {
            Err(anyhow!("connection refused"))
        }

        fn with_max_tokens(&self, _max_tokens: u32) -> Arc<dyn ChatModel> {
            Arc::new(FailingChat)
        }
    }
}
