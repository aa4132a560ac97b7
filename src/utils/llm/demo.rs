use std::sync::Arc;
use anyhow::Result;
use async_trait::async_trait;

use crate::config::ModelKind;
use crate::demo::demo_response;
use crate::utils::llm::{ChatModel, Message};
use crate::utils::llm::message::last_human_content;

/// Offline stand-in for a chat model: answers with [demo_response] of the last human message.
#[derive(Debug, Clone)]
pub struct DemoChat {
    kind: ModelKind,
    max_words: Option<usize>,
}

impl DemoChat {
    pub fn new(kind: ModelKind) -> Self {
        Self { kind, max_words: None }
    }
}

impl Default for DemoChat {
    fn default() -> Self {
        Self::new(ModelKind::Default)
    }
}

#[async_trait]
impl ChatModel for DemoChat {
    fn model_name(&self) -> &str {
        "demo"
    }

    async fn invoke(&self, messages: &[Message]) -> Result<String> {
        let prompt = last_human_content(messages).unwrap_or("");
        let reply = demo_response(prompt, self.kind);
        Ok(match self.max_words {
            Some(max_words) => reply.split_whitespace().take(max_words).collect::<Vec<_>>().join(" "),
            None => reply.to_string(),
        })
    }

    /// Demo replies are cut to `max_tokens` words.
    fn with_max_tokens(&self, max_tokens: u32) -> Arc<dyn ChatModel> {
        Arc::new(Self {
            kind: self.kind,
            max_words: Some(max_tokens as usize),
        })
    }
}
