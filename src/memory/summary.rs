use std::fmt;
use std::sync::Arc;
use anyhow::Result;
use lazy_static::lazy_static;
use log::debug;
use parking_lot::Mutex;

use crate::memory::ChatMessageHistory;
use crate::prompt::{vars, PromptTemplate};
use crate::utils::llm::{ChatModel, Message, Role};

lazy_static! {
    static ref SUMMARY_PROMPT: PromptTemplate = PromptTemplate::new(
        "Progressively summarize the lines of conversation provided, adding onto the previous summary returning a new summary.

EXAMPLE
Current summary:
The human asks what the AI thinks of artificial intelligence. The AI thinks artificial intelligence is a force for good.

New lines of conversation:
Human: Why do you think artificial intelligence is a force for good?
AI: Because artificial intelligence will help humans reach their full potential.

New summary:
The human asks what the AI thinks of artificial intelligence. The AI thinks artificial intelligence is a force for good because it will help humans reach their full potential.
END OF EXAMPLE

Current summary:
{{summary}}

New lines of conversation:
{{new_lines}}

New summary:");
}

/// Render messages as `Human: ...` / `AI: ...` lines.
pub fn buffer_string(messages: &[Message]) -> String {
    messages.iter()
        .map(|m| {
            let speaker = match m.role {
                Role::System => "System",
                Role::Human => "Human",
                Role::Ai => "AI",
            };
            format!("{}: {}", speaker, m.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Full history plus a summary that a model keeps up to date.
pub struct ConversationSummaryMemory {
    model: Arc<dyn ChatModel>,
    pub chat_memory: Mutex<ChatMessageHistory>,
    summary: Mutex<String>,
}

impl fmt::Debug for ConversationSummaryMemory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversationSummaryMemory")
            .field("model", &self.model.model_name())
            .field("chat_memory", &*self.chat_memory.lock())
            .field("summary", &*self.summary.lock())
            .finish()
    }
}

impl ConversationSummaryMemory {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self {
            model,
            chat_memory: Mutex::new(ChatMessageHistory::new()),
            summary: Mutex::new(String::new()),
        }
    }

    /// Ask the model to fold `messages` into `existing_summary`.
    pub async fn predict_new_summary(&self, messages: &[Message], existing_summary: &str) -> Result<String> {
        let new_lines = buffer_string(messages);
        let prompt = SUMMARY_PROMPT.format(&vars([("summary", existing_summary), ("new_lines", new_lines.as_str())]))?;
        debug!("summarizing {} new messages", messages.len());
        let summary = self.model.invoke_prompt(&prompt).await?;
        Ok(summary.trim().to_string())
    }

    /// Record an exchange and refresh the summary with it.
    pub async fn save_context(&self, human: impl Into<String>, ai: impl Into<String>) -> Result<()> {
        let exchange = [Message::human(human), Message::ai(ai)];
        {
            let mut chat_memory = self.chat_memory.lock();
            exchange.iter().cloned().for_each(|m| chat_memory.add_message(m));
        }
        let existing = self.summary();
        let summary = self.predict_new_summary(&exchange, &existing).await?;
        *self.summary.lock() = summary;
        Ok(())
    }

    pub fn summary(&self) -> String {
        self.summary.lock().clone()
    }

    /// The summary as a system message, for use as chat history.
    pub fn load_memory(&self) -> Vec<Message> {
        let summary = self.summary();
        if summary.is_empty() {
            Vec::new()
        } else {
            vec![Message::system(summary)]
        }
    }

    pub fn clear(&self) {
        self.chat_memory.lock().clear();
        self.summary.lock().clear();
    }
}

#[cfg(test)]
mod test_summary {
    use super::*;
    use crate::utils::llm::testing::{EchoChat, FailingChat};

    #[test]
    fn test_debug_names_model() {
        let memory = ConversationSummaryMemory::new(Arc::new(EchoChat::default()));
        memory.chat_memory.lock().add_user_message("hi");
        let debug = format!("{:?}", memory);
        assert!(debug.starts_with("ConversationSummaryMemory { model: \"echo\""));
        assert!(debug.contains("hi"));
    }

    #[test]
    fn test_buffer_string() {
        let lines = buffer_string(&[Message::human("hi"), Message::ai("hello"), Message::system("be nice")]);
        assert_eq!("Human: hi\nAI: hello\nSystem: be nice", lines);
    }

    #[tokio::test]
    async fn test_predict_new_summary_prompt() {
        let model = Arc::new(EchoChat::default());
        let memory = ConversationSummaryMemory::new(model.clone());
        memory.chat_memory.lock().add_user_message("I'm predicting house prices");
        memory.chat_memory.lock().add_ai_message("A classic regression problem!");
        let messages = memory.chat_memory.lock().messages().to_vec();
        memory.predict_new_summary(&messages, "").await.unwrap();

        let requests = model.requests.lock();
        let prompt = &requests[0][0].content;
        assert!(prompt.starts_with("Progressively summarize"));
        assert!(prompt.contains("Current summary:\n\n\nNew lines of conversation:\nHuman: I'm predicting house prices\nAI: A classic regression problem!\n\nNew summary:"));
    }

    #[tokio::test]
    async fn test_save_context() {
        let memory = ConversationSummaryMemory::new(Arc::new(EchoChat::default()));
        assert!(memory.load_memory().is_empty());
        memory.save_context("hi", "hello").await.unwrap();
        assert_eq!(2, memory.chat_memory.lock().len());
        assert!(memory.summary().starts_with("echo: Progressively summarize"));
        assert_eq!(Role::System, memory.load_memory()[0].role);
        memory.clear();
        assert!(memory.summary().is_empty());

        let failing = ConversationSummaryMemory::new(Arc::new(FailingChat));
        assert!(failing.save_context("hi", "hello").await.is_err());
        assert_eq!(2, failing.chat_memory.lock().len());
    }
}
