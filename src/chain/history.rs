use std::sync::Arc;
use anyhow::{bail, Result};
use async_trait::async_trait;
use log::debug;

use crate::chain::runnable::Runnable;
use crate::memory::SessionStore;
use crate::prompt::chat::ChatPromptTemplate;
use crate::prompt::vars;
use crate::utils::llm::{ChatModel, Message, Role};
use crate::utils::token::tiktoken::Tiktoken;

pub const HISTORY_KEY: &str = "history";
pub const INPUT_KEY: &str = "input";

/// Input of a [ConversationChain]: which conversation, and what the user said.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInput {
    pub session_id: String,
    pub input: String,
}

impl SessionInput {
    pub fn new(session_id: impl Into<String>, input: impl Into<String>) -> Self {
        Self { session_id: session_id.into(), input: input.into() }
    }
}

/// A chat chain that remembers each session.
///
/// Every call sends the system prompt, the session history and the new input. After a successful reply the
/// exchange is appended to the history, so failed calls leave the history untouched.
pub struct ConversationChain {
    prompt: ChatPromptTemplate,
    model: Arc<dyn ChatModel>,
    store: SessionStore,
    token_limit: Option<(Tiktoken, usize)>,
}

impl ConversationChain {
    pub fn new(model: Arc<dyn ChatModel>, system_prompt: impl Into<String>) -> Self {
        let prompt = ChatPromptTemplate::default()
            .message(Role::System, system_prompt)
            .placeholder(HISTORY_KEY)
            .message(Role::Human, format!("{{{{{}}}}}", INPUT_KEY));
        Self { prompt, model, store: SessionStore::new(), token_limit: None }
    }

    /// Keep histories in `store`, e.g. to share them with other chains.
    pub fn with_store(mut self, store: SessionStore) -> Self {
        self.store = store;
        self
    }

    /// Drop the oldest history messages when a request would exceed `max_tokens` as counted by `counter`.
    ///
    /// The system prompt and the new input are always sent. A call fails if they alone exceed the limit.
    pub fn with_token_limit(mut self, counter: Tiktoken, max_tokens: usize) -> Self {
        self.token_limit = Some((counter, max_tokens));
        self
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    fn build_messages(&self, history: &[Message], input: &str) -> Result<Vec<Message>> {
        let input_vars = vars([(INPUT_KEY, input)]);
        let history = match &self.token_limit {
            Some((counter, max_tokens)) => {
                let no_history: &[Message] = &[];
                let fixed: usize = self.prompt.format_messages_with(&input_vars, &[(HISTORY_KEY, no_history)])?
                    .iter()
                    .map(|m| counter.count_msg_token(m))
                    .sum();
                if fixed > *max_tokens {
                    bail!("system prompt and input take {} tokens, more than the limit of {}", fixed, max_tokens);
                }
                let start = counter.get_truncate_start_idx(history, max_tokens - fixed);
                if start > 0 {
                    debug!("dropped {} old messages to fit {} tokens", start, max_tokens);
                }
                &history[start..]
            }
            None => history,
        };
        self.prompt.format_messages_with(&input_vars, &[(HISTORY_KEY, history)])
    }

    pub async fn chat(&self, session_id: &str, input: &str) -> Result<String> {
        let history = self.store.get_session_history(session_id);
        let snapshot = history.lock().messages().to_vec();
        let messages = self.build_messages(&snapshot, input)?;
        let reply = self.model.invoke(&messages).await?;
        let mut history = history.lock();
        history.add_user_message(input);
        history.add_ai_message(reply.as_str());
        Ok(reply)
    }
}

#[async_trait]
impl Runnable<SessionInput, String> for ConversationChain {
    async fn invoke(&self, input: SessionInput) -> Result<String> {
        self.chat(&input.session_id, &input.input).await
    }
}
