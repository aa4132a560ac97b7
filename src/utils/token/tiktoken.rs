use std::collections::HashMap;
use anyhow::{bail, Result};
pub use tiktoken_rs::{cl100k_base, get_bpe_from_model, CoreBPE};
use log::warn;

use crate::utils::llm::Message;
use crate::utils::token::CountToken;
use lazy_static::lazy_static;

const TOKENS_PER_MESSAGE: usize = 3;
const FALLBACK_MAX_TOKENS: usize = 8192;

lazy_static! {
    /// const map from model family to context size. Longer prefixes are listed first.
    pub static ref MODEL_TO_MAX_TOKENS: Vec<(&'static str, usize)> = vec![
        ("gpt-4-32k", 32768),
        ("gpt-4o", 128000),
        ("gpt-4-turbo", 128000),
        ("gpt-4.1", 1047576),
        ("gpt-4", 8192),
        ("gpt-3.5-turbo-16k", 16384),
        ("gpt-3.5-turbo", 4096),
    ];
    static ref MODEL_TO_BASE_MODEL: HashMap<&'static str, &'static str> = HashMap::from([
        ("gpt-4-32k", "gpt-4"),
        ("gpt-4-turbo", "gpt-4"),
        ("gpt-4.1", "gpt-4"),
        ("gpt-3.5-turbo-16k", "gpt-3.5-turbo"),
    ]);
}

/// Drop a `provider/` routing prefix such as `openai/gpt-4`.
fn bare_model_name(model: &str) -> &str {
    model.rsplit('/').next().unwrap_or(model)
}

fn model_family(model: &str) -> Option<(&'static str, usize)> {
    MODEL_TO_MAX_TOKENS.iter()
        .find(|(prefix, _)| model.starts_with(prefix))
        .copied()
}

/// Counter using the Tiktoken tokenizer.
#[derive(Clone)]
#[readonly::make]
pub struct Tiktoken {
    /// The model name of the tokenizer. read-only.
    #[readonly]
    pub model: String,
    /// Context size of the model. read-only.
    #[readonly]
    pub max_tokens: usize,
    /// The tokenizer. read-only.
    #[readonly]
    pub bpe: CoreBPE,
}

impl Tiktoken {
    /// Create a new Tiktoken counter. Unknown models fall back to `cl100k_base` with an 8192 token context.
    pub fn new(model: impl Into<String>) -> Result<Self> {
        let model = model.into();
        let bare = bare_model_name(&model);
        let (bpe, max_tokens) = match model_family(bare) {
            Some((family, max_tokens)) => {
                let base = MODEL_TO_BASE_MODEL.get(family).copied().unwrap_or(family);
                (get_bpe_from_model(base)?, max_tokens)
            }
            None => {
                warn!("model {} is not known to the tokenizer, falling back to cl100k_base", model);
                (cl100k_base()?, FALLBACK_MAX_TOKENS)
            }
        };
        Ok(Tiktoken { model, max_tokens, bpe })
    }

    /// Count the number of tokens in a chat message, including the per-message overhead.
    pub fn count_msg_token(&self, msg: &Message) -> usize {
        self.count_token(&msg.content) + self.count_token(msg.role.as_str()) + TOKENS_PER_MESSAGE
    }

    /// Drop the oldest messages until the rest fits in the context of the model.
    ///
    /// When `system_message` is given it is always kept at the front.
    pub fn truncate_messages(&self, messages: &[Message], system_message: Option<Message>) -> Result<Vec<Message>> {
        self.truncate_messages_to(messages, system_message, self.max_tokens)
    }

    /// Like [Tiktoken::truncate_messages], with an explicit token budget.
    pub fn truncate_messages_to(&self,
                                messages: &[Message],
                                system_message: Option<Message>,
                                max_tokens: usize) -> Result<Vec<Message>> {
        let Some(sys_prompt) = system_message else {
            let truncate_start_idx = self.get_truncate_start_idx(messages, max_tokens);
            return Ok(messages[truncate_start_idx..].to_vec());
        };
        let sys_prompt_token_count = self.count_msg_token(&sys_prompt);
        if sys_prompt_token_count > max_tokens {
            bail!("system message token count {} is greater than max tokens {}", sys_prompt_token_count, max_tokens);
        }
        let rest = match messages.first() {
            Some(first) if *first == sys_prompt => &messages[1..],
            _ => messages,
        };
        let truncate_start_idx = self.get_truncate_start_idx(rest, max_tokens - sys_prompt_token_count);
        let mut new_messages = Vec::with_capacity(rest.len() - truncate_start_idx + 1);
        new_messages.push(sys_prompt);
        new_messages.extend_from_slice(&rest[truncate_start_idx..]);
        Ok(new_messages)
    }

    pub(crate) fn get_truncate_start_idx(&self, messages: &[Message], max_tokens: usize) -> usize {
        let mut token_count = 0;
        for (idx, msg) in messages.iter().enumerate().rev() {
            let message_token_count = self.count_msg_token(msg);
            if token_count + message_token_count > max_tokens {
                return idx + 1;
            }
            token_count += message_token_count;
        }
        0
    }
}

impl CountToken for Tiktoken {
    fn count_token(&self, string: &str) -> usize {
        self.bpe.encode_with_special_tokens(string).len()
    }
}
