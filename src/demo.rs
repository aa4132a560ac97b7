//! # Demo mode
//!
//! When no API is configured, or a call fails, the workshop answers with canned text picked by a
//! simple keyword match on the prompt.

use log::{error, warn};
use crate::config::ModelKind;
use crate::utils::llm::ChatModel;

pub const HELLO_RESPONSE: &str = "Hello! I'm a demo response. To get real AI responses, configure your .env file with LiteLLM credentials.";
pub const MATH_RESPONSE: &str = "I can help with math! For example, 2+2=4. Configure your .env file to get real AI calculations.";
pub const CODE_RESPONSE: &str = r#"def example_function():
    """This is a demo code response."""
    return "Configure your .env file for real AI-generated code!"

# Real AI models will provide much better responses!"#;
pub const CREATIVE_RESPONSE: &str = "This is a demo creative response! Real AI models can write stories, poems, and much more creative content when you configure your .env file.";
pub const DEFAULT_RESPONSE: &str = "This is a demo response. Configure your .env file with your LiteLLM credentials to get real AI responses!";

const HELLO_KEYWORDS: [&str; 3] = ["hello", "hi", "greet"];
const MATH_KEYWORDS: [&str; 6] = ["math", "calculate", "+", "-", "*", "/"];
const CODE_KEYWORDS: [&str; 4] = ["code", "function", "python", "program"];
const CREATIVE_KEYWORDS: [&str; 4] = ["story", "poem", "creative", "write"];

/// Canned answer for `prompt`. Keyword classes are checked in order and the first hit wins.
///
/// `_kind` is accepted so callers can say which model they meant to use; the canned text does not depend on it.
pub fn demo_response(prompt: &str, _kind: ModelKind) -> &'static str {
    let prompt_lower = prompt.to_lowercase();
    let contains_any = |words: &[&str]| words.iter().any(|word| prompt_lower.contains(word));
    if contains_any(&HELLO_KEYWORDS) {
        HELLO_RESPONSE
    } else if contains_any(&MATH_KEYWORDS) {
        MATH_RESPONSE
    } else if contains_any(&CODE_KEYWORDS) {
        CODE_RESPONSE
    } else if contains_any(&CREATIVE_KEYWORDS) {
        CREATIVE_RESPONSE
    } else {
        DEFAULT_RESPONSE
    }
}

/// Invoke `model` with `prompt`, falling back to [demo_response] when there is no model or the call fails.
pub async fn safe_invoke(model: Option<&dyn ChatModel>, prompt: &str, kind: ModelKind) -> String {
    let Some(model) = model else {
        return demo_response(prompt, kind).to_string();
    };
    match model.invoke_prompt(prompt).await {
        Ok(content) => content,
        Err(e) => {
            error!("API Error: {:#}", e);
            warn!("Falling back to demo mode");
            demo_response(prompt, kind).to_string()
        }
    }
}

#[cfg(test)]
mod test_demo {
    use super::*;
    use crate::utils::llm::testing::{EchoChat, FailingChat};

    #[test]
    fn test_keyword_classes() {
        assert_eq!(HELLO_RESPONSE, demo_response("Hello there", ModelKind::Default));
        assert_eq!(MATH_RESPONSE, demo_response("What is 2+2", ModelKind::Default));
        assert_eq!(MATH_RESPONSE, demo_response("CALCULATE the area", ModelKind::Fast));
        assert_eq!(CODE_RESPONSE, demo_response("a python function", ModelKind::Coding));
        assert_eq!(CREATIVE_RESPONSE, demo_response("a poem about rust", ModelKind::Creative));
        assert_eq!(DEFAULT_RESPONSE, demo_response("Capital of France?", ModelKind::Default));
    }

    #[test]
    fn test_every_keyword() {
        let cases = [
            (HELLO_RESPONSE, "greet the team"),
            (MATH_RESPONSE, "10 - 3"),
            (MATH_RESPONSE, "6 * 7"),
            (MATH_RESPONSE, "8 / 2"),
            (MATH_RESPONSE, "some math please"),
            (CODE_RESPONSE, "define a function"),
            (CODE_RESPONSE, "my program crashes"),
            (CODE_RESPONSE, "review my code"),
            (CREATIVE_RESPONSE, "tell me a story"),
            (CREATIVE_RESPONSE, "write an essay"),
            (CREATIVE_RESPONSE, "be creative"),
        ];
        for (expected, prompt) in cases {
            assert_eq!(expected, demo_response(prompt, ModelKind::Default), "prompt: {}", prompt);
        }
    }

    #[test]
    fn test_first_class_wins() {
        // "hello" beats the math operator
        assert_eq!(HELLO_RESPONSE, demo_response("Hello! What's 2+2?", ModelKind::Default));
        // matching is by substring, so "this" hits "hi"
        assert_eq!(HELLO_RESPONSE, demo_response("Is this a story?", ModelKind::Default));
    }

    #[tokio::test]
    async fn test_safe_invoke() {
        assert_eq!(MATH_RESPONSE, safe_invoke(None, "1 + 1", ModelKind::Default).await);
        assert_eq!(DEFAULT_RESPONSE, safe_invoke(Some(&FailingChat), "Capital of France?", ModelKind::Default).await);
        let echo = EchoChat::default();
        assert_eq!("echo: ping", safe_invoke(Some(&echo), "ping", ModelKind::Default).await);
    }
}
