//! Chat prompt templates: an ordered list of role-tagged templates plus slots for whole message histories.

use std::str::FromStr;
use anyhow::{anyhow, Result};

use crate::prompt::{PromptTemplate, Vars};
use crate::utils::llm::{Message, Role};

/// One part of a [ChatPromptTemplate].
#[derive(Debug, Clone)]
pub enum ChatPart {
    /// A single message whose content is a template.
    Message(Role, PromptTemplate),
    /// Slot for a list of messages supplied at format time, e.g. the chat history.
    Placeholder(String),
}

#[derive(Debug, Clone, Default)]
pub struct ChatPromptTemplate {
    pub parts: Vec<ChatPart>,
}

impl ChatPromptTemplate {
    /// Build from `(role, template)` pairs. Roles are `system`, `human`/`user` or `ai`/`assistant`.
    pub fn from_messages(messages: &[(&str, &str)]) -> Result<Self> {
        let parts = messages.iter()
            .map(|(role, template)| -> Result<ChatPart> {
                Ok(ChatPart::Message(Role::from_str(role)?, PromptTemplate::new(*template)))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { parts })
    }

    pub fn message(mut self, role: Role, template: impl Into<String>) -> Self {
        self.parts.push(ChatPart::Message(role, PromptTemplate::new(template)));
        self
    }

    /// Append a slot named `name` that [ChatPromptTemplate::format_messages_with] fills with messages.
    pub fn placeholder(mut self, name: impl Into<String>) -> Self {
        self.parts.push(ChatPart::Placeholder(name.into()));
        self
    }

    /// All template variables of all message parts, sorted and deduplicated.
    pub fn input_variables(&self) -> Vec<String> {
        let mut variables: Vec<String> = self.parts.iter()
            .filter_map(|part| match part {
                ChatPart::Message(_, template) => Some(template.input_variables()),
                ChatPart::Placeholder(_) => None,
            })
            .flatten()
            .collect();
        variables.sort();
        variables.dedup();
        variables
    }

    /// Format every message part. Fails if the template has a history slot.
    pub fn format_messages(&self, vars: &Vars) -> Result<Vec<Message>> {
        self.format_messages_with(vars, &[])
    }

    /// Format every message part and splice in the message lists for the history slots.
    pub fn format_messages_with(&self, vars: &Vars, histories: &[(&str, &[Message])]) -> Result<Vec<Message>> {
        let mut messages = Vec::with_capacity(self.parts.len());
        for part in &self.parts {
            match part {
                ChatPart::Message(role, template) => {
                    messages.push(Message::new(*role, template.format(vars)?));
                }
                ChatPart::Placeholder(name) => {
                    let (_, history) = histories.iter()
                        .find(|(slot, _)| slot == name)
                        .ok_or_else(|| anyhow!("no messages given for placeholder {}", name))?;
                    messages.extend_from_slice(history);
                }
            }
        }
        Ok(messages)
    }
}

#[cfg(test)]
mod test_chat_prompt {
    use super::*;
    use crate::prompt::vars;

    fn expert_template() -> ChatPromptTemplate {
        ChatPromptTemplate::from_messages(&[
            ("system", "You are a {{role}} expert with {{years}} years of experience."),
            ("human", "Explain {{concept}} to me in simple terms."),
            ("assistant", "I'll explain {{concept}} step by step."),
        ]).unwrap()
    }

    #[test]
    fn test_format_messages() {
        let messages = expert_template()
            .format_messages(&vars([("role", "Python programming"), ("years", "10"), ("concept", "decorators")]))
            .unwrap();
        let printed: Vec<String> = messages.iter()
            .map(|m| format!("{}: {}", m.role.as_str().to_uppercase(), m.content))
            .collect();
        assert_eq!(vec![
            "SYSTEM: You are a Python programming expert with 10 years of experience.",
            "HUMAN: Explain decorators to me in simple terms.",
            "AI: I'll explain decorators step by step.",
        ], printed);
    }

    #[test]
    fn test_input_variables_and_missing() {
        let template = expert_template();
        assert_eq!(vec!["concept", "role", "years"], template.input_variables());
        assert!(template.format_messages(&vars([("role", "x")])).is_err());
        assert!(ChatPromptTemplate::from_messages(&[("narrator", "hi")]).is_err());
    }

    #[test]
    fn test_history_placeholder() {
        let template = ChatPromptTemplate::default()
            .message(Role::System, "You are a helpful assistant.")
            .placeholder("history")
            .message(Role::Human, "{{input}}");
        let history = vec![Message::human("My name is Alice"), Message::ai("Hi Alice!")];
        let messages = template
            .format_messages_with(&vars([("input", "What's my name?")]), &[("history", &history)])
            .unwrap();
        assert_eq!(4, messages.len());
        assert_eq!(history[..], messages[1..3]);
        assert_eq!(Message::human("What's my name?"), messages[3]);
        assert!(template.format_messages(&vars([("input", "x")])).is_err());
    }
}
