use std::collections::HashMap;
use std::sync::Arc;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::utils::llm::Message;

/// All messages of a conversation in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatMessageHistory {
    messages: Vec<Message>,
}

impl ChatMessageHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn add_user_message(&mut self, content: impl Into<String>) {
        self.add_message(Message::human(content));
    }

    pub fn add_ai_message(&mut self, content: impl Into<String>) {
        self.add_message(Message::ai(content));
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

pub type SharedHistory = Arc<Mutex<ChatMessageHistory>>;

/// Histories by session id, created on first use.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<String, SharedHistory>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The history of `session_id`. Every call for the same id returns a handle to the same history.
    pub fn get_session_history(&self, session_id: &str) -> SharedHistory {
        self.sessions
            .lock()
            .entry(session_id.to_string())
            .or_default()
            .clone()
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions.lock().contains_key(session_id)
    }

    /// Sorted ids of all sessions.
    pub fn session_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.sessions.lock().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Forget a session. Returns whether it existed.
    pub fn remove(&self, session_id: &str) -> bool {
        self.sessions.lock().remove(session_id).is_some()
    }
}

#[cfg(test)]
mod test_history {
    use super::*;
    use crate::utils::llm::Role;

    #[test]
    fn test_history_keeps_order_and_duplicates() {
        let mut history = ChatMessageHistory::new();
        history.add_user_message("hi");
        history.add_ai_message("hello");
        history.add_user_message("hi");
        let roles: Vec<Role> = history.messages().iter().map(|m| m.role).collect();
        assert_eq!(vec![Role::Human, Role::Ai, Role::Human], roles);
        assert_eq!(3, history.len());
        history.clear();
        assert!(history.is_empty());
    }

    #[test]
    fn test_sessions_are_shared_and_separate() {
        let store = SessionStore::new();
        store.get_session_history("user123").lock().add_user_message("Hi, my name is Alice");
        assert_eq!(1, store.get_session_history("user123").lock().len());
        assert!(store.get_session_history("user456").lock().is_empty());
        assert_eq!(vec!["user123".to_string(), "user456".to_string()], store.session_ids());

        let cloned = store.clone();
        assert!(cloned.contains("user123"));
        assert!(cloned.remove("user123"));
        assert!(!store.contains("user123"));
    }
}
