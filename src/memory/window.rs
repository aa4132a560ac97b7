use std::collections::VecDeque;

use crate::utils::llm::Message;

/// Keeps the last `k` items, evicting the oldest first.
#[derive(Debug, Clone)]
pub struct WindowMemory<T = Message> {
    k: usize,
    items: VecDeque<T>,
}

impl<T> WindowMemory<T> {
    /// A window of size `k`. With `k == 0` nothing is ever kept.
    pub fn new(k: usize) -> Self {
        Self { k, items: VecDeque::with_capacity(k) }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// Append `item`, then drop from the front until at most `k` items remain.
    pub fn add_message(&mut self, item: T) {
        self.items.push_back(item);
        while self.items.len() > self.k {
            self.items.pop_front();
        }
    }

    pub fn messages(&self) -> impl Iterator<Item=&T> + '_ {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl WindowMemory<Message> {
    /// Add one human/AI exchange, i.e. two messages.
    pub fn add_exchange(&mut self, human: impl Into<String>, ai: impl Into<String>) {
        self.add_message(Message::human(human));
        self.add_message(Message::ai(ai));
    }

    pub fn to_vec(&self) -> Vec<Message> {
        self.items.iter().cloned().collect()
    }
}

impl Default for WindowMemory<Message> {
    fn default() -> Self {
        Self::new(4)
    }
}
