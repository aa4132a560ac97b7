use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use parking_lot::Mutex;

use crate::memory::{ConversationSummaryMemory, MemoryError, WindowMemory};
use crate::utils::llm::{ChatModel, Message};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryStrategy {
    Summary,
    Window,
}

impl fmt::Display for MemoryStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryStrategy::Summary => f.write_str("summary"),
            MemoryStrategy::Window => f.write_str("window"),
        }
    }
}

enum SessionMemory {
    Summary(Arc<ConversationSummaryMemory>),
    Window(Arc<Mutex<WindowMemory<Message>>>),
}

impl SessionMemory {
    fn strategy(&self) -> MemoryStrategy {
        match self {
            SessionMemory::Summary(_) => MemoryStrategy::Summary,
            SessionMemory::Window(_) => MemoryStrategy::Window,
        }
    }
}

/// Sessions that each use their own memory strategy.
///
/// The strategy is fixed when a session is first requested.
pub struct CustomMemoryStore {
    model: Arc<dyn ChatModel>,
    sessions: Mutex<HashMap<String, SessionMemory>>,
}

impl CustomMemoryStore {
    /// `model` writes the summaries of summary sessions.
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model, sessions: Mutex::new(HashMap::new()) }
    }

    pub fn get_summary_session(&self, session_id: &str) -> Result<Arc<ConversationSummaryMemory>, MemoryError> {
        let mut sessions = self.sessions.lock();
        let session = sessions
            .entry(session_id.to_string())
            .or_insert_with(|| SessionMemory::Summary(Arc::new(ConversationSummaryMemory::new(self.model.clone()))));
        match session {
            SessionMemory::Summary(memory) => Ok(memory.clone()),
            other => Err(mismatch(session_id, other.strategy(), MemoryStrategy::Summary)),
        }
    }

    /// A window session of size `k`. `k` only matters when the session is created.
    pub fn get_window_session(&self, session_id: &str, k: usize) -> Result<Arc<Mutex<WindowMemory<Message>>>, MemoryError> {
        let mut sessions = self.sessions.lock();
        let session = sessions
            .entry(session_id.to_string())
            .or_insert_with(|| SessionMemory::Window(Arc::new(Mutex::new(WindowMemory::new(k)))));
        match session {
            SessionMemory::Window(memory) => Ok(memory.clone()),
            other => Err(mismatch(session_id, other.strategy(), MemoryStrategy::Window)),
        }
    }

    pub fn strategy_of(&self, session_id: &str) -> Option<MemoryStrategy> {
        self.sessions.lock().get(session_id).map(SessionMemory::strategy)
    }
}

fn mismatch(session_id: &str, existing: MemoryStrategy, requested: MemoryStrategy) -> MemoryError {
    MemoryError::StrategyMismatch { session_id: session_id.to_string(), existing, requested }
}
