//! # Conversation memory
//!
//! * [WindowMemory]: keeps only the last `k` items.
//! * [ChatMessageHistory] and [SessionStore]: full history per session id.
//! * [ConversationSummaryMemory]: history plus a running summary written by a model.
//! * [CustomMemoryStore]: picks a strategy per session.

pub mod window;
pub mod history;
pub mod summary;
pub mod store;

pub use history::{ChatMessageHistory, SessionStore, SharedHistory};
pub use store::{CustomMemoryStore, MemoryStrategy};
pub use summary::ConversationSummaryMemory;
pub use window::WindowMemory;

#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    #[error("session {session_id} uses {existing} memory, not {requested} memory")]
    StrategyMismatch {
        session_id: String,
        existing: MemoryStrategy,
        requested: MemoryStrategy,
    },
}
