//! # Chains
//!
//! A chain is any [Runnable]: something async that maps an input to an output. Steps compose with
//! [RunnableExt::pipe], run side by side with [Parallel], recover with [WithFallbacks] and branch with [Router].
//!
//! The workhorse is [LlmChain], i.e. prompt template, then chat model, then output parser:
//!
//! ```no_run
//! # async fn demo() -> anyhow::Result<()> {
//! use std::sync::Arc;
//! use llm_workshop::chain::{LlmChain, Runnable};
//! use llm_workshop::prompt::{vars, PromptTemplate};
//! use llm_workshop::utils::llm::demo::DemoChat;
//!
//! let chain = LlmChain::new(PromptTemplate::new("Explain {{topic}} briefly"), Arc::new(DemoChat::default()));
//! let reply: String = chain.invoke(vars([("topic", "quantum computing")])).await?;
//! # Ok(())
//! # }
//! ```

pub mod runnable;
pub mod parallel;
pub mod fallback;
pub mod routing;
pub mod llm;
pub mod history;

pub use fallback::WithFallbacks;
pub use history::{ConversationChain, SessionInput};
pub use llm::{LlmChain, Prompt};
pub use parallel::Parallel;
pub use routing::{route_by_length, route_by_type, Router};
pub use runnable::{Each, Lambda, Passthrough, Pipe, Runnable, RunnableExt, RunnableStream};
