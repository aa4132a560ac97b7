//! # llm-workshop
//!
//! Hands-on building blocks for LLM applications: prompt templates, chains, conversation memory, document
//! splitting, vector search and retrieval-augmented generation, plus a small web chat UI.
//!
//! The demos in the `workshop-demos` member walk through them one topic at a time. Each one runs against an
//! OpenAI-compatible endpoint when `OPENAI_API_KEY` and `OPENAI_API_BASE` are set and `USE_REAL_API=true`, and
//! against canned demo responses otherwise.
//!
//! ## Concepts
//!
//! ### Prompt Template and Placeholder
//!
//! A template is text with named slots:
//!
//! ```text
//! You are a friendly and helpful assistant. Today is {{date}}.
//! ```
//!
//! `{{date}}` is a placeholder named `"date"`. Names can be anything without line breaks or braces.
//! [`PromptTemplate::format`](crate::prompt::PromptTemplate::format) fills every placeholder from a
//! [`Vars`](crate::prompt::Vars) map. [Chat templates](crate::prompt::chat) turn into role-tagged messages and
//! [few-shot templates](crate::prompt::few_shot) render worked examples before the question.
//!
//! ### Partial Prompt and Filler
//!
//! [`PromptTemplate::construct_prompt`](crate::prompt::PromptTemplate::construct_prompt) starts a
//! [`PartialPrompt`](crate::prompt::PartialPrompt) that records which placeholders are filled and with what.
//! Anything implementing [`FillPlaceholders`](crate::filler::FillPlaceholders) plus one of the `Fill*` traits is a
//! filler, e.g. the format instructions of a
//! [`StructuredOutputParser`](crate::utils::postprocess::structured::StructuredOutputParser).
//!
//! ### Models
//!
//! Everything talks to a model through [`ChatModel`](crate::utils::llm::ChatModel).
//! [`WorkshopConfig`](crate::config::WorkshopConfig) reads the environment and hands out a real model or the
//! offline [`DemoChat`](crate::utils::llm::demo::DemoChat).
//!
//! ### Chains and Memory
//!
//! [Chains](crate::chain) are [`Runnable`](crate::chain::Runnable)s composed with `pipe`, run in parallel, given
//! fallbacks or routed. [Memory](crate::memory) keeps conversations: full histories per session, sliding windows
//! and running summaries.
//!
//! ### Retrieval
//!
//! [Documents](crate::utils::document) are split with the
//! [recursive splitter](crate::utils::text_splitter), embedded, indexed in an
//! [`InMemoryVectorStore`](crate::utils::vec_stores::InMemoryVectorStore) and fetched by a
//! [`VectorStoreRetriever`](crate::utils::retrievers::VectorStoreRetriever) for
//! [`RetrievalQa`](crate::utils::retrievers::RetrievalQa).
//!
//! ## Attribution
//! * `async_openai`: [crate::utils::llm::openai::ConversationConfig] copies the shape of its chat request.
//! * `tiktoken-rs`: [crate::utils::token::tiktoken] re-exports the `tiktoken-rs` crate.

pub mod config;
pub mod demo;
pub mod prompt;
pub mod filler;
pub mod memory;
pub mod chain;
pub mod exemplars;
#[cfg(feature = "web")]
pub mod server;
pub mod utils;
