//! # Application Samples
//!
//! * [WorkshopAssistant](assistant::WorkshopAssistant): RAG over the workshop [knowledge base](knowledge_base)
//!   or plain conversation with memory. Served over HTTP by `server` with the `web` feature.

pub mod knowledge_base;
pub mod assistant;

pub use assistant::WorkshopAssistant;
