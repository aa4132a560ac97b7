pub mod document;
pub mod text_splitter;
pub mod embedding;
pub mod vec_stores;
pub mod retrievers;
pub mod token;
pub mod llm;
pub mod postprocess;
#[cfg(feature = "terminal_printing")]
pub mod printing;
pub mod sentinel;
pub(crate) mod prompt_processing;

use serde_json::{Map, Value};

pub type JsonMap = Map<String, Value>;
