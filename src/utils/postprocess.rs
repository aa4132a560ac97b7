//! Turning model replies into values.

pub mod json;
pub mod structured;

use anyhow::Result;

/// The last step of a chain: parse the text a model replied with.
pub trait OutputParser<O>: Send + Sync {
    fn parse(&self, text: &str) -> Result<O>;

    /// For parsers that can work on a streamed reply: the conversion applied to every chunk.
    fn chunk_parser(&self) -> Option<fn(String) -> O> {
        None
    }
}

/// Keeps the reply text as is.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrOutputParser;

impl OutputParser<String> for StrOutputParser {
    fn parse(&self, text: &str) -> Result<String> {
        Ok(text.to_string())
    }

    fn chunk_parser(&self) -> Option<fn(String) -> String> {
        Some(|chunk| chunk)
    }
}
