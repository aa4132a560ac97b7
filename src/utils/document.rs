use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::utils::JsonMap;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentError {
    #[error("document text must not be empty")]
    EmptyContent,
}

/// A piece of text plus a flat metadata record, e.g. `{"source": "intro", "category": "framework"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub page_content: String,
    #[serde(default)]
    pub metadata: JsonMap,
}

impl Document {
    pub fn new(page_content: impl Into<String>) -> Result<Self, DocumentError> {
        Self::with_metadata(page_content, JsonMap::new())
    }

    pub fn with_metadata(page_content: impl Into<String>, metadata: JsonMap) -> Result<Self, DocumentError> {
        let page_content = page_content.into();
        if page_content.trim().is_empty() {
            return Err(DocumentError::EmptyContent);
        }
        Ok(Self { page_content, metadata })
    }

    /// Set one metadata entry.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// A metadata entry as a string, if it is one.
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }

    /// True if every entry of `filter` is present in the metadata with an equal value.
    pub fn matches(&self, filter: &JsonMap) -> bool {
        filter.iter().all(|(key, value)| self.metadata.get(key) == Some(value))
    }
}
