//! Recursive character text splitting.
//!
//! Text is cut at the first separator in the list that occurs in it. Pieces that are still too long are cut again
//! with the remaining separators, and neighbouring small pieces are merged back into chunks of at most
//! `chunk_size` with about `chunk_overlap` of shared text between consecutive chunks. The separator is kept at
//! the start of the piece that follows it.

use log::warn;
use serde_json::Value;

use crate::utils::document::Document;
use crate::utils::token::{count_chars, CountToken};
use crate::utils::JsonMap;

pub const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SplitterError {
    #[error("chunk overlap ({overlap}) is larger than chunk size ({size})")]
    OverlapTooLarge { overlap: usize, size: usize },
    #[error("chunk size must be positive")]
    ZeroChunkSize,
}

#[derive(Debug, Clone)]
pub struct RecursiveCharacterTextSplitter<C = fn(&str) -> usize> {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
    length: C,
}

impl RecursiveCharacterTextSplitter {
    /// A splitter measuring length in characters, with the default separators.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, SplitterError> {
        Self::with_length_function(chunk_size, chunk_overlap, count_chars as fn(&str) -> usize)
    }
}

impl<C: CountToken> RecursiveCharacterTextSplitter<C> {
    /// A splitter measuring length with `length`, e.g. a token counter.
    pub fn with_length_function(chunk_size: usize, chunk_overlap: usize, length: C) -> Result<Self, SplitterError> {
        if chunk_size == 0 {
            return Err(SplitterError::ZeroChunkSize);
        }
        if chunk_overlap > chunk_size {
            return Err(SplitterError::OverlapTooLarge { overlap: chunk_overlap, size: chunk_size });
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
            length,
        })
    }

    pub fn with_separators(mut self, separators: &[&str]) -> Self {
        self.separators = separators.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &self.separators)
    }

    /// One document per chunk per text. The chunks of a text share its metadata.
    pub fn create_documents(&self, texts: &[&str], metadatas: Option<&[JsonMap]>) -> Vec<Document> {
        texts.iter()
            .enumerate()
            .flat_map(|(idx, text)| {
                let metadata = metadatas.and_then(|m| m.get(idx)).cloned().unwrap_or_default();
                self.split_text(text)
                    .into_iter()
                    .map(move |chunk| Document { page_content: chunk, metadata: metadata.clone() })
            })
            .collect()
    }

    pub fn split_documents(&self, documents: &[Document]) -> Vec<Document> {
        let texts: Vec<&str> = documents.iter().map(|d| d.page_content.as_str()).collect();
        let metadatas: Vec<JsonMap> = documents.iter().map(|d| d.metadata.clone()).collect();
        self.create_documents(&texts, Some(&metadatas))
    }

    /// Split `text` and tag each chunk with `source`, its index `chunk` and `total_chunks`.
    pub fn chunk_documents(&self, text: &str, source: &str) -> Vec<Document> {
        let chunks = self.split_text(text);
        let total_chunks = chunks.len();
        chunks.into_iter()
            .enumerate()
            .map(|(idx, chunk)| {
                let mut metadata = JsonMap::new();
                metadata.insert("source".to_string(), Value::from(source));
                metadata.insert("chunk".to_string(), Value::from(idx));
                metadata.insert("total_chunks".to_string(), Value::from(total_chunks));
                Document { page_content: chunk, metadata }
            })
            .collect()
    }

    fn len_of(&self, s: &str) -> usize {
        self.length.count_token(s)
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        let mut separator = separators.last().map(String::as_str).unwrap_or("");
        let mut remaining: &[String] = &[];
        for (idx, candidate) in separators.iter().enumerate() {
            if candidate.is_empty() {
                separator = "";
                break;
            }
            if text.contains(candidate.as_str()) {
                separator = candidate.as_str();
                remaining = &separators[idx + 1..];
                break;
            }
        }

        let mut chunks = Vec::new();
        let mut good_splits: Vec<&str> = Vec::new();
        for piece in split_keeping_separator(text, separator) {
            if self.len_of(piece) < self.chunk_size {
                good_splits.push(piece);
                continue;
            }
            if !good_splits.is_empty() {
                chunks.extend(self.merge_splits(&good_splits));
                good_splits.clear();
            }
            if remaining.is_empty() {
                chunks.push(piece.to_string());
            } else {
                chunks.extend(self.split_recursive(piece, remaining));
            }
        }
        if !good_splits.is_empty() {
            chunks.extend(self.merge_splits(&good_splits));
        }
        chunks
    }

    /// Greedily pack pieces into chunks, carrying up to `chunk_overlap` of the tail of each chunk into the next.
    fn merge_splits(&self, splits: &[&str]) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        let mut start = 0;
        let mut total = 0;
        for &piece in splits {
            let piece_len = self.len_of(piece);
            if total + piece_len > self.chunk_size && current.len() > start {
                if total > self.chunk_size {
                    warn!("created a chunk of size {}, which is longer than the specified {}", total, self.chunk_size);
                }
                if let Some(chunk) = join_chunk(&current[start..]) {
                    chunks.push(chunk);
                }
                while total > self.chunk_overlap || (total + piece_len > self.chunk_size && total > 0) {
                    total -= self.len_of(current[start]);
                    start += 1;
                }
            }
            current.push(piece);
            total += piece_len;
        }
        if let Some(chunk) = join_chunk(&current[start..]) {
            chunks.push(chunk);
        }
        chunks
    }
}

fn join_chunk(pieces: &[&str]) -> Option<String> {
    let chunk = pieces.concat();
    let chunk = chunk.trim();
    (!chunk.is_empty()).then(|| chunk.to_string())
}

/// Split `text` before every occurrence of `separator`, dropping empty pieces. An empty separator splits into
/// characters.
fn split_keeping_separator<'t>(text: &'t str, separator: &str) -> Vec<&'t str> {
    if separator.is_empty() {
        return text.char_indices()
            .map(|(idx, c)| &text[idx..idx + c.len_utf8()])
            .collect();
    }
    let mut pieces = Vec::new();
    let mut start = 0;
    for (idx, _) in text.match_indices(separator) {
        pieces.push(&text[start..idx]);
        start = idx;
    }
    pieces.push(&text[start..]);
    pieces.retain(|piece| !piece.is_empty());
    pieces
}

#[cfg(test)]
mod test_text_splitter {
    use super::*;
    use crate::utils::token::count_tokens_by_len;

    #[test]
    fn test_split_keeping_separator() {
        assert_eq!(vec!["a", "\n\nb", "\n\nc"], split_keeping_separator("a\n\nb\n\nc", "\n\n"));
        assert_eq!(vec!["\n\na"], split_keeping_separator("\n\na", "\n\n"));
        assert_eq!(vec!["h", "é"], split_keeping_separator("hé", ""));
    }

    #[test]
    fn test_invalid_settings() {
        assert_eq!(SplitterError::OverlapTooLarge { overlap: 20, size: 10 },
                   RecursiveCharacterTextSplitter::new(10, 20).unwrap_err());
        assert_eq!(SplitterError::ZeroChunkSize, RecursiveCharacterTextSplitter::new(0, 0).unwrap_err());
        assert!(RecursiveCharacterTextSplitter::new(10, 10).is_ok());
    }

    #[test]
    fn test_split_words_with_overlap() {
        let splitter = RecursiveCharacterTextSplitter::new(10, 5).unwrap();
        let chunks = splitter.split_text("foo bar baz 123");
        assert_eq!(vec!["foo bar", "bar baz", "baz 123"], chunks);
    }

    #[test]
    fn test_short_text_is_one_chunk() {
        let splitter = RecursiveCharacterTextSplitter::new(200, 50).unwrap();
        assert_eq!(vec!["Hello world."], splitter.split_text("  Hello world.  "));
        assert!(splitter.split_text("   \n\n  ").is_empty());
    }

    #[test]
    fn test_paragraphs_first() {
        let splitter = RecursiveCharacterTextSplitter::new(30, 0).unwrap();
        let text = "First paragraph here.\n\nSecond paragraph here.\n\nThird.";
        let chunks = splitter.split_text(text);
        assert_eq!(vec!["First paragraph here.", "Second paragraph here.", "Third."], chunks);
    }

    #[test]
    fn test_long_word_falls_back_to_characters() {
        let splitter = RecursiveCharacterTextSplitter::new(4, 0).unwrap();
        assert_eq!(vec!["abcd", "efgh", "ij"], splitter.split_text("abcdefghij"));
    }

    #[test]
    fn test_chunks_respect_size() {
        let splitter = RecursiveCharacterTextSplitter::new(50, 10).unwrap();
        let text = "LangChain is a framework for developing applications powered by language models. \
        It enables applications that are data-aware and agentic, allowing language models to connect with other \
        sources of data and interact with their environment.";
        let chunks = splitter.split_text(text);
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| count_chars(c) <= 50));
        assert!(chunks.iter().all(|c| c.trim() == c));
    }

    #[test]
    fn test_custom_separators_and_length() {
        let splitter = RecursiveCharacterTextSplitter::with_length_function(20, 0, count_tokens_by_len)
            .unwrap()
            .with_separators(&["## ", "\n", " ", ""]);
        let chunks = splitter.split_text("## Install\npip install x\n## Usage\nimport x");
        assert_eq!(vec!["## Install", "pip install x", "## Usage\nimport x"], chunks);
    }

    #[test]
    fn test_documents_keep_metadata() {
        let splitter = RecursiveCharacterTextSplitter::new(10, 0).unwrap();
        let source = Document::new("foo bar baz").unwrap().with("source", "doc_0");
        let chunks = splitter.split_documents(&[source]);
        assert_eq!(2, chunks.len());
        assert!(chunks.iter().all(|d| d.metadata_str("source") == Some("doc_0")));

        let tagged = splitter.chunk_documents("foo bar baz", "langchain_overview");
        assert_eq!(1, tagged[1].metadata["chunk"]);
        assert_eq!(2, tagged[0].metadata["total_chunks"]);
    }
}
