//! Retrieval over an [InMemoryVectorStore], and question answering on top of it.

use std::sync::Arc;
use anyhow::Result;
use async_trait::async_trait;
use log::debug;

use crate::chain::Runnable;
use crate::prompt::{vars, PromptTemplate};
use crate::utils::document::Document;
use crate::utils::llm::ChatModel;
use crate::utils::vec_stores::{InMemoryVectorStore, DEFAULT_LAMBDA_MULT};
use crate::utils::JsonMap;

pub const DEFAULT_K: usize = 4;
pub const UNKNOWN_SOURCE: &str = "unknown";

pub const RAG_PROMPT: &str = "Use the following context to answer the question. \
If you cannot answer based on the context, say \"I don't have enough information in the provided context.\"

Context:
{{context}}

Question: {{question}}

Answer:";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SearchType {
    Similarity,
    /// Maximal marginal relevance over the `fetch_k` closest documents.
    Mmr { fetch_k: usize, lambda_mult: f32 },
    /// Only documents whose relevance score is at least the threshold.
    SimilarityScoreThreshold(f32),
}

impl SearchType {
    pub fn mmr(fetch_k: usize) -> Self {
        SearchType::Mmr { fetch_k, lambda_mult: DEFAULT_LAMBDA_MULT }
    }
}

impl Default for SearchType {
    fn default() -> Self {
        SearchType::Similarity
    }
}

#[derive(Clone)]
pub struct VectorStoreRetriever {
    store: Arc<InMemoryVectorStore>,
    pub search_type: SearchType,
    pub k: usize,
    pub filter: Option<JsonMap>,
}

impl VectorStoreRetriever {
    pub fn new(store: Arc<InMemoryVectorStore>) -> Self {
        Self { store, search_type: SearchType::default(), k: DEFAULT_K, filter: None }
    }

    pub fn with_search_type(mut self, search_type: SearchType) -> Self {
        self.search_type = search_type;
        self
    }

    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    pub fn with_filter(mut self, filter: JsonMap) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn store(&self) -> &Arc<InMemoryVectorStore> {
        &self.store
    }

    pub async fn get_relevant_documents(&self, query: &str) -> Result<Vec<Document>> {
        let filter = self.filter.as_ref();
        let docs = match self.search_type {
            SearchType::Similarity => self.store.similarity_search(query, self.k, filter).await?,
            SearchType::Mmr { fetch_k, lambda_mult } => {
                self.store.max_marginal_relevance_search(query, self.k, fetch_k, lambda_mult, filter).await?
            }
            SearchType::SimilarityScoreThreshold(threshold) => {
                self.store.similarity_search_with_relevance_scores(query, self.k, filter).await?
                    .into_iter()
                    .filter(|(_, score)| *score >= threshold)
                    .map(|(doc, _)| doc)
                    .collect()
            }
        };
        debug!("retrieved {} documents for {:?}", docs.len(), query);
        Ok(docs)
    }
}

#[async_trait]
impl Runnable<String, Vec<Document>> for VectorStoreRetriever {
    async fn invoke(&self, query: String) -> Result<Vec<Document>> {
        self.get_relevant_documents(&query).await
    }
}

/// Page contents separated by blank lines.
pub fn format_docs(docs: &[Document]) -> String {
    docs.iter()
        .map(|d| d.page_content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[derive(Debug, Clone, PartialEq)]
pub struct QaResult {
    pub result: String,
    pub source_documents: Vec<Document>,
}

impl QaResult {
    /// `source` metadata of the sources, without repeats, in order of first appearance. Documents without one
    /// count as [UNKNOWN_SOURCE].
    pub fn sources(&self) -> Vec<&str> {
        let mut sources: Vec<&str> = Vec::new();
        for source in self.source_documents.iter().map(|d| d.metadata_str("source").unwrap_or(UNKNOWN_SOURCE)) {
            if !sources.contains(&source) {
                sources.push(source);
            }
        }
        sources
    }
}

/// Retrieve, stuff the documents into [RAG_PROMPT], ask the model.
pub struct RetrievalQa {
    retriever: VectorStoreRetriever,
    model: Arc<dyn ChatModel>,
    prompt: PromptTemplate,
}

impl RetrievalQa {
    pub fn new(retriever: VectorStoreRetriever, model: Arc<dyn ChatModel>) -> Self {
        Self { retriever, model, prompt: PromptTemplate::new(RAG_PROMPT) }
    }

    /// Use a prompt of your own. It must have `{{context}}` and `{{question}}` placeholders.
    pub fn with_prompt(mut self, prompt: PromptTemplate) -> Result<Self> {
        prompt.validate(&["context", "question"])?;
        self.prompt = prompt;
        Ok(self)
    }

    pub fn retriever(&self) -> &VectorStoreRetriever {
        &self.retriever
    }

    pub async fn query(&self, question: &str) -> Result<QaResult> {
        let source_documents = self.retriever.get_relevant_documents(question).await?;
        let context = format_docs(&source_documents);
        let prompt = self.prompt.format(&vars([("context", context.as_str()), ("question", question)]))?;
        let result = self.model.invoke_prompt(&prompt).await?;
        Ok(QaResult { result, source_documents })
    }
}

#[async_trait]
impl Runnable<String, QaResult> for RetrievalQa {
    async fn invoke(&self, question: String) -> Result<QaResult> {
        self.query(&question).await
    }
}
