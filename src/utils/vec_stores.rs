//! In-memory vector index with exact nearest-neighbour search.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use anyhow::Result;
use log::{debug, info};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::document::Document;
use crate::utils::embedding::{cosine_similarity, l2_distance, AsyncEmbed, EmbedVec};
use crate::utils::JsonMap;

pub type Vector = EmbedVec;

pub const INDEX_FILE: &str = "index.json";
pub const DEFAULT_FETCH_K: usize = 20;
pub const DEFAULT_LAMBDA_MULT: f32 = 0.5;

#[derive(Debug, thiserror::Error)]
pub enum VectorStoreError {
    #[error("embedding has {got} dimensions, but the store holds {expected}-dimensional vectors")]
    DimensionMismatch { expected: usize, got: usize },
    #[error("embedder returned {got} vectors for {expected} documents")]
    CountMismatch { expected: usize, got: usize },
    #[error("no index found at {0}")]
    MissingIndex(PathBuf),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Entry {
    id: String,
    document: Document,
    vector: Vector,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Index {
    dimension: Option<usize>,
    entries: Vec<Entry>,
}

/// Documents with their embeddings, searched by brute force.
pub struct InMemoryVectorStore {
    embedder: Arc<dyn AsyncEmbed>,
    index: RwLock<Index>,
}

impl InMemoryVectorStore {
    pub fn new(embedder: Arc<dyn AsyncEmbed>) -> Self {
        Self { embedder, index: RwLock::new(Index::default()) }
    }

    /// Embed `documents` and build a store holding them.
    pub async fn from_documents(documents: Vec<Document>, embedder: Arc<dyn AsyncEmbed>) -> Result<Self> {
        let store = Self::new(embedder);
        store.add_documents(documents).await?;
        Ok(store)
    }

    pub fn embedder(&self) -> Arc<dyn AsyncEmbed> {
        self.embedder.clone()
    }

    pub fn len(&self) -> usize {
        self.index.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Embed and add documents. Returns their new ids.
    pub async fn add_documents(&self, documents: Vec<Document>) -> Result<Vec<String>> {
        let texts: Vec<String> = documents.iter().map(|d| d.page_content.clone()).collect();
        let vectors = self.embedder.embed_documents(&texts).await?;
        if vectors.len() != documents.len() {
            return Err(VectorStoreError::CountMismatch { expected: documents.len(), got: vectors.len() }.into());
        }

        let mut index = self.index.write();
        let expected = index.dimension.or_else(|| vectors.first().map(Vec::len));
        if let Some(expected) = expected {
            if let Some(bad) = vectors.iter().find(|v| v.len() != expected) {
                return Err(VectorStoreError::DimensionMismatch { expected, got: bad.len() }.into());
            }
        }
        index.dimension = expected;
        let ids: Vec<String> = documents.into_iter()
            .zip(vectors)
            .map(|(document, vector)| {
                let id = Uuid::new_v4().to_string();
                index.entries.push(Entry { id: id.clone(), document, vector });
                id
            })
            .collect();
        debug!("added {} documents, the store now holds {}", ids.len(), index.entries.len());
        Ok(ids)
    }

    async fn embed_query(&self, query: &str) -> Result<Vector> {
        let vector = self.embedder.embed_query(query).await?;
        if let Some(expected) = self.index.read().dimension {
            if vector.len() != expected {
                return Err(VectorStoreError::DimensionMismatch { expected, got: vector.len() }.into());
            }
        }
        Ok(vector)
    }

    /// Entries passing `filter` with their L2 distance to `query`, closest first.
    fn nearest(&self, query: &[f32], k: usize, filter: Option<&JsonMap>) -> Vec<(Entry, f32)> {
        let index = self.index.read();
        let mut scored: Vec<(&Entry, f32)> = index.entries.iter()
            .filter(|e| filter.map_or(true, |f| e.document.matches(f)))
            .map(|e| (e, l2_distance(query, &e.vector)))
            .collect();
        scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        scored.into_iter()
            .take(k)
            .map(|(e, score)| (e.clone(), score))
            .collect()
    }

    pub async fn similarity_search(&self, query: &str, k: usize, filter: Option<&JsonMap>) -> Result<Vec<Document>> {
        Ok(self.similarity_search_with_score(query, k, filter).await?
            .into_iter()
            .map(|(document, _)| document)
            .collect())
    }

    /// The `k` closest documents with their L2 distance. Lower is closer.
    pub async fn similarity_search_with_score(&self, query: &str, k: usize, filter: Option<&JsonMap>) -> Result<Vec<(Document, f32)>> {
        let query = self.embed_query(query).await?;
        Ok(self.nearest(&query, k, filter)
            .into_iter()
            .map(|(entry, score)| (entry.document, score))
            .collect())
    }

    /// Like [InMemoryVectorStore::similarity_search_with_score], with the distance turned into a relevance in
    /// `[0, 1]` via `1 - d / √2`. Higher is closer.
    pub async fn similarity_search_with_relevance_scores(&self, query: &str, k: usize, filter: Option<&JsonMap>) -> Result<Vec<(Document, f32)>> {
        Ok(self.similarity_search_with_score(query, k, filter).await?
            .into_iter()
            .map(|(document, distance)| (document, relevance_score(distance)))
            .collect())
    }

    /// Pick `k` of the `fetch_k` closest documents, trading relevance for diversity.
    ///
    /// `lambda_mult` of 1 means pure relevance, 0 means maximal diversity.
    pub async fn max_marginal_relevance_search(&self,
                                               query: &str,
                                               k: usize,
                                               fetch_k: usize,
                                               lambda_mult: f32,
                                               filter: Option<&JsonMap>) -> Result<Vec<Document>> {
        let query = self.embed_query(query).await?;
        let candidates = self.nearest(&query, fetch_k.max(k), filter);
        let vectors: Vec<&[f32]> = candidates.iter().map(|(e, _)| e.vector.as_slice()).collect();
        Ok(maximal_marginal_relevance(&query, &vectors, k, lambda_mult)
            .into_iter()
            .map(|idx| candidates[idx].0.document.clone())
            .collect())
    }

    /// Write the store to `dir/index.json`, creating `dir` if needed.
    pub fn save_local(&self, dir: impl AsRef<Path>) -> Result<(), VectorStoreError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let index = self.index.read();
        let json = serde_json::to_string(&*index)?;
        fs::write(dir.join(INDEX_FILE), json)?;
        info!("saved {} documents to {}", index.entries.len(), dir.display());
        Ok(())
    }

    /// Read a store written by [InMemoryVectorStore::save_local]. Queries will be embedded with `embedder`.
    pub fn load_local(dir: impl AsRef<Path>, embedder: Arc<dyn AsyncEmbed>) -> Result<Self, VectorStoreError> {
        let path = dir.as_ref().join(INDEX_FILE);
        if !path.exists() {
            return Err(VectorStoreError::MissingIndex(path));
        }
        let index: Index = serde_json::from_str(&fs::read_to_string(&path)?)?;
        if let Some(expected) = index.dimension {
            if let Some(bad) = index.entries.iter().find(|e| e.vector.len() != expected) {
                return Err(VectorStoreError::DimensionMismatch { expected, got: bad.vector.len() });
            }
        }
        Ok(Self { embedder, index: RwLock::new(index) })
    }
}

/// Relevance in `[0, 1]` for the L2 distance of unit vectors.
pub fn relevance_score(distance: f32) -> f32 {
    1.0 - distance / std::f32::consts::SQRT_2
}

/// Indices of `k` vectors picked greedily: each step takes the candidate maximizing
/// `lambda_mult * sim(query) - (1 - lambda_mult) * max sim(already picked)`.
pub fn maximal_marginal_relevance(query: &[f32], candidates: &[&[f32]], k: usize, lambda_mult: f32) -> Vec<usize> {
    let k = k.min(candidates.len());
    let query_similarity: Vec<f32> = candidates.iter().map(|c| cosine_similarity(query, c)).collect();
    let mut selected: Vec<usize> = Vec::with_capacity(k);
    while selected.len() < k {
        let best = (0..candidates.len())
            .filter(|idx| !selected.contains(idx))
            .map(|idx| {
                let redundancy = selected.iter()
                    .map(|&s| cosine_similarity(candidates[idx], candidates[s]))
                    .fold(f32::NEG_INFINITY, f32::max);
                let redundancy = if selected.is_empty() { 0.0 } else { redundancy };
                (idx, lambda_mult * query_similarity[idx] - (1.0 - lambda_mult) * redundancy)
            })
            .max_by(|a, b| a.1.total_cmp(&b.1).then(b.0.cmp(&a.0)));
        match best {
            Some((idx, _)) => selected.push(idx),
            None => break,
        }
    }
    selected
}

#[cfg(test)]
mod test_vec_stores {
    use serde_json::json;
    use super::*;
    use crate::utils::embedding::{GetEmbedDim, HashEmbedding};

    fn docs() -> Vec<Document> {
        [
            ("LangChain is a framework for developing applications powered by language models.", "intro", "framework"),
            ("LCEL is a declarative way to compose chains.", "lcel", "syntax"),
            ("Vector stores enable semantic search by storing document embeddings.", "vectors", "storage"),
            ("Prompt templates help create consistent and reusable prompts for language models.", "prompts", "templates"),
            ("Memory systems allow chatbots to maintain conversation context.", "memory", "conversation"),
        ].into_iter()
            .map(|(text, source, category)| Document::new(text).unwrap().with("source", source).with("category", category))
            .collect()
    }

    async fn store() -> InMemoryVectorStore {
        InMemoryVectorStore::from_documents(docs(), Arc::new(HashEmbedding::default())).await.unwrap()
    }

    #[tokio::test]
    async fn test_similarity_search() {
        let store = store().await;
        assert_eq!(5, store.len());
        let results = store.similarity_search_with_score("Vector stores enable semantic search by storing document embeddings.", 3, None).await.unwrap();
        assert_eq!(3, results.len());
        assert_eq!(Some("vectors"), results[0].0.metadata_str("source"));
        assert!(results[0].1 < 1e-5);
        assert!(results.windows(2).all(|w| w[0].1 <= w[1].1));

        let relevance = store.similarity_search_with_relevance_scores("Vector stores enable semantic search by storing document embeddings.", 1, None).await.unwrap();
        assert!((relevance[0].1 - 1.0).abs() < 1e-5);
        assert_eq!(5, store.similarity_search("anything", 10, None).await.unwrap().len());
    }

    #[tokio::test]
    async fn test_filter() {
        let store = store().await;
        let mut filter = JsonMap::new();
        filter.insert("category".to_string(), json!("framework"));
        let results = store.similarity_search("framework", 5, Some(&filter)).await.unwrap();
        assert_eq!(1, results.len());
        assert_eq!(Some("intro"), results[0].metadata_str("source"));
    }

    #[tokio::test]
    async fn test_add_documents() {
        let store = store().await;
        let ids = store.add_documents(vec![
            Document::new("Text splitters break large documents into manageable chunks.").unwrap(),
        ]).await.unwrap();
        assert_eq!(1, ids.len());
        assert_eq!(6, store.len());
        let results = store.similarity_search("Text splitters break large documents", 1, None).await.unwrap();
        assert!(results[0].page_content.starts_with("Text splitters"));
    }

    #[tokio::test]
    async fn test_dimension_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        store().await.save_local(dir.path()).unwrap();
        let narrow = InMemoryVectorStore::load_local(dir.path(), Arc::new(HashEmbedding::new(16))).unwrap();
        let err = narrow.similarity_search("x", 1, None).await.unwrap_err();
        assert_eq!("embedding has 16 dimensions, but the store holds 384-dimensional vectors", err.to_string());
        let err = narrow.add_documents(vec![Document::new("x").unwrap()]).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<VectorStoreError>(), Some(VectorStoreError::DimensionMismatch { expected: 384, got: 16 })));
        assert_eq!(5, narrow.len());
    }

    #[tokio::test]
    async fn test_mmr_prefers_diversity() {
        let embedder = Arc::new(HashEmbedding::default());
        let store = InMemoryVectorStore::from_documents(vec![
            Document::new("rust async runtime tokio").unwrap(),
            Document::new("rust async runtime tokio executor").unwrap(),
            Document::new("rust borrow checker lifetimes").unwrap(),
        ], embedder.clone()).await.unwrap();
        assert_eq!(Some(384), embedder.embedding_dim());

        let similar = store.similarity_search("rust async runtime tokio", 2, None).await.unwrap();
        assert!(similar[1].page_content.contains("executor"));
        let diverse = store.max_marginal_relevance_search("rust async runtime tokio", 2, DEFAULT_FETCH_K, 0.3, None).await.unwrap();
        assert_eq!("rust async runtime tokio", diverse[0].page_content);
        assert_eq!("rust borrow checker lifetimes", diverse[1].page_content);
    }

    #[test]
    fn test_mmr_edge_cases() {
        let query = [1.0, 0.0];
        assert!(maximal_marginal_relevance(&query, &[], 3, 0.5).is_empty());
        let a: &[f32] = &[1.0, 0.0];
        let b: &[f32] = &[0.0, 1.0];
        assert_eq!(vec![0, 1], maximal_marginal_relevance(&query, &[a, b], 5, 1.0));
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = store().await;
        store.save_local(dir.path().join("faiss_index")).unwrap();

        let loaded = InMemoryVectorStore::load_local(dir.path().join("faiss_index"), store.embedder()).unwrap();
        assert_eq!(store.len(), loaded.len());
        let query = "How do I create prompts for language models?";
        let before = store.similarity_search(query, 3, None).await.unwrap();
        let after = loaded.similarity_search(query, 3, None).await.unwrap();
        assert_eq!(before, after);

        let missing = InMemoryVectorStore::load_local(dir.path().join("nope"), store.embedder());
        assert!(matches!(missing, Err(VectorStoreError::MissingIndex(_))));
    }
}
