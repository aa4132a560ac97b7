use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use anyhow::{bail, Result};
use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::CreateEmbeddingRequestArgs;
use async_trait::async_trait;
use url::Url;

/// Vector of floats representing an embedding.
pub type EmbedVec = Vec<f32>;

/// Dimensions of the offline [HashEmbedding], the same as `all-MiniLM-L6-v2`.
pub const DEFAULT_DIMENSIONS: usize = 384;

/// Trait for getting the embedding dimension.
pub trait GetEmbedDim {
    fn embedding_dim(&self) -> Option<usize>;
}

/// Embeds text synchronously.
pub trait Embed: GetEmbedDim + Send + Sync {
    fn embed_query(&self, text: &str) -> Result<EmbedVec>;

    fn embed_documents(&self, texts: &[String]) -> Result<Vec<EmbedVec>> {
        texts.iter().map(|t| self.embed_query(t)).collect()
    }
}

/// Async version of [Embed], for remote embedding models.
#[async_trait]
pub trait AsyncEmbed: GetEmbedDim + Send + Sync {
    async fn embed_query(&self, text: &str) -> Result<EmbedVec>;

    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<EmbedVec>>;
}

/// Blanket impl of AsyncEmbed for Embed trait.
#[async_trait]
impl<T: Embed> AsyncEmbed for T {
    async fn embed_query(&self, text: &str) -> Result<EmbedVec> {
        Embed::embed_query(self, text)
    }

    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<EmbedVec>> {
        Embed::embed_documents(self, texts)
    }
}

/// Deterministic offline embedding from hashed words and character trigrams.
///
/// Similar wording gives similar vectors; it knows nothing about meaning. Vectors are normalized to unit length.
#[derive(Debug, Clone, Copy)]
pub struct HashEmbedding {
    dimensions: usize,
}

impl HashEmbedding {
    pub const fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn hash_string(s: &str) -> u64 {
        let mut hasher = DefaultHasher::new();
        s.hash(&mut hasher);
        hasher.finish()
    }

    fn generate(&self, text: &str) -> EmbedVec {
        let mut embedding = vec![0.0f32; self.dimensions];
        let normalized: String = text.chars()
            .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { ' ' })
            .collect();

        for word in normalized.split_whitespace() {
            let hash = Self::hash_string(word);
            let idx = (hash % self.dimensions as u64) as usize;
            let sign = if (hash >> 32) & 1 == 0 { 1.0 } else { -1.0 };
            let magnitude = 1.0 + ((hash >> 16) & 0xFF) as f32 / 255.0;
            embedding[idx] += sign * magnitude;
        }

        let chars: Vec<char> = normalized.chars().collect();
        for window in chars.windows(3) {
            let trigram: String = window.iter().collect();
            let hash = Self::hash_string(&trigram);
            let idx = (hash % self.dimensions as u64) as usize;
            embedding[idx] += if (hash >> 32) & 1 == 0 { 0.5 } else { -0.5 };
        }

        let norm = l2_norm(&embedding);
        if norm > 0.0 {
            embedding.iter_mut().for_each(|x| *x /= norm);
        }
        embedding
    }
}

impl Default for HashEmbedding {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSIONS)
    }
}

impl GetEmbedDim for HashEmbedding {
    fn embedding_dim(&self) -> Option<usize> {
        Some(self.dimensions)
    }
}

impl Embed for HashEmbedding {
    fn embed_query(&self, text: &str) -> Result<EmbedVec> {
        if self.dimensions == 0 {
            bail!("embedding dimension must be positive");
        }
        Ok(self.generate(text))
    }
}

/// Embedding model from an OpenAI-compatible API.
#[derive(Clone, Debug)]
pub struct OpenAIEmbedding {
    pub client: Client<OpenAIConfig>,
    pub embedding_model: String,
}

impl OpenAIEmbedding {
    pub fn new(api_key: &str, api_base: &Url, embedding_model: impl Into<String>) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(api_base.as_str().trim_end_matches('/'));
        Self { client: Client::with_config(config), embedding_model: embedding_model.into() }
    }
}

impl GetEmbedDim for OpenAIEmbedding {
    fn embedding_dim(&self) -> Option<usize> {
        match self.embedding_model.rsplit('/').next().unwrap_or_default() {
            "text-embedding-ada-002" | "text-embedding-3-small" => Some(1536),
            "text-embedding-3-large" => Some(3072),
            _ => None,
        }
    }
}

#[async_trait]
impl AsyncEmbed for OpenAIEmbedding {
    async fn embed_query(&self, text: &str) -> Result<EmbedVec> {
        let mut embeddings = self.embed_documents(&[text.to_string()]).await?;
        match embeddings.pop() {
            Some(embedding) => Ok(embedding),
            None => bail!("embedding model {} returned no embedding", self.embedding_model),
        }
    }

    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<EmbedVec>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let request = CreateEmbeddingRequestArgs::default()
            .model(self.embedding_model.as_str())
            .input(texts.to_vec())
            .build()?;
        let mut response = self.client.embeddings().create(request).await?;
        if response.data.len() != texts.len() {
            bail!("asked for {} embeddings, got {}", texts.len(), response.data.len());
        }
        response.data.sort_by_key(|e| e.index);
        Ok(response.data.into_iter().map(|e| e.embedding).collect())
    }
}

pub fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Euclidean distance. Vectors of different length are compared on their common prefix.
pub fn l2_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum::<f32>().sqrt()
}

/// Cosine similarity in `[-1, 1]`, or 0 when either vector is zero or the lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norms = l2_norm(a) * l2_norm(b);
    if norms == 0.0 {
        0.0
    } else {
        dot / norms
    }
}

#[cfg(test)]
mod test_embedding {
    use super::*;

    #[test]
    fn test_hash_embedding() {
        let embedder = HashEmbedding::default();
        let a = Embed::embed_query(&embedder, "LangChain is a powerful framework").unwrap();
        assert_eq!(DEFAULT_DIMENSIONS, a.len());
        assert_eq!(a, Embed::embed_query(&embedder, "LangChain is a powerful framework").unwrap());
        assert!((l2_norm(&a) - 1.0).abs() < 1e-5);
        assert!(Embed::embed_query(&embedder, "").unwrap().iter().all(|&x| x == 0.0));
        assert!(Embed::embed_query(&HashEmbedding::new(0), "x").is_err());
    }

    #[test]
    fn test_similar_wording_is_closer() {
        let embedder = HashEmbedding::default();
        let base = Embed::embed_query(&embedder, "the quick brown fox").unwrap();
        let similar = Embed::embed_query(&embedder, "the quick brown dog").unwrap();
        let different = Embed::embed_query(&embedder, "completely unrelated text").unwrap();
        assert!(cosine_similarity(&base, &similar) > cosine_similarity(&base, &different));
        assert!(l2_distance(&base, &similar) < l2_distance(&base, &different));
    }

    #[tokio::test]
    async fn test_async_blanket_impl() {
        let embedder: &dyn AsyncEmbed = &HashEmbedding::default();
        let docs = embedder.embed_documents(&["a b".to_string(), "c d".to_string()]).await.unwrap();
        assert_eq!(2, docs.len());
        assert_eq!(docs[0], embedder.embed_query("a b").await.unwrap());
    }

    #[test]
    fn test_distances() {
        assert_eq!(0.0, cosine_similarity(&[1.0, 0.0], &[0.0, 0.0]));
        assert_eq!(0.0, cosine_similarity(&[1.0], &[1.0, 0.0]));
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!((l2_distance(&[0.0, 3.0], &[4.0, 0.0]) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_openai_dims() {
        let base = Url::parse("http://localhost:4000").unwrap();
        assert_eq!(Some(1536), OpenAIEmbedding::new("k", &base, "openai/text-embedding-3-small").embedding_dim());
        assert_eq!(None, OpenAIEmbedding::new("k", &base, "custom").embedding_dim());
    }
}
