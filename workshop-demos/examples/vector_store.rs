use std::sync::Arc;
use anyhow::Result;
use serde_json::Value;
use llm_workshop::utils::document::Document;
use llm_workshop::utils::embedding::{AsyncEmbed, Embed, HashEmbedding};
use llm_workshop::utils::sentinel::Milestone;
use llm_workshop::utils::vec_stores::{InMemoryVectorStore, DEFAULT_FETCH_K, DEFAULT_LAMBDA_MULT};
use llm_workshop::utils::JsonMap;
use workshop_demos::{complete, init};

const INDEX_DIR: &str = "faiss_index";

const DOCUMENTS: [(&str, &str, &str); 8] = [
    ("LangChain is a framework for developing applications powered by language models.", "intro", "framework"),
    ("LCEL (LangChain Expression Language) is a declarative way to compose chains.", "lcel", "syntax"),
    ("Retrieval-Augmented Generation combines retrieval with text generation.", "rag", "technique"),
    ("Vector stores enable semantic search by storing document embeddings.", "vectors", "storage"),
    ("Prompt templates help create consistent and reusable prompts for LLMs.", "prompts", "templates"),
    ("Memory systems allow chatbots to maintain conversation context.", "memory", "conversation"),
    ("Agents can use tools to interact with external systems and APIs.", "agents", "automation"),
    ("Document loaders help ingest text from various file formats and sources.", "loaders", "ingestion"),
];

const NEW_DOCUMENTS: [(&str, &str, &str); 2] = [
    ("Text splitters break large documents into manageable chunks.", "splitters", "preprocessing"),
    ("Output parsers structure the responses from language models.", "parsers", "postprocessing"),
];

fn to_documents(entries: &[(&str, &str, &str)]) -> Result<Vec<Document>> {
    entries.iter()
        .map(|(content, source, category)| -> Result<Document> {
            Ok(Document::new(*content)?.with("source", *source).with("category", *category))
        })
        .collect()
}

fn metadata_of(doc: &Document) -> String {
    Value::Object(doc.metadata.clone()).to_string()
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = init()?;

    println!("=== Initializing Embeddings ===");
    let embedding = HashEmbedding::default();
    let sample_text = "LangChain is a powerful framework for building AI applications";
    let sample_embedding = Embed::embed_query(&embedding, sample_text)?;
    println!("Sample text: {}", sample_text);
    println!("Embedding dimensions: {}", sample_embedding.len());
    println!("First 5 dimensions: {:?}", &sample_embedding[..5]);
    let embedder: Arc<dyn AsyncEmbed> = Arc::new(embedding);

    println!("\n=== Creating Vector Store ===");
    let documents = to_documents(&DOCUMENTS)?;
    println!("Processing {} documents...", documents.len());
    let store = InMemoryVectorStore::from_documents(documents, embedder.clone()).await?;
    println!("Vector store created successfully!");

    store.save_local(INDEX_DIR)?;
    println!("Vector store saved to '{}' directory", INDEX_DIR);
    let loaded = InMemoryVectorStore::load_local(INDEX_DIR, embedder)?;
    println!("Vector store loaded successfully! ({} documents)", loaded.len());

    println!("\n=== Similarity Search ===");
    let query = "How do I create prompts for language models?";
    let results = store.similarity_search(query, 3, None).await?;
    println!("Query: {}", query);
    println!("Found {} similar documents:\n", results.len());
    for (idx, doc) in results.iter().enumerate() {
        println!("Result {}:", idx + 1);
        println!("Content: {}", doc.page_content);
        println!("Metadata: {}\n", metadata_of(doc));
    }

    println!("=== Similarity Search with Scores ===");
    for (idx, (doc, score)) in store.similarity_search_with_score(query, 3, None).await?.iter().enumerate() {
        println!("Result {} (Score: {:.4}):", idx + 1, score);
        println!("Content: {}", doc.page_content);
        println!("Metadata: {}\n", metadata_of(doc));
    }

    println!("=== MMR Search (Diverse Results) ===");
    let mmr_results = store.max_marginal_relevance_search(query, 3, DEFAULT_FETCH_K, DEFAULT_LAMBDA_MULT, None).await?;
    println!("MMR Query: {}", query);
    for (idx, doc) in mmr_results.iter().enumerate() {
        println!("MMR Result {}: {}", idx + 1, doc.page_content);
    }

    println!("\n=== Filtered Search ===");
    let mut filter = JsonMap::new();
    filter.insert("category".to_string(), Value::from("framework"));
    println!("Results filtered by category='framework':");
    for doc in store.similarity_search("framework", 5, Some(&filter)).await? {
        println!("- {}", doc.page_content);
    }

    println!("\n=== Adding New Documents ===");
    let ids = store.add_documents(to_documents(&NEW_DOCUMENTS)?).await?;
    println!("Added {} new documents to vector store", ids.len());
    println!("\nVerification search for 'text processing':");
    for doc in store.similarity_search("text processing", 2, None).await? {
        println!("- {}", doc.page_content);
    }

    complete(&config, Milestone::VectorStore)
}
