use std::sync::Arc;
use anyhow::Result;
use serde_json::Value;
use llm_workshop::config::ModelKind;
use llm_workshop::utils::document::Document;
use llm_workshop::utils::embedding::HashEmbedding;
use llm_workshop::utils::retrievers::{RetrievalQa, SearchType, VectorStoreRetriever};
use llm_workshop::utils::sentinel::Milestone;
use llm_workshop::utils::vec_stores::InMemoryVectorStore;
use llm_workshop::utils::JsonMap;
use workshop_demos::{complete, init, preview};

const KNOWLEDGE: [(&str, &str, &str); 10] = [
    ("LangChain is a framework for developing applications powered by language models. It enables applications that are data-aware and agentic.",
     "langchain_intro", "framework"),
    ("LCEL (LangChain Expression Language) is a declarative way to compose chains. It supports streaming, async, parallel execution, and fallbacks.",
     "lcel_guide", "syntax"),
    ("Retrieval-Augmented Generation (RAG) combines information retrieval with text generation. It allows LLMs to access external knowledge.",
     "rag_explained", "technique"),
    ("Vector stores are databases optimized for storing and searching high-dimensional vectors. They enable semantic similarity search.",
     "vector_stores", "storage"),
    ("Prompt templates allow you to create reusable, parameterized prompts. They support variables, conditional logic, and output formatting.",
     "prompt_templates", "prompts"),
    ("Memory systems in LangChain include conversation buffer memory, summary memory, and entity memory for maintaining context.",
     "memory_systems", "memory"),
    ("LangChain agents can use tools to interact with external APIs, databases, and other systems. They support ReAct and plan-and-execute patterns.",
     "agents_guide", "agents"),
    ("Document loaders in LangChain support various formats including PDF, CSV, HTML, and text files. They can also load from URLs and databases.",
     "document_loaders", "ingestion"),
    ("Text splitters break large documents into chunks. RecursiveCharacterTextSplitter is most common, but specialized splitters exist for code and markdown.",
     "text_splitters", "preprocessing"),
    ("Output parsers structure LLM responses into specific formats like JSON, lists, or custom objects using Pydantic models.",
     "output_parsers", "parsing"),
];

const QUESTIONS: [&str; 8] = [
    "What is LCEL and how does it work?",
    "Explain Retrieval-Augmented Generation",
    "What are the benefits of using vector stores?",
    "How do memory systems work in LangChain?",
    "What types of document loaders are available?",
    "How can I create reusable prompts?",
    "What is the difference between a chain and an agent?",
    "How do I split large documents for processing?",
];

#[tokio::main]
async fn main() -> Result<()> {
    let config = init()?;
    let model = config.model_or_demo(ModelKind::Default, 0.0)?;

    println!("=== Creating Knowledge Base ===");
    let documents = KNOWLEDGE.iter()
        .map(|(content, source, topic)| -> Result<Document> {
            Ok(Document::new(*content)?.with("source", *source).with("topic", *topic))
        })
        .collect::<Result<Vec<_>>>()?;
    let store = Arc::new(InMemoryVectorStore::from_documents(documents, Arc::new(HashEmbedding::default())).await?);
    println!("Knowledge base created with {} documents", store.len());

    let retriever = VectorStoreRetriever::new(store.clone()).with_k(3);

    println!("\n=== Testing Retrieval ===");
    let test_query = "What is LCEL?";
    let retrieved = retriever.get_relevant_documents(test_query).await?;
    println!("Query: {}", test_query);
    println!("Retrieved {} documents:", retrieved.len());
    for (idx, doc) in retrieved.iter().enumerate() {
        println!("{}. {}", idx + 1, doc.page_content);
    }

    println!("\n=== Creating RetrievalQA Chain ===");
    let qa = RetrievalQa::new(retriever, model);

    println!("\n=== Testing RAG System ===");
    for question in QUESTIONS {
        println!("\nQ: {}", question);
        let result = qa.query(question).await?;
        println!("A: {}", result.result);
        if !result.source_documents.is_empty() {
            println!("Sources:");
            for (idx, doc) in result.source_documents.iter().enumerate() {
                let source = doc.metadata_str("source").unwrap_or("unknown");
                let topic = doc.metadata_str("topic").unwrap_or("general");
                println!("  {}. {} ({})", idx + 1, source, topic);
            }
        }
    }

    println!("\n=== Advanced Retrieval Strategies ===");
    let mmr_retriever = VectorStoreRetriever::new(store.clone())
        .with_search_type(SearchType::mmr(5))
        .with_k(3);
    println!("MMR Retrieval for 'LangChain components':");
    for (idx, doc) in mmr_retriever.get_relevant_documents("LangChain components").await?.iter().enumerate() {
        println!("{}. {}", idx + 1, preview(&doc.page_content, 100));
    }

    let threshold_retriever = VectorStoreRetriever::new(store.clone())
        .with_search_type(SearchType::SimilarityScoreThreshold(0.7));
    println!("\nThreshold Retrieval for 'machine learning':");
    let threshold_docs = threshold_retriever.get_relevant_documents("machine learning").await?;
    println!("Found {} documents above threshold", threshold_docs.len());

    let mut filter = JsonMap::new();
    filter.insert("topic".to_string(), Value::from("memory"));
    let filter_retriever = VectorStoreRetriever::new(store).with_k(3).with_filter(filter);
    println!("\nFiltered Retrieval for memory-related content:");
    for doc in filter_retriever.get_relevant_documents("conversation context").await? {
        println!("- {}", doc.page_content);
    }

    complete(&config, Milestone::RetrievalChain)
}
