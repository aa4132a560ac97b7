//! What the workshop assistant knows about.

use serde_json::json;

use crate::utils::document::Document;
use crate::utils::JsonMap;

/// `(source, topic, text)` of every knowledge base entry.
pub const KNOWLEDGE: [(&str, &str, &str); 8] = [
    ("langchain_intro", "framework",
     "LangChain is a framework for developing applications powered by language models. It enables applications \
     that are data-aware and agentic, allowing language models to connect with other sources of data and interact \
     with their environment."),
    ("lcel_guide", "syntax",
     "LCEL (LangChain Expression Language) is a declarative way to compose chains. LCEL was designed from day 1 to \
     support putting prototypes in production, with no code changes, from the simplest prompt + LLM chain to the \
     most complex chains. It supports streaming, async, parallel execution, retries and fallbacks."),
    ("rag_explained", "technique",
     "Retrieval-Augmented Generation (RAG) is a technique that combines retrieval of relevant documents with \
     generation of responses. This allows language models to access external knowledge beyond their training data, \
     making them more accurate and up-to-date."),
    ("vector_stores", "storage",
     "Vector stores are databases optimized for storing and searching high-dimensional vectors. In the context of \
     RAG, they store embeddings of documents that can be efficiently searched for semantic similarity. Popular \
     vector stores include FAISS, Pinecone, and Chroma."),
    ("prompt_templates", "prompts",
     "Prompt templates are a powerful way to create reusable prompts for language models. They allow you to \
     parameterize prompts and create structured inputs for consistent model behavior. LangChain supports basic \
     templates, chat templates, and few-shot templates."),
    ("memory_systems", "memory",
     "Memory systems in LangChain allow chatbots to maintain conversation context. Types include \
     ConversationBufferMemory for storing all messages, ConversationSummaryMemory for summarizing old messages, \
     and ConversationBufferWindowMemory for keeping only recent messages."),
    ("agents_guide", "agents",
     "LangChain agents are systems that can use tools to interact with external systems and APIs. They can reason \
     about which tools to use and in what order. Common agent types include ReAct agents and plan-and-execute \
     agents."),
    ("document_loaders", "ingestion",
     "Document loaders in LangChain support ingesting text from various sources including PDF files, CSV files, \
     HTML pages, and plain text files. They can also load content from URLs, databases, and APIs. Each loader is \
     optimized for its specific format."),
];

pub const SAMPLE_QUESTIONS: [&str; 8] = [
    "What is LCEL and how does it work?",
    "Explain Retrieval-Augmented Generation",
    "How do I create prompt templates?",
    "What are the different types of memory in LangChain?",
    "How do vector stores work?",
    "What's the difference between chains and agents?",
    "How can I load documents from different sources?",
    "Tell me about LangChain's main components",
];

pub const ASSISTANT_RAG_PROMPT: &str = "You are a helpful LangChain expert. Use the following context to answer \
the question accurately. If you cannot answer based on the context, use your general knowledge but mention that \
the information is not from the provided context.

Context:
{{context}}

Question: {{question}}

Answer:";

pub const ASSISTANT_SYSTEM_PROMPT: &str = "You are a helpful LangChain expert assistant. Be conversational and helpful.";

/// The knowledge base as documents with `source` and `topic` metadata.
pub fn knowledge_documents() -> Vec<Document> {
    KNOWLEDGE.iter()
        .map(|(source, topic, text)| {
            let mut metadata = JsonMap::new();
            metadata.insert("source".to_string(), json!(source));
            metadata.insert("topic".to_string(), json!(topic));
            Document { page_content: text.to_string(), metadata }
        })
        .collect()
}
