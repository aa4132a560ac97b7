use anyhow::Result;
use llm_workshop::utils::document::Document;
use llm_workshop::utils::sentinel::Milestone;
use llm_workshop::utils::text_splitter::RecursiveCharacterTextSplitter;
use workshop_demos::{complete, init, preview};

const SAMPLE_DOCS: [&str; 5] = [
    "LangChain is a framework for developing applications powered by language models. It enables applications that are data-aware and agentic, allowing language models to connect with other sources of data and interact with their environment.",
    "The LangChain Expression Language (LCEL) is a declarative way to compose chains. LCEL was designed from day 1 to support putting prototypes in production, with no code changes, from the simplest 'prompt + LLM' chain to the most complex chains.",
    "Retrieval-Augmented Generation (RAG) is a technique that combines retrieval of relevant documents with generation of responses. This allows language models to access external knowledge beyond their training data.",
    "Vector stores are databases optimized for storing and searching high-dimensional vectors. In the context of RAG, they store embeddings of documents that can be efficiently searched for semantic similarity.",
    "Prompt templates are a powerful way to create reusable prompts for language models. They allow you to parameterize prompts and create structured inputs for consistent model behavior.",
];

const LARGE_DOC: &str = r#"
LangChain is a framework for developing applications powered by language models. It enables applications that are data-aware and agentic, allowing language models to connect with other sources of data and interact with their environment.

The main value props of LangChain are:
1. Components: abstractions for working with language models
2. Off-the-shelf chains: a structured assembly of components for accomplishing specific higher-level tasks

Off-the-shelf chains make it easy to get started. For more complex applications and nuanced use-cases, components make it easy to customize existing chains or build new ones.

The LangChain Expression Language (LCEL) is a declarative way to compose chains. LCEL was designed from day 1 to support putting prototypes in production, with no code changes, from the simplest "prompt + LLM" chain to the most complex chains.

LCEL has a number of benefits:
- Streaming support
- Async support
- Optimized parallel execution
- Retries and fallbacks
- Access to intermediate results
- Input and output schemas
"#;

const SAMPLE_CODE: &str = r#"
def calculate_fibonacci(n):
    if n <= 1:
        return n
    return calculate_fibonacci(n-1) + calculate_fibonacci(n-2)

def main():
    result = calculate_fibonacci(10)
    print(f"Fibonacci(10) = {result}")

if __name__ == "__main__":
    main()
"#;

const SAMPLE_MARKDOWN: &str = r#"
# LangChain Tutorial

## Installation
To install LangChain, use pip:
```bash
pip install langchain
```

## Basic Usage
Here's a simple example:
```python
from langchain.llms import OpenAI
llm = OpenAI()
```

## Advanced Features
LangChain supports many advanced features like chains and agents.
"#;

fn main() -> Result<()> {
    let config = init()?;

    println!("=== Document Loading and Chunking ===");
    let documents = SAMPLE_DOCS.iter()
        .enumerate()
        .map(|(idx, content)| -> Result<Document> {
            Ok(Document::new(*content)?.with("source", format!("doc_{}", idx)).with("type", "educational"))
        })
        .collect::<Result<Vec<_>>>()?;
    println!("Created {} documents", documents.len());
    for (idx, doc) in documents.iter().enumerate() {
        println!("Doc {}: {}", idx, preview(&doc.page_content, 100));
    }

    println!("\n=== Text Splitting ===");
    let splitter = RecursiveCharacterTextSplitter::new(200, 50)?;
    let chunks = splitter.split_text(LARGE_DOC);
    println!("Split into {} chunks:", chunks.len());
    for (idx, chunk) in chunks.iter().enumerate() {
        println!("\nChunk {} ({} chars):", idx + 1, chunk.chars().count());
        println!("{}", chunk);
    }

    let chunk_documents = splitter.chunk_documents(LARGE_DOC, "langchain_overview");
    println!("\n=== Document Objects Created ===");
    println!("Total chunk documents: {}", chunk_documents.len());

    println!("\n=== Best Practices ===");
    println!("1. Code-specific splitter:");
    let code_splitter = RecursiveCharacterTextSplitter::new(100, 20)?;
    println!("Code split into {} chunks", code_splitter.split_text(SAMPLE_CODE).len());

    println!("\n2. Markdown-aware splitter:");
    let markdown_splitter = RecursiveCharacterTextSplitter::new(150, 30)?
        .with_separators(&["## ", "# ", "\n\n", "\n", " ", ""]);
    println!("Markdown split into {} chunks", markdown_splitter.split_text(SAMPLE_MARKDOWN).len());

    complete(&config, Milestone::DocumentLoader)
}
