use std::sync::Arc;
use anyhow::Result;
use futures::StreamExt;
use llm_workshop::chain::{Lambda, LlmChain, Runnable, RunnableExt, WithFallbacks};
use llm_workshop::config::ModelKind;
use llm_workshop::prompt::{vars, PromptTemplate, Vars};
use llm_workshop::utils::llm::ChatModel;
use llm_workshop::utils::sentinel::Milestone;
use workshop_demos::{complete, init, preview};

const BACKUP_MODEL: &str = "deepseek/deepseek-chat";

#[tokio::main]
async fn main() -> Result<()> {
    let config = init()?;
    let model = config.model_or_demo(ModelKind::Default, 0.0)?;
    let prompt = PromptTemplate::new("Explain {{topic}} briefly");
    let chain = LlmChain::new(prompt.clone(), model.clone());

    println!("=== Streaming ===");
    let mut chunks = chain.stream_text(&vars([("topic", "quantum computing")])).await?;
    while let Some(chunk) = chunks.next().await {
        print!("{}", chunk?);
    }
    println!("\n");

    println!("=== Batch Processing ===");
    let topics: Vec<Vars> = ["machine learning", "blockchain", "cloud computing"]
        .into_iter()
        .map(|topic| vars([("topic", topic)]))
        .collect();
    let results: Vec<String> = chain.batch(topics.clone()).await?;
    for (idx, result) in results.iter().enumerate() {
        println!("Topic {}: {}", idx + 1, preview(result, 100));
    }

    println!("\n=== Async Processing ===");
    let result = tokio::spawn(async move {
        let answer: Result<String> = chain.invoke(vars([("topic", "artificial intelligence")])).await;
        answer
    }).await??;
    println!("Async result: {}", preview(&result, 100));

    println!("\n=== Fallback Chains ===");
    let backup: Arc<dyn ChatModel> = match config.get_model(ModelKind::Default, 0.0)? {
        Some(primary) => Arc::new(primary.bind(|c| c.model = BACKUP_MODEL.to_string())),
        None => model.clone(),
    };
    let fallback_chain: WithFallbacks<Vars, String> = LlmChain::new(prompt.clone(), model.clone())
        .with_fallbacks(vec![LlmChain::new(prompt.clone(), backup).shared()]);
    let result: String = fallback_chain.invoke(vars([("topic", "neural networks")])).await?;
    println!("Fallback result: {}", preview(&result, 100));

    println!("\n=== Bind Parameters ===");
    let bound_chain = LlmChain::new(prompt, model).with_max_tokens(50);
    let bound: String = bound_chain.invoke(vars([("topic", "deep learning")])).await?;
    println!("Bound result: {}", bound);

    println!("\n=== Map Processing ===");
    let process_topic = Lambda::new(|input: Vars| format!("Learning about: {}", input.get("topic").cloned().unwrap_or_default()));
    for result in process_topic.each().invoke(topics).await? {
        println!("{}", result);
    }

    complete(&config, Milestone::AdvancedLcel)
}
