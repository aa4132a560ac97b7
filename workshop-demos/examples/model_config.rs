use anyhow::Result;
use llm_workshop::config::ModelKind;
use llm_workshop::utils::llm::Message;
use llm_workshop::utils::printing::print_stream;
use llm_workshop::utils::sentinel::Milestone;
use workshop_demos::{complete, init};

#[tokio::main]
async fn main() -> Result<()> {
    let config = init()?;

    println!("=== Temperature Effects ===");
    let creative = config.model_or_demo(ModelKind::Default, 0.9)?;
    let precise = config.model_or_demo(ModelKind::Default, 0.0)?;
    let prompt = "Write a short poem about coding";
    println!("Creative (temp=0.9): {}", creative.invoke_prompt(prompt).await?);
    println!("Precise (temp=0): {}", precise.invoke_prompt(prompt).await?);

    println!("\n=== Max Tokens Control ===");
    let limited = precise.with_max_tokens(50);
    println!("Limited tokens: {}", limited.invoke_prompt("Explain machine learning").await?);

    println!("\n=== Streaming Response ===");
    println!("Streaming response:");
    let stream = precise.stream(&[Message::human("What are the benefits of Python?")]).await?;
    print_stream(stream).await?;

    complete(&config, Milestone::ModelConfig)
}
