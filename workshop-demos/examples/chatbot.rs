use std::sync::Arc;
use anyhow::Result;
use llm_workshop::config::ModelKind;
use llm_workshop::exemplars::WorkshopAssistant;
use llm_workshop::server::{self, DEFAULT_ADDR};
use llm_workshop::utils::embedding::HashEmbedding;
use llm_workshop::utils::sentinel::Milestone;
use workshop_demos::{complete, init_with_status};

#[tokio::main]
async fn main() -> Result<()> {
    let config = init_with_status()?;
    let model = config.model_or_demo(ModelKind::Default, 0.7)?;
    let assistant = WorkshopAssistant::new(model, Arc::new(HashEmbedding::default())).await?;
    complete(&config, Milestone::ChatbotReady)?;

    println!("🚀 Starting LangChain AI Assistant on http://{}", DEFAULT_ADDR);
    server::serve(Arc::new(assistant), DEFAULT_ADDR.parse()?).await
}
