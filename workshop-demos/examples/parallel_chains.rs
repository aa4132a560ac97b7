use anyhow::Result;
use llm_workshop::chain::{LlmChain, Parallel, Runnable};
use llm_workshop::config::ModelKind;
use llm_workshop::prompt::{vars, PromptTemplate, Vars};
use llm_workshop::utils::sentinel::Milestone;
use workshop_demos::{complete, init};

#[tokio::main]
async fn main() -> Result<()> {
    let config = init()?;
    let model = config.model_or_demo(ModelKind::Default, 0.7)?;
    let chain = |template: &str| LlmChain::new(PromptTemplate::new(template), model.clone());

    println!("=== Parallel Execution ===");
    let parallel: Parallel<Vars, String> = Parallel::new()
        .branch("joke", chain("Tell a joke about {{topic}}"))
        .branch("fact", chain("Share an interesting fact about {{topic}}"))
        .branch("poem", chain("Write a short poem about {{topic}}"));
    let results = parallel.invoke(vars([("topic", "programming")])).await?;
    println!("Joke: {}", results["joke"]);
    println!("Fact: {}", results["fact"]);
    println!("Poem: {}", results["poem"]);

    println!("\n=== Analysis Pipeline ===");
    let analysis: Parallel<Vars, String> = Parallel::new()
        .branch("sentiment", chain("Analyze the sentiment of: {{text}}"))
        .branch("summary", chain("Summarize in one sentence: {{text}}"))
        .branch("keywords", chain("Extract 3 keywords from: {{text}}"));
    let text = "I love working with Python! It makes programming so enjoyable and productive.";
    let results = analysis.invoke(vars([("text", text)])).await?;
    println!("Text: {}", text);
    println!("Sentiment: {}", results["sentiment"]);
    println!("Summary: {}", results["summary"]);
    println!("Keywords: {}", results["keywords"]);

    complete(&config, Milestone::ParallelChains)
}
