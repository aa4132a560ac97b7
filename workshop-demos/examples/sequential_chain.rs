use anyhow::Result;
use llm_workshop::chain::{Lambda, LlmChain, Parallel, Runnable, RunnableExt};
use llm_workshop::config::ModelKind;
use llm_workshop::prompt::{vars, PromptTemplate, Vars};
use llm_workshop::utils::sentinel::Milestone;
use workshop_demos::{complete, init};

#[tokio::main]
async fn main() -> Result<()> {
    let config = init()?;
    let model = config.model_or_demo(ModelKind::Default, 0.0)?;
    println!("🔧 LCEL Configuration: {}", if config.is_api_configured() { "Real API" } else { "Demo mode" });

    println!("=== Basic Sequential Chain ===");
    let prompt = PromptTemplate::new("Write a brief explanation about {{topic}}");
    let chain = LlmChain::new(prompt.clone(), model.clone());
    let explanation: String = chain.invoke(vars([("topic", "machine learning")])).await?;
    println!("{}", explanation);

    println!("\n=== Multi-step Chain ===");
    let define = LlmChain::new(PromptTemplate::new("Define {{concept}} in one sentence"), model.clone());
    let example = LlmChain::new(PromptTemplate::new("Give a real-world example of: {{definition}}"), model.clone());
    let definition: String = define.invoke(vars([("concept", "neural networks")])).await?;
    println!("Definition: {}", definition);
    let example_text: String = example.invoke(vars([("definition", definition.as_str())])).await?;
    println!("Example: {}", example_text);

    let two_steps = define
        .pipe(Lambda::new(|definition: String| vars([("definition", definition.as_str())])))
        .pipe(example);
    let piped: String = two_steps.invoke(vars([("concept", "recursion")])).await?;
    println!("Piped: {}", piped);

    println!("\n=== Passthrough Chain ===");
    let passthrough = Parallel::new()
        .branch("original", Lambda::new(|input: Vars| serde_json::to_string(&input).unwrap_or_default()))
        .branch("processed", chain);
    let result = passthrough.invoke(vars([("topic", "blockchain")])).await?;
    println!("Original input: {}", result["original"]);
    println!("Processed output: {}", result["processed"]);

    complete(&config, Milestone::SequentialChain)
}
