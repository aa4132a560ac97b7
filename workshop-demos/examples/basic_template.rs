use anyhow::Result;
use llm_workshop::config::ModelKind;
use llm_workshop::prompt::{vars, PromptTemplate};
use llm_workshop::utils::sentinel::Milestone;
use llm_workshop::utils::token::tiktoken::Tiktoken;
use workshop_demos::{complete, init};

fn main() -> Result<()> {
    let config = init()?;
    let template = PromptTemplate::validated(
        "Generate a marketing slogan for {{product}} highlighting {{feature}}.",
        &["product", "feature"],
    )?;

    let prompt = template.format(&vars([("product", "LangChain"), ("feature", "AI orchestration")]))?;
    println!("Generated prompt: {}", prompt);

    let examples = [
        vars([("product", "Smartphone"), ("feature", "camera quality")]),
        vars([("product", "Electric Car"), ("feature", "eco-friendly")]),
        vars([("product", "AI Assistant"), ("feature", "natural conversation")]),
    ];
    for example in &examples {
        println!("• {}", template.format(example)?);
    }

    let counter = Tiktoken::new(config.model_name(ModelKind::Default))?;
    let mut partial = template.construct_prompt();
    partial.try_fill("product", "LangChain")?;
    let cache = partial.with_counter_cache(&counter);
    println!("\nTokens with only the product filled: {}", cache.current_count());
    println!("Tokens once the feature is filled: {}", cache.attempt_fill_and_count("feature", "AI orchestration")?);

    complete(&config, Milestone::BasicTemplates)
}
