use anyhow::Result;
use serde_json::{json, Value};
use llm_workshop::chain::{route_by_length, route_by_type, Lambda, LlmChain, Router, Runnable, RunnableExt};
use llm_workshop::config::ModelKind;
use llm_workshop::prompt::{vars, PromptTemplate, Vars};
use llm_workshop::utils::sentinel::Milestone;
use workshop_demos::{complete, init};

fn extract_words(text: String) -> Value {
    let words: Vec<&str> = text.split_whitespace().collect();
    json!({ "words": words, "count": words.len() })
}

fn filter_long_words(data: Value) -> Value {
    let long_words: Vec<&str> = data["words"].as_array()
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .filter(|word| word.chars().count() > 5)
        .collect();
    json!({ "long_words": long_words, "original_count": data["count"] })
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = init()?;
    let model = config.model_or_demo(ModelKind::Default, 0.0)?;

    println!("=== Transform Functions ===");
    let transform = Lambda::new(|text: String| text.to_uppercase())
        .pipe(Lambda::new(|text: String| format!("IMPORTANT: {}", text)));
    println!("Transformed: {}", transform.invoke("hello world".to_string()).await?);

    println!("\n=== Routing by Length ===");
    let text_of = |input: &Vars| input.get("text").cloned().unwrap_or_default();
    let router = Router::new(move |input: &Vars| route_by_length(&text_of(input)).to_string())
        .route("short", LlmChain::new(PromptTemplate::new("Expand this short text: {{text}}"), model.clone()))
        .route("medium", LlmChain::new(PromptTemplate::new("Summarize this medium text: {{text}}"), model.clone()))
        .route("long", LlmChain::new(PromptTemplate::new("Extract key points from this long text: {{text}}"), model.clone()));
    let texts = [
        "AI is cool",
        "Artificial intelligence is transforming how we work and live in many different ways",
        "Artificial intelligence represents one of the most significant technological advances of our time, \
        fundamentally changing industries from healthcare to finance, transportation to education, and creating new \
        opportunities while also presenting challenges that society must carefully navigate",
    ];
    for text in texts {
        let input = vars([("text", text)]);
        let route = router.key_of(&input);
        let result: String = router.invoke(input).await?;
        println!("Text ({} chars, {}, {}): {}", text.chars().count(), route, route_by_type(text), text);
        println!("Result: {}\n", result);
    }

    println!("=== Multi-Lambda Chain ===");
    let multi = Lambda::new(extract_words).pipe(Lambda::new(filter_long_words));
    let result = multi.invoke("The sophisticated algorithm processes information efficiently".to_string()).await?;
    println!("Multi-lambda result: {}", result);

    complete(&config, Milestone::DynamicRouting)
}
