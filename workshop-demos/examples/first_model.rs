use anyhow::Result;
use llm_workshop::config::ModelKind;
use llm_workshop::demo::safe_invoke;
use llm_workshop::utils::llm::ChatModel;
use llm_workshop::utils::sentinel::Milestone;
use workshop_demos::{complete, init};

const QUESTIONS: [(&str, &str); 2] = [
    ("Hello! What's 2+2?", "Hello! 2+2 equals 4. This is a basic arithmetic calculation."),
    ("What's the capital of France?",
     "The capital of France is Paris. It's known for landmarks like the Eiffel Tower and Louvre Museum."),
];

async fn ask_all(model: &dyn ChatModel) -> Result<()> {
    for (question, _) in QUESTIONS {
        let answer = model.invoke_prompt(question).await?;
        println!("Q: {}", question);
        println!("A: {}\n", answer);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = init()?;
    println!("🔧 Configuration:");
    println!("   Model: {}", config.default_model);
    println!("   API Base: {}", if config.api_base.is_empty() { "Not configured" } else { config.api_base.as_str() });
    println!("   Real API: {}\n", if config.is_api_configured() { "Enabled" } else { "Demo mode" });

    let mut answered = false;
    if let Some(model) = config.get_model(ModelKind::Default, 0.0)? {
        println!("🚀 Using real AI model...");
        match ask_all(&model).await {
            Ok(()) => answered = true,
            Err(e) => {
                println!("❌ API Error: {}", e);
                println!("💡 Check your .env file configuration");
            }
        }
    }
    if !answered {
        println!("📚 Demo mode - showing example responses:");
        for (question, answer) in QUESTIONS {
            println!("Q: {}", question);
            println!("A: {}\n", answer);
        }
    }

    println!("=== Safe Invoke ===");
    let model = config.get_model(ModelKind::Default, 0.0)?;
    let reply = safe_invoke(model.as_ref().map(|m| m as &dyn ChatModel), "Hi there!", ModelKind::Default).await;
    println!("{}\n", reply);

    complete(&config, Milestone::FirstModel)
}
