use anyhow::Result;
use llm_workshop::chain::ConversationChain;
use llm_workshop::config::ModelKind;
use llm_workshop::utils::sentinel::Milestone;
use workshop_demos::{complete, init};

const SESSION: &str = "user123";
const OTHER_SESSION: &str = "user456";

const CANNED: [(&str, &str); 3] = [
    ("Hi, my name is Alice and I'm a data scientist",
     "Hello Alice! Nice to meet you. Data science is a fascinating field. How can I help you today?"),
    ("What's my name and profession?",
     "Your name is Alice and you're a data scientist. I remember from our conversation just now!"),
    ("Can you help me with a Python machine learning project?",
     "Absolutely, Alice! As a data scientist, I'd be happy to help with your Python ML project. What specific aspect are you working on?"),
];

async fn converse(chain: &ConversationChain) -> Result<()> {
    for (input, _) in CANNED {
        let reply = chain.chat(SESSION, input).await?;
        println!("User: {}", input);
        println!("Assistant: {}\n", reply);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = init()?;
    if config.is_api_configured() {
        println!("🚀 Using real AI model for memory demonstration...");
    } else {
        println!("📚 Demo mode: Memory concepts will be demonstrated without API calls");
    }
    let model = config.model_or_demo(ModelKind::Default, 0.7)?;
    let chain = ConversationChain::new(model, "You are a helpful assistant who remembers our conversation.");

    println!("=== Memory Demonstration ===");
    if let Err(e) = converse(&chain).await {
        println!("❌ API Error: {}", e);
        println!("💡 Falling back to demo mode");
        for (input, reply) in CANNED {
            println!("User: {}", input);
            println!("Assistant: {}\n", reply);
        }
    }

    println!("\n=== Different Session (No Memory) ===");
    match chain.chat(OTHER_SESSION, "What's my name?").await {
        Ok(reply) => println!("Assistant: {}", reply),
        Err(_) => println!("Assistant: I don't have any information about your name since this is a new session."),
    }

    println!("\n=== Memory Contents ===");
    let history = chain.store().get_session_history(SESSION);
    for message in history.lock().messages() {
        println!("{}: {}", message.role, message.content);
    }

    complete(&config, Milestone::MemoryFundamentals)
}
