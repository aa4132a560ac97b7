use anyhow::Result;
use llm_workshop::config::ModelKind;
use llm_workshop::memory::{ConversationSummaryMemory, CustomMemoryStore, WindowMemory};
use llm_workshop::utils::sentinel::Milestone;
use workshop_demos::{complete, init};

const CONVERSATIONS: [(&str, &str); 5] = [
    ("Tell me about Python", "Python is a versatile programming language"),
    ("What about machine learning?", "Python has great ML libraries like scikit-learn"),
    ("How about deep learning?", "PyTorch and TensorFlow are popular for deep learning"),
    ("What about data visualization?", "Matplotlib and Seaborn are excellent for visualization"),
    ("Can you remind me what we discussed first?", "I'll focus on our recent conversation about data visualization"),
];

#[tokio::main]
async fn main() -> Result<()> {
    let config = init()?;
    let model = config.model_or_demo(ModelKind::Default, 0.7)?;

    println!("=== Summary Memory ===");
    let summary_memory = ConversationSummaryMemory::new(model.clone());
    let messages = {
        let mut chat_memory = summary_memory.chat_memory.lock();
        chat_memory.add_user_message("Hi, I'm working on a machine learning project about predicting house prices");
        chat_memory.add_ai_message("That sounds interesting! House price prediction is a classic regression problem. What features are you planning to use?");
        chat_memory.add_user_message("I have data on square footage, number of bedrooms, bathrooms, and location");
        chat_memory.add_ai_message("Great features! Location is particularly important. Are you considering using linear regression or more advanced algorithms?");
        chat_memory.messages().to_vec()
    };
    let summary = summary_memory.predict_new_summary(&messages, "").await?;
    println!("Conversation Summary: {}", summary);

    println!("\n=== Window Memory (Last K Messages) ===");
    let mut window_memory: WindowMemory = WindowMemory::new(4);
    for (human, ai) in CONVERSATIONS {
        window_memory.add_exchange(human, ai);
        println!("Human: {}", human);
        println!("AI: {}", ai);
        println!("Memory size: {}\n", window_memory.len());
    }
    println!("Final memory contents (last 4 messages):");
    for (idx, message) in window_memory.messages().enumerate() {
        println!("{}. {}: {}", idx + 1, message.role, message.content);
    }

    println!("\n=== Custom Memory Strategies ===");
    let store = CustomMemoryStore::new(model);
    let _summary_session = store.get_summary_session("long_session")?;
    println!("Summary memory created for long conversations");
    let window_session = store.get_window_session("short_session", 4)?;
    println!("Window memory created for short conversations (k = {})", window_session.lock().k());

    complete(&config, Milestone::AdvancedMemory)
}
