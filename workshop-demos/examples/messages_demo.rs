use anyhow::Result;
use llm_workshop::config::ModelKind;
use llm_workshop::utils::llm::Message;
use llm_workshop::utils::sentinel::Milestone;
use workshop_demos::{complete, init};

#[tokio::main]
async fn main() -> Result<()> {
    let config = init()?;
    let model = config.model_or_demo(ModelKind::Default, 0.0)?;

    let messages = [
        Message::system("You are a helpful Python tutor"),
        Message::human("Explain variables to a beginner"),
    ];
    for message in &messages {
        println!("{}: {}", message.role, message.content);
    }
    println!();
    println!("{}", model.invoke(&messages).await?);

    complete(&config, Milestone::MessagesDemo)
}
