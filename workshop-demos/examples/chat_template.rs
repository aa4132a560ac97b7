use anyhow::Result;
use llm_workshop::prompt::chat::ChatPromptTemplate;
use llm_workshop::prompt::vars;
use llm_workshop::utils::sentinel::Milestone;
use workshop_demos::{complete, init};

fn main() -> Result<()> {
    let config = init()?;
    let chat_template = ChatPromptTemplate::from_messages(&[
        ("system", "You are a {{role}} expert with {{years}} years of experience."),
        ("human", "Explain {{concept}} to me in simple terms."),
        ("assistant", "I'll explain {{concept}} step by step."),
    ])?;

    let messages = chat_template.format_messages(&vars([
        ("role", "Python programming"),
        ("years", "10"),
        ("concept", "decorators"),
    ]))?;
    for message in &messages {
        println!("{}: {}", message.role.as_str().to_uppercase(), message.content);
    }

    let scenarios = [
        vars([("role", "Data Science"), ("years", "5"), ("concept", "machine learning")]),
        vars([("role", "Web Development"), ("years", "8"), ("concept", "REST APIs")]),
    ];
    for scenario in &scenarios {
        let messages = chat_template.format_messages(scenario)?;
        println!("System: {}", messages[0].content);
    }

    complete(&config, Milestone::ChatTemplates)
}
