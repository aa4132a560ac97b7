use anyhow::Result;
use serde::Deserialize;
use llm_workshop::prompt::{conditional_template, vars, PromptTemplate, UserLevel};
use llm_workshop::utils::postprocess::structured::{FieldType, StructuredOutputParser};
use llm_workshop::utils::sentinel::Milestone;
use workshop_demos::{complete, init};

#[allow(dead_code)]
#[derive(Debug, Deserialize)]
struct ProductReview {
    rating: i64,
    pros: Vec<String>,
    cons: Vec<String>,
    recommendation: String,
}

fn main() -> Result<()> {
    let config = init()?;

    let safe_template = PromptTemplate::validated("Write a summary about {{topic}}", &["topic"])?;
    println!("Safe template example:");
    println!("{}", safe_template.format(&vars([("topic", "machine learning")]))?);

    let partial_template = PromptTemplate::new("As an expert {{role}}, please help with: {{task}}")
        .partial("role", "AI consultant")?;
    println!("\nPartial template example:");
    println!("{}", partial_template.format(&vars([("task", "optimize database queries")]))?);

    let parser = StructuredOutputParser::<ProductReview>::new()
        .described_field("rating", FieldType::Integer, "Rating from 1-5")
        .field("pros", FieldType::StringList)
        .field("cons", FieldType::StringList)
        .field("recommendation", FieldType::String);
    let structured_template = PromptTemplate::new("Review this product: {{product}}\n{{format_instructions}}")
        .partial_from(&parser)?;
    println!("\nStructured template example:");
    println!("{}", structured_template.format(&vars([("product", "iPhone 15")]))?);

    println!("\nConditional template examples:");
    for level in UserLevel::ALL {
        let template = conditional_template(level);
        println!("{}: {}", level.label(), template.format(&vars([("concept", "neural networks")]))?);
    }

    complete(&config, Milestone::AdvancedTemplates)
}
