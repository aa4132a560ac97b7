use anyhow::Result;
use llm_workshop::prompt::few_shot::FewShotPromptTemplate;
use llm_workshop::prompt::{vars, PromptTemplate};
use llm_workshop::utils::sentinel::Milestone;
use workshop_demos::{complete, init};

fn main() -> Result<()> {
    let config = init()?;
    let examples = vec![
        vars([("input", "happy"), ("output", "sad")]),
        vars([("input", "tall"), ("output", "short")]),
        vars([("input", "fast"), ("output", "slow")]),
        vars([("input", "hot"), ("output", "cold")]),
    ];
    let example_prompt = PromptTemplate::validated("Input: {{input}}\nOutput: {{output}}", &["input", "output"])?;

    let few_shot = FewShotPromptTemplate::new(
        examples.clone(),
        example_prompt.clone(),
        "Find the opposite of each word:",
        "Input: {{word}}\nOutput:",
    );
    for word in ["big", "light", "expensive", "difficult"] {
        println!("Prompt for {}:\n {}", word, few_shot.format(&vars([("word", word)]))?);
    }

    let dynamic = FewShotPromptTemplate::new(
        examples[..2].to_vec(),
        example_prompt,
        "Learn the pattern from these examples:",
        "Input: {{word}}\nOutput:",
    );
    println!("{}", dynamic.format(&vars([("word", "bright")]))?);

    complete(&config, Milestone::FewShotTemplates)
}
