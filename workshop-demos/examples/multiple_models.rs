use std::sync::Arc;
use anyhow::Result;
use llm_workshop::config::ModelKind;
use llm_workshop::utils::llm::ChatModel;
use llm_workshop::utils::printing::print_markdown;
use llm_workshop::utils::sentinel::Milestone;
use workshop_demos::{complete, init};

const QUESTION: &str = "Write a Python function to calculate fibonacci numbers";
const FUN_FACT: &str = "Tell me a fun fact about programming";

const DEMO_FAST: &str = r#"def fibonacci(n):
    if n <= 1:
        return n
    return fibonacci(n-1) + fibonacci(n-2)

# Example usage:
print(fibonacci(10))  # Output: 55"#;

const DEMO_CODING: &str = r#"def fibonacci(n):
    """Calculate the nth Fibonacci number using dynamic programming."""
    if n <= 1:
        return n

    # Use iterative approach for better performance
    a, b = 0, 1
    for _ in range(2, n + 1):
        a, b = b, a + b
    return b

# Example:
for i in range(10):
    print(f"F({i}) = {fibonacci(i)}")"#;

const DEMO_CREATIVE: &str = "Fun fact: The term 'bug' in programming originated in 1947 when Admiral Grace Hopper \
found an actual moth stuck in a computer relay at Harvard University. She taped the bug to her logbook and coined \
the term 'debugging'!";

struct Models {
    fast: Arc<dyn ChatModel>,
    coding: Arc<dyn ChatModel>,
    creative: Arc<dyn ChatModel>,
}

async fn run(models: &Models) -> Result<()> {
    println!("=== Fast Model Response ===");
    println!("{}", models.fast.invoke_prompt(QUESTION).await?);
    println!("\n=== Coding Model Response ===");
    println!("{}", models.coding.invoke_prompt(QUESTION).await?);
    println!("\n=== Creative Model Response ===");
    println!("{}", models.creative.invoke_prompt(FUN_FACT).await?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = init()?;
    println!("🔧 Model Configuration:");
    for kind in [ModelKind::Fast, ModelKind::Coding, ModelKind::Creative] {
        println!("   {} model: {}", kind, config.model_name(kind));
    }
    println!("   Real API: {}\n", if config.is_api_configured() { "Enabled" } else { "Demo mode" });

    let mut answered = false;
    if config.is_api_configured() {
        let models = Models {
            fast: config.model_or_demo(ModelKind::Fast, 0.0)?,
            coding: config.model_or_demo(ModelKind::Coding, 0.0)?,
            creative: config.model_or_demo(ModelKind::Creative, 0.7)?,
        };
        match run(&models).await {
            Ok(()) => answered = true,
            Err(e) => {
                println!("❌ API Error: {}", e);
                println!("💡 Falling back to demo mode");
            }
        }
    }
    if !answered {
        println!("📚 Demo mode - showing example responses:");
        println!("\n=== Fast Model Response ===");
        print_markdown(&format!("```python\n{}\n```", DEMO_FAST));
        println!("\n=== Coding Model Response ===");
        print_markdown(&format!("```python\n{}\n```", DEMO_CODING));
        println!("\n=== Creative Model Response ===\n{}", DEMO_CREATIVE);
    }

    complete(&config, Milestone::MultipleModels)
}
