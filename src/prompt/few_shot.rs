use anyhow::Result;

use crate::prompt::{PromptTemplate, Vars};

pub const DEFAULT_EXAMPLE_SEPARATOR: &str = "\n\n";

/// A prompt made of a prefix, formatted examples and a suffix, joined by a separator.
///
/// Only the prefix and the suffix see the input variables; each example is formatted with its own values.
#[derive(Debug, Clone)]
pub struct FewShotPromptTemplate {
    pub examples: Vec<Vars>,
    pub example_prompt: PromptTemplate,
    pub prefix: PromptTemplate,
    pub suffix: PromptTemplate,
    pub example_separator: String,
}

impl FewShotPromptTemplate {
    pub fn new(examples: Vec<Vars>,
               example_prompt: PromptTemplate,
               prefix: impl Into<String>,
               suffix: impl Into<String>) -> Self {
        Self {
            examples,
            example_prompt,
            prefix: PromptTemplate::new(prefix),
            suffix: PromptTemplate::new(suffix),
            example_separator: DEFAULT_EXAMPLE_SEPARATOR.to_string(),
        }
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.example_separator = separator.into();
        self
    }

    /// Variables of the prefix and suffix, sorted.
    pub fn input_variables(&self) -> Vec<String> {
        let mut variables = self.prefix.input_variables();
        variables.extend(self.suffix.input_variables());
        variables.sort();
        variables.dedup();
        variables
    }

    pub fn format(&self, vars: &Vars) -> Result<String> {
        let mut pieces = Vec::with_capacity(self.examples.len() + 2);
        let prefix = self.prefix.format(vars)?;
        if !prefix.is_empty() {
            pieces.push(prefix);
        }
        for example in &self.examples {
            pieces.push(self.example_prompt.format(example)?);
        }
        pieces.push(self.suffix.format(vars)?);
        Ok(pieces.join(self.example_separator.as_str()))
    }
}

#[cfg(test)]
mod test_few_shot {
    use super::*;
    use crate::prompt::vars;

    fn opposites() -> Vec<Vars> {
        vec![
            vars([("input", "happy"), ("output", "sad")]),
            vars([("input", "tall"), ("output", "short")]),
        ]
    }

    #[test]
    fn test_format() {
        let template = FewShotPromptTemplate::new(
            opposites(),
            PromptTemplate::new("Input: {{input}}\nOutput: {{output}}"),
            "Find the opposite of each word:",
            "Input: {{word}}\nOutput:",
        );
        assert_eq!(vec!["word".to_string()], template.input_variables());
        let prompt = template.format(&vars([("word", "big")])).unwrap();
        assert_eq!(
            "Find the opposite of each word:\n\nInput: happy\nOutput: sad\n\nInput: tall\nOutput: short\n\nInput: big\nOutput:",
            prompt
        );
    }

    #[test]
    fn test_custom_separator_and_errors() {
        let template = FewShotPromptTemplate::new(
            opposites(),
            PromptTemplate::new("{{input}} -> {{output}}"),
            "",
            "{{word}} ->",
        ).with_separator("\n");
        assert_eq!("happy -> sad\ntall -> short\nbright ->", template.format(&vars([("word", "bright")])).unwrap());
        assert!(template.format(&Vars::new()).is_err());
    }
}
