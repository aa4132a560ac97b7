use std::collections::HashMap;
use crate::prompt::PartialPrompt;
use anyhow::Result;

pub trait FillPlaceholders {
    fn placeholders_to_fill(&self) -> &Vec<String>;
}

pub trait Fill: FillPlaceholders {
    fn fill(&self, partial_prompt: &mut PartialPrompt) -> Result<()>;
}

pub trait FillMut: FillPlaceholders {
    fn fill_mut(&mut self, partial_prompt: &mut PartialPrompt) -> Result<()>;
}

pub trait FillWith<CTX>: FillPlaceholders {
    fn fill_with(&self, partial_prompt: &mut PartialPrompt, context: CTX) -> Result<CTX>;
}

pub trait FillWithMut<CTX>: FillPlaceholders {
    fn fill_with_mut(&mut self, partial_prompt: &mut PartialPrompt, context: CTX) -> Result<CTX>;
}

impl<T: FillWith<()>> Fill for T {
    fn fill(&self, partial_prompt: &mut PartialPrompt) -> Result<()> {
        self.fill_with(partial_prompt, ())
    }
}

impl<T: FillWithMut<()>> FillMut for T {
    fn fill_mut(&mut self, partial_prompt: &mut PartialPrompt) -> Result<()> {
        self.fill_with_mut(partial_prompt, ())
    }
}

/// Fills placeholders with fixed values, e.g. a date or a persona that does not change between calls.
#[derive(Debug, Clone, Default)]
pub struct StaticFiller {
    placeholders: Vec<String>,
    values: HashMap<String, String>,
}

impl StaticFiller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the value for `placeholder`.
    pub fn with(mut self, placeholder: impl Into<String>, value: impl Into<String>) -> Self {
        let placeholder = placeholder.into();
        if !self.values.contains_key(&placeholder) {
            self.placeholders.push(placeholder.clone());
        }
        self.values.insert(placeholder, value.into());
        self
    }
}

impl FillPlaceholders for StaticFiller {
    fn placeholders_to_fill(&self) -> &Vec<String> {
        &self.placeholders
    }
}

impl FillWith<()> for StaticFiller {
    fn fill_with(&self, partial_prompt: &mut PartialPrompt, context: ()) -> Result<()> {
        for placeholder in &self.placeholders {
            partial_prompt.try_fill(placeholder.as_str(), self.values[placeholder].as_str())?;
        }
        Ok(context)
    }
}

#[cfg(test)]
mod test_filler {
    use super::*;
    use crate::prompt::{vars, PromptTemplate};

    #[test]
    fn test_static_filler() {
        let filler = StaticFiller::new()
            .with("date", "2024-01-01")
            .with("persona", "a pirate")
            .with("date", "2024-02-02");
        assert_eq!(&vec!["date".to_string(), "persona".to_string()], filler.placeholders_to_fill());

        let template = PromptTemplate::new("Today is {{date}}. Talk like {{persona}} about {{topic}}.");
        let mut partial_prompt = template.construct_prompt();
        filler.fill(&mut partial_prompt).unwrap();
        partial_prompt.fill("topic", "rust");
        assert_eq!("Today is 2024-02-02. Talk like a pirate about rust.", partial_prompt.complete().unwrap());
    }

    #[test]
    fn test_static_filler_as_partial_variables() {
        let template = PromptTemplate::new("Today is {{date}}. {{question}}");
        let filler = StaticFiller::new().with("date", "Monday");
        let partial = template.partial_from(&filler).unwrap();
        assert_eq!(vec!["question".to_string()], partial.input_variables());
        assert_eq!("Today is Monday. Why?", partial.format(&vars([("question", "Why?")])).unwrap());
    }

    #[test]
    fn test_static_filler_unknown_placeholder() {
        let template = PromptTemplate::new("{{a}}");
        let filler = StaticFiller::new().with("b", "x");
        assert!(filler.fill(&mut template.construct_prompt()).is_err());
    }
}
