//! # Prompt
//! A prompt is simply a string
//! ## PromptTemplate
//! A prompt template is a string with placeholders. It can also have metadata in JSON format and
//! partial variables, i.e. placeholders that are filled once when the template is defined.
//!
//! ## Placeholder
//! A placeholder is a string that is in the format of `{{name}}`. It can be filled with a value.
//! It has a name, which is the string inside the double braces.
//!
//! ## PartialPrompt
//! A partial prompt is a prompt template with some placeholders filled. A partial prompt can be only constructed from a prompt template via [PromptTemplate::construct_prompt].
//!
//! The placeholders in a partial prompt can be filled with values via [PartialPrompt::fill] or [PartialPrompt::try_fill]. You can also use these two methods to update the filling values of the placeholders.
//! When all placeholders are filled, the partial prompt can be completed via [PartialPrompt::complete], in which the placeholders in a template are **actually** replaced with the filling values.
//!
//! For the common "give me the string" case, [PromptTemplate::format] does all of the above in one go.
//!
//! ### Counting tokens
//! A partial prompt can be used to count the number of tokens in the prompt. For simple counting of tokens, you can use [PartialPrompt::current_token_num].
//!
//! If you need to frequently try different filling values and re-count tokens, you can use [PartialPrompt::with_counter_cache] to get a [PromptTokenCountCache] that can be used to count the number of tokens in the prompt.

pub mod chat;
pub mod few_shot;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use crate::filler::Fill;
use crate::prompt::errors::{PlaceholderNotExist, TemplateMismatch, UnfilledPlaceholders};
use crate::utils::prompt_processing::{get_placeholders, replace_all_placeholders};
use crate::utils::token::{CountToken, PromptTokenCountCache};
use log::warn;
use crate::utils::JsonMap;

/// Input variables of a template, from placeholder name to value.
pub type Vars = HashMap<String, String>;

/// Build [Vars] from string pairs.
///
/// ```
/// use llm_workshop::prompt::vars;
/// let v = vars([("topic", "machine learning")]);
/// assert_eq!(v["topic"], "machine learning");
/// ```
pub fn vars<const N: usize>(pairs: [(&str, &str); N]) -> Vars {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}


/// A prompt template with some placeholders filled. A partial prompt can be only constructed from a prompt template via [PromptTemplate::construct_prompt].
#[derive(Debug, Clone)]
#[readonly::make]
pub struct PartialPrompt {
    /// The template of the partial prompt, readonly
    #[readonly]
    pub template: PromptTemplate,

    /// Mapping from placeholder name to its filling value
    pub(crate) placeholder_to_vals: HashMap<String, Option<String>>,

    /// Record the placeholders that are not filled yet
    pub(crate) unfilled_placeholders: HashSet<String>,
}

impl PartialPrompt {
    /// Fill the placeholders in the partial prompt with the given values.
    /// Panics if the placeholder does not exist.
    pub fn fill(&mut self, placeholder: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let placeholder = placeholder.into();
        if let Err(e) = self.try_fill(placeholder, value) {
            panic!("{}", e);
        }
        self
    }

    /// Fill the placeholders in the partial prompt with the given values.
    /// Returns an error if the placeholder does not exist.
    pub fn try_fill(&mut self, placeholder: impl Into<String>, value: impl Into<String>) -> Result<&mut Self, PlaceholderNotExist> {
        let placeholder = placeholder.into();
        if self.placeholder_to_vals.contains_key(&placeholder) {
            self.unfilled_placeholders.remove(&placeholder);
            self.placeholder_to_vals.insert(placeholder, Some(value.into()));
            Ok(self)
        } else {
            Err(PlaceholderNotExist::new(placeholder, value, &self.template.placeholders))
        }
    }

    /// Fill every placeholder that has a value in `vars`. Variables the template does not use are ignored.
    pub fn fill_vars(&mut self, vars: &Vars) -> &mut Self {
        for (placeholder, value) in vars {
            if self.placeholder_to_vals.contains_key(placeholder) {
                self.unfilled_placeholders.remove(placeholder);
                self.placeholder_to_vals.insert(placeholder.clone(), Some(value.clone()));
            }
        }
        self
    }

    /// Names of the placeholders that still need a value.
    pub fn unfilled(&self) -> &HashSet<String> {
        &self.unfilled_placeholders
    }

    /// Get a [PromptTokenCountCache] that can be used to quickly count the number of tokens in the prompt and cache.
    pub fn with_counter_cache<'a, C: CountToken>(&'a self, counter: &'a C) -> PromptTokenCountCache<'a, C> {
        PromptTokenCountCache::new(self, counter)
    }

    /// Count the number of tokens in the prompt without caching. Note that the unfilled placeholders are counted as written, i.e. `{{name}}`.
    pub fn current_token_num(&self, counter: &impl CountToken) -> usize {
        PromptTokenCountCache::new(self, counter).current_count()
    }

    /// Complete the partial prompt and return the completed prompt.
    /// Returns an error if there are still unfilled placeholders.
    pub fn complete(&self) -> Result<String, UnfilledPlaceholders> {
        if self.unfilled_placeholders.is_empty() {
            Ok(replace_all_placeholders(self.template.str(), &self.placeholder_to_vals))
        } else {
            let mut unfilled_placeholders: Vec<String> = self.unfilled_placeholders.iter().cloned().collect();
            unfilled_placeholders.sort();
            Err(UnfilledPlaceholders {
                all_placeholders: self.template.sorted_placeholders(),
                unfilled_placeholders,
            })
        }
    }
}

/// A prompt template with placeholders. It can also have metadata in JSON format.
#[derive(Debug, Clone)]
#[readonly::make]
pub struct PromptTemplate {
    /// The template of the partial prompt, immutable
    template: Arc<String>,

    /// The placeholders in the template, readonly
    #[readonly]
    pub placeholders: HashSet<String>,

    /// The metadata of the prompt template, readonly
    #[readonly]
    pub meta_data: Arc<JsonMap>,

    /// Placeholders filled once at definition time
    partial_variables: Arc<HashMap<String, String>>,
}

impl PromptTemplate {
    /// Create a prompt template from a string without metadata.
    pub fn new(template: impl Into<String>) -> Self {
        Self::with_metadata(template, JsonMap::new())
    }

    /// Create a prompt template from a string with metadata. Warns if the template does not have any placeholder.
    pub fn with_metadata(template: impl Into<String>, metadata: JsonMap) -> Self {
        let template = template.into();
        let placeholders = get_placeholders(&template);
        if placeholders.is_empty() {
            warn!("Your prompt template does not have a placeholder. If this is intended, ignore this message. \
            Otherwise, check whether you have written placeholders correctly.\n\
            Got prompt template:\n\
            {}", template);
        }
        Self {
            template: Arc::new(template),
            meta_data: Arc::new(metadata),
            placeholders,
            partial_variables: Arc::new(HashMap::new()),
        }
    }

    /// Create a prompt template and check it against the declared input variables.
    ///
    /// The declared variables must be exactly the placeholders of the template.
    pub fn validated(template: impl Into<String>, declared: &[&str]) -> Result<Self, TemplateMismatch> {
        let template = Self::new(template);
        template.validate(declared)?;
        Ok(template)
    }

    /// Check that `declared` plus the partial variables cover exactly the placeholders.
    pub fn validate(&self, declared: &[&str]) -> Result<(), TemplateMismatch> {
        let declared: HashSet<String> = declared.iter()
            .map(|s| s.to_string())
            .chain(self.partial_variables.keys().cloned())
            .collect();
        let mut missing: Vec<String> = self.placeholders.difference(&declared).cloned().collect();
        let mut extra: Vec<String> = declared.difference(&self.placeholders).cloned().collect();
        if missing.is_empty() && extra.is_empty() {
            Ok(())
        } else {
            missing.sort();
            extra.sort();
            Err(TemplateMismatch { missing, extra })
        }
    }

    /// Get the prompt template as a string.
    #[inline]
    pub fn str(&self) -> &str {
        &self.template
    }

    /// Return a copy of this template with `placeholder` filled in advance.
    pub fn partial(&self, placeholder: impl Into<String>, value: impl Into<String>) -> Result<Self, PlaceholderNotExist> {
        let placeholder = placeholder.into();
        if !self.placeholders.contains(&placeholder) {
            return Err(PlaceholderNotExist::new(placeholder, value, &self.placeholders));
        }
        let mut partial_variables = (*self.partial_variables).clone();
        partial_variables.insert(placeholder, value.into());
        Ok(Self {
            partial_variables: Arc::new(partial_variables),
            ..self.clone()
        })
    }

    /// Return a copy of this template whose placeholders filled by `filler` become partial variables.
    pub fn partial_from(&self, filler: &impl Fill) -> anyhow::Result<Self> {
        let mut partial_prompt = self.construct_prompt();
        filler.fill(&mut partial_prompt)?;
        let mut partial_variables = (*self.partial_variables).clone();
        for name in filler.placeholders_to_fill() {
            if let Some(Some(value)) = partial_prompt.placeholder_to_vals.get(name) {
                partial_variables.insert(name.clone(), value.clone());
            }
        }
        Ok(Self {
            partial_variables: Arc::new(partial_variables),
            ..self.clone()
        })
    }

    /// The variables a caller still has to provide, i.e. placeholders minus partial variables. Sorted.
    pub fn input_variables(&self) -> Vec<String> {
        let mut input_variables: Vec<String> = self.placeholders.iter()
            .filter(|p| !self.partial_variables.contains_key(*p))
            .cloned()
            .collect();
        input_variables.sort();
        input_variables
    }

    pub(crate) fn sorted_placeholders(&self) -> Vec<String> {
        let mut placeholders: Vec<String> = self.placeholders.iter().cloned().collect();
        placeholders.sort();
        placeholders
    }

    /// Construct a partial prompt from the prompt template. Partial variables are already filled.
    pub fn construct_prompt(&self) -> PartialPrompt {
        let mut placeholder_to_vals: HashMap<String, Option<String>> = self.placeholders.iter().map(|p| (p.clone(), None)).collect();
        let mut unfilled_placeholders = self.placeholders.clone();
        for (placeholder, value) in self.partial_variables.iter() {
            placeholder_to_vals.insert(placeholder.clone(), Some(value.clone()));
            unfilled_placeholders.remove(placeholder);
        }
        PartialPrompt {
            template: self.clone(),
            placeholder_to_vals,
            unfilled_placeholders,
        }
    }

    /// Fill the template with `vars` and complete it. Variables the template does not use are ignored.
    pub fn format(&self, vars: &Vars) -> Result<String, UnfilledPlaceholders> {
        self.construct_prompt().fill_vars(vars).complete()
    }
}

/// Audience level of a conditional explanation template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserLevel {
    Beginner,
    Intermediate,
    Expert,
}

impl UserLevel {
    pub const ALL: [UserLevel; 3] = [UserLevel::Beginner, UserLevel::Intermediate, UserLevel::Expert];

    pub fn label(&self) -> &'static str {
        match self {
            UserLevel::Beginner => "Beginner",
            UserLevel::Intermediate => "Intermediate",
            UserLevel::Expert => "Expert",
        }
    }
}

/// Pick an explanation template for the audience. Every variant takes a `concept`.
pub fn conditional_template(level: UserLevel) -> PromptTemplate {
    let template = match level {
        UserLevel::Beginner => "Explain {{concept}} in very simple terms with examples.",
        UserLevel::Intermediate => "Explain {{concept}} with some technical details.",
        UserLevel::Expert => "Provide a comprehensive technical explanation of {{concept}}.",
    };
    PromptTemplate::new(template)
}

pub mod errors {
    use std::collections::HashSet;
    use std::error::Error;
    use std::fmt;
    use std::fmt::Formatter;

    /// Error when trying to complete a partial prompt but there are still unfilled placeholders.
    #[derive(Debug)]
    pub struct UnfilledPlaceholders {
        pub unfilled_placeholders: Vec<String>,
        pub all_placeholders: Vec<String>,
    }

    impl fmt::Display for UnfilledPlaceholders {
        fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
            write!(f, "UnfilledPlaceholders: to complete the prompt template,\n  Requires Placeholders:{:?}\n  Unfilled Placeholders:{:?}",
                   self.all_placeholders, self.unfilled_placeholders)
        }
    }

    impl Error for UnfilledPlaceholders {}

    /// Error when trying to fill a placeholder that does not exist in the prompt template of the partial prompt.
    #[derive(Debug)]
    pub struct PlaceholderNotExist {
        pub try_fill_placeholder: String,
        pub value: String,
        pub available_placeholders: Vec<String>,
    }

    impl PlaceholderNotExist {
        pub(crate) fn new(try_fill_placeholder: impl Into<String>,
                          value: impl Into<String>,
                          available_placeholders: &HashSet<String>) -> Self {
            let mut available_placeholders: Vec<String> = available_placeholders.iter().cloned().collect();
            available_placeholders.sort();
            PlaceholderNotExist {
                try_fill_placeholder: try_fill_placeholder.into(),
                value: value.into(),
                available_placeholders,
            }
        }
    }

    impl fmt::Display for PlaceholderNotExist {
        fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
            write!(f, "PlaceholderNotExist: try to fill placeholder = {} with value = {}, but available placeholders are {:?}",
                   self.try_fill_placeholder,
                   self.value,
                   self.available_placeholders)
        }
    }

    impl Error for PlaceholderNotExist {}

    /// Error when the declared input variables of a template do not match its placeholders.
    #[derive(Debug, PartialEq, Eq)]
    pub struct TemplateMismatch {
        /// Placeholders in the template that nobody declared
        pub missing: Vec<String>,
        /// Declared variables that the template never uses
        pub extra: Vec<String>,
    }

    impl fmt::Display for TemplateMismatch {
        fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
            write!(f, "TemplateMismatch: undeclared placeholders {:?}, unused declared variables {:?}",
                   self.missing, self.extra)
        }
    }

    impl Error for TemplateMismatch {}
}

#[cfg(test)]
mod test_prompt {
    use super::*;
    use crate::utils::token::count_tokens_by_len;

    #[test]
    fn test_format_basic_template() {
        let template = PromptTemplate::new("Generate a marketing slogan for {{product}} highlighting {{feature}}.");
        let prompt = template.format(&vars([("product", "LangChain"), ("feature", "AI orchestration")])).unwrap();
        assert_eq!("Generate a marketing slogan for LangChain highlighting AI orchestration.", prompt);
        assert_eq!(vec!["feature".to_string(), "product".to_string()], template.input_variables());
    }

    #[test]
    fn test_format_ignores_extra_and_rejects_missing() {
        let template = PromptTemplate::new("Explain {{topic}} briefly");
        let prompt = template.format(&vars([("topic", "blockchain"), ("unused", "x")])).unwrap();
        assert_eq!("Explain blockchain briefly", prompt);

        let err = template.format(&Vars::new()).unwrap_err();
        assert_eq!(vec!["topic".to_string()], err.unfilled_placeholders);
    }

    #[test]
    fn test_try_fill_unknown_placeholder() {
        let template = PromptTemplate::new("Write a summary about {{topic}}");
        let mut partial_prompt = template.construct_prompt();
        let err = partial_prompt.try_fill("subject", "x").unwrap_err();
        assert_eq!("subject", err.try_fill_placeholder);
        assert_eq!(vec!["topic".to_string()], err.available_placeholders);
        assert!(partial_prompt.complete().is_err());
        partial_prompt.fill("topic", "machine learning");
        assert_eq!("Write a summary about machine learning", partial_prompt.complete().unwrap());
    }

    #[test]
    fn test_partial_variables() {
        let template = PromptTemplate::new("As an expert {{role}}, please help with: {{task}}")
            .partial("role", "AI consultant")
            .unwrap();
        assert_eq!(vec!["task".to_string()], template.input_variables());
        let prompt = template.format(&vars([("task", "optimize database queries")])).unwrap();
        assert_eq!("As an expert AI consultant, please help with: optimize database queries", prompt);
        assert!(template.partial("missing", "x").is_err());
    }

    #[test]
    fn test_validated() {
        assert!(PromptTemplate::validated("Write a summary about {{topic}}", &["topic"]).is_ok());
        let err = PromptTemplate::validated("Write a summary about {{topic}}", &["subject"]).unwrap_err();
        assert_eq!(vec!["topic".to_string()], err.missing);
        assert_eq!(vec!["subject".to_string()], err.extra);

        let partial = PromptTemplate::new("As an expert {{role}}, please help with: {{task}}")
            .partial("role", "AI consultant")
            .unwrap();
        assert!(partial.validate(&["task"]).is_ok());
    }

    #[test]
    fn test_conditional_template() {
        let concept = vars([("concept", "neural networks")]);
        let rendered: Vec<String> = UserLevel::ALL.iter()
            .map(|level| conditional_template(*level).format(&concept).unwrap())
            .collect();
        assert_eq!(rendered[0], "Explain neural networks in very simple terms with examples.");
        assert_eq!(rendered[1], "Explain neural networks with some technical details.");
        assert_eq!(rendered[2], "Provide a comprehensive technical explanation of neural networks.");
    }

    #[test]
    fn test_token_num() {
        let template = PromptTemplate::new("ab {{x}} {{x}}");
        let mut partial_prompt = template.construct_prompt();
        // unfilled placeholders count as written
        assert_eq!(template.str().len(), partial_prompt.current_token_num(&count_tokens_by_len));
        partial_prompt.fill("x", "1234567");
        let completed = partial_prompt.complete().unwrap();
        assert_eq!(completed.len(), partial_prompt.current_token_num(&count_tokens_by_len));
    }
}
