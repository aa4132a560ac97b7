//! Token counting traits and utilities

use std::collections::{HashMap, HashSet};

use crate::prompt::errors::PlaceholderNotExist;
use crate::prompt::PartialPrompt;
use crate::utils::prompt_processing::{PLACEHOLDER_MATCH_RE, strip_format};

pub mod tiktoken;

/// Trait for counting tokens in a string.
pub trait CountToken {
    fn count_token(&self, string: &str) -> usize;
}

/// Blanket impl of CountToken for Fn(&str) -> usize.
impl<F> CountToken for F where F: Fn(&str) -> usize {
    fn count_token(&self, string: &str) -> usize {
        self(string)
    }
}

/// Count the number of tokens in a string by the length of the string in bytes.
#[inline]
pub fn count_tokens_by_len(string: &str) -> usize {
    string.len()
}

/// Count the number of tokens in a string by the number of characters.
#[inline]
pub fn count_chars(string: &str) -> usize {
    string.chars().count()
}


/// Cache for counting tokens in a [PartialPrompt](crate::prompt::PartialPrompt).
#[derive(Debug, Clone)]
#[readonly::make]
pub struct PromptTokenCountCache<'a, C: CountToken> {
    /// The token count of the template of the partial prompt. Note that placeholders are counted as written, i.e. `{{name}}`.
    #[readonly]
    pub template_token_count: usize,
    all_placeholders: &'a HashSet<String>,
    placeholder_to_val: &'a HashMap<String, Option<String>>,
    placeholder_occurrence: HashMap<&'a str, usize>,
    placeholder_token_count: HashMap<&'a str, usize>,
    counter: &'a C,
}

impl<'a, C: CountToken> PromptTokenCountCache<'a, C> {
    fn get_placeholder_occurrence(string: &'a str, placeholders: &'a HashSet<String>) -> HashMap<&'a str, usize> {
        let mut count: HashMap<&str, usize> = placeholders.iter().map(|s| (s.as_str(), 0)).collect();
        PLACEHOLDER_MATCH_RE
            .captures_iter(string)
            .for_each(|captures| {
                let placeholder_name = strip_format(&captures[0]);
                if let Some(count) = count.get_mut(placeholder_name) {
                    *count += 1;
                }
            });
        count
    }

    /// Create a new cache for counting tokens in a [PartialPrompt](crate::prompt::PartialPrompt).
    pub fn new(partial_prompt: &'a PartialPrompt, counter: &'a C) -> Self {
        let template_str = partial_prompt.template.str();
        let template_token_count = counter.count_token(template_str);
        let placeholder_occurrence = Self::get_placeholder_occurrence(template_str, &partial_prompt.template.placeholders);
        let placeholder_token_count = partial_prompt.template.placeholders
            .iter()
            .map(|p| (p.as_str(), counter.count_token(&format!("{{{{{}}}}}", p))))
            .collect();
        Self {
            template_token_count,
            all_placeholders: &partial_prompt.template.placeholders,
            placeholder_to_val: &partial_prompt.placeholder_to_vals,
            placeholder_occurrence,
            placeholder_token_count,
            counter,
        }
    }

    fn count_with<'v>(&self, value_of: impl Fn(&str) -> Option<&'v str>) -> usize {
        let total_delta: isize = self.all_placeholders.iter()
            .map(|placeholder| {
                let placeholder = placeholder.as_str();
                match value_of(placeholder) {
                    Some(fill_value) => {
                        let fill_value_token_count = self.counter.count_token(fill_value) as isize;
                        let placeholder_token_count = self.placeholder_token_count.get(placeholder).copied().unwrap_or(0) as isize;
                        let placeholder_occurrence = self.placeholder_occurrence.get(placeholder).copied().unwrap_or(0) as isize;
                        (fill_value_token_count - placeholder_token_count) * placeholder_occurrence
                    }
                    None => 0,
                }
            })
            .sum();
        (self.template_token_count as isize + total_delta).max(0) as usize
    }

    /// Count the tokens of the partial prompt as it is now.
    pub fn current_count(&self) -> usize {
        let placeholder_to_val = self.placeholder_to_val;
        self.count_with(|p| placeholder_to_val.get(p).and_then(|v| v.as_deref()))
    }

    /// Count the number of tokens in a [PartialPrompt](crate::prompt::PartialPrompt) with the placeholder filled with the given value.
    /// Note that this does not change the partial prompt itself.
    /// Returns an error if the placeholder does not exist.
    pub fn attempt_fill_and_count(&self, placeholder_name: impl Into<String>, fill_value: impl Into<String>) -> Result<usize, PlaceholderNotExist> {
        let placeholder_name = placeholder_name.into();
        let fill_value = fill_value.into();
        let mapping = HashMap::from([(placeholder_name, fill_value)]);
        self.attempt_fill_multiple_and_count(&mapping)
    }

    /// Count the number of tokens in a [PartialPrompt](crate::prompt::PartialPrompt) with the placeholders filled with the given values.
    /// Note that this does not change the partial prompt itself.
    /// Returns an error if any of the placeholders does not exist.
    pub fn attempt_fill_multiple_and_count(&self, mappings: &HashMap<String, String>) -> Result<usize, PlaceholderNotExist> {
        for (placeholder_to_fill, value) in mappings {
            if !self.all_placeholders.contains(placeholder_to_fill.as_str()) {
                return Err(PlaceholderNotExist::new(placeholder_to_fill, value, self.all_placeholders));
            }
        }
        let placeholder_to_val = self.placeholder_to_val;
        Ok(self.count_with(|placeholder| {
            mappings.get(placeholder)
                .map(String::as_str)
                .or_else(|| placeholder_to_val.get(placeholder).and_then(|v| v.as_deref()))
        }))
    }
}

#[cfg(test)]
mod test_token {
    use std::collections::HashMap;
    use super::{count_chars, count_tokens_by_len, CountToken};
    use crate::prompt::PromptTemplate;

    #[test]
    fn test_str_len_impl() {
        let counter = str::len;
        let size = counter.count_token("");
        assert_eq!(0, size);
        assert_eq!(2, count_chars("é!"));
    }

    #[test]
    fn test_attempt_fill_does_not_change_prompt() {
        let template = PromptTemplate::new("{{a}} and {{b}}");
        let partial_prompt = template.construct_prompt();
        let cache = partial_prompt.with_counter_cache(&count_tokens_by_len);
        assert_eq!("alice and {{b}}".len(), cache.attempt_fill_and_count("a", "alice").unwrap());
        let mapping = HashMap::from([
            ("a".to_string(), "alice".to_string()),
            ("b".to_string(), "bob".to_string()),
        ]);
        assert_eq!("alice and bob".len(), cache.attempt_fill_multiple_and_count(&mapping).unwrap());
        assert!(cache.attempt_fill_and_count("c", "carol").is_err());
        assert!(partial_prompt.complete().is_err());
    }
}
