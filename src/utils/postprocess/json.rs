use serde::de::DeserializeOwned;
use serde_json::{from_str, Value};
use anyhow::Result;
use std::error::Error;
use std::fmt;
use std::fmt::Formatter;


/// Cut a model reply down to the outermost `{...}` and parse it.
///
/// Models like to wrap JSON in prose or a markdown fence, so everything before the first `{` and after the last
/// `}` is dropped. Returns an [InvalidJSON] error if there are no braces at all.
///
/// # Example
/// ```
/// use llm_workshop::utils::postprocess::json::filter_to_json;
/// let reply = "Here is the review:\n```json\n{\"rating\": 4}\n```";
/// let json_value = filter_to_json(reply).unwrap();
/// assert_eq!(json_value["rating"], 4);
///
/// let invalid_str = "partially valid: \"a\":\"alice\"}";
/// assert!(filter_to_json(invalid_str).is_err())
/// ```
pub fn filter_to_json(string: &str) -> Result<Value> {
    let json_str = json_slice(string).ok_or_else(|| InvalidJSON { invalid_string: string.to_string() })?;
    Ok(from_str(json_str)?)
}

/// Like [filter_to_json], deserializing straight into `T`.
pub fn filter_to_type<T: DeserializeOwned>(string: &str) -> Result<T> {
    let json_str = json_slice(string).ok_or_else(|| InvalidJSON { invalid_string: string.to_string() })?;
    Ok(from_str(json_str)?)
}

fn json_slice(string: &str) -> Option<&str> {
    let left_brace_idx = string.find('{')?;
    let right_brace_idx = string.rfind('}')?;
    (left_brace_idx < right_brace_idx).then(|| &string[left_brace_idx..=right_brace_idx])
}

/// Error when the string does not contain a JSON object.
#[derive(Debug, Clone)]
pub struct InvalidJSON {
    pub invalid_string: String,
}


impl fmt::Display for InvalidJSON {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "No JSON object found in:\n{}", self.invalid_string)
    }
}

impl Error for InvalidJSON {}


#[cfg(test)]
mod test_json {
    use serde::Deserialize;
    use crate::utils::postprocess::json::{filter_to_json, filter_to_type, InvalidJSON};

    #[test]
    fn test_filter_to_json() {
        let json_value = filter_to_json("{\"a\":\"alice\"}").unwrap();
        assert_eq!("alice", json_value["a"]);

        let json_value = filter_to_json("Here is the result you ask for: {\"a\":{\"b\":1}} Hope it helps!").unwrap();
        assert_eq!(1, json_value["a"]["b"]);

        let json_error = filter_to_json("Here is the result you ask for: {\"a\":\"alice\"").unwrap_err();
        assert!(json_error.downcast_ref::<InvalidJSON>().is_some());

        assert!(filter_to_json("} backwards {").is_err());
        assert!(filter_to_json("{{}}").is_err());
    }

    #[test]
    fn test_filter_to_type() {
        #[derive(Deserialize)]
        struct Person {
            name: String,
        }
        let person: Person = filter_to_type("```json\n{\"name\": \"Alice\"}\n```").unwrap();
        assert_eq!("Alice", person.name);
        assert!(filter_to_type::<Person>("{\"age\": 3}").is_err());
    }
}
