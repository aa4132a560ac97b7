use std::marker::PhantomData;
use anyhow::Result;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::filler::{FillPlaceholders, FillWith};
use crate::prompt::PartialPrompt;
use crate::utils::JsonMap;
use crate::utils::postprocess::json::filter_to_type;
use crate::utils::postprocess::OutputParser;

pub const FORMAT_INSTRUCTIONS_PLACEHOLDER: &str = "format_instructions";

/// JSON type of a field the model has to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Integer,
    Number,
    Boolean,
    StringList,
}

impl FieldType {
    fn schema(&self) -> Value {
        match self {
            FieldType::String => json!({"type": "string"}),
            FieldType::Integer => json!({"type": "integer"}),
            FieldType::Number => json!({"type": "number"}),
            FieldType::Boolean => json!({"type": "boolean"}),
            FieldType::StringList => json!({"type": "array", "items": {"type": "string"}}),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub field_type: FieldType,
    pub description: Option<String>,
}

/// Asks the model for a JSON object and deserializes the reply into `T`.
///
/// The fields are declared by hand and should match the serde shape of `T`. The parser doubles as a filler for
/// the `{{format_instructions}}` placeholder.
#[derive(Debug, Clone)]
pub struct StructuredOutputParser<T> {
    pub fields: Vec<FieldSpec>,
    placeholders: Vec<String>,
    _target: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> StructuredOutputParser<T> {
    pub fn new() -> Self {
        Self {
            fields: Vec::new(),
            placeholders: vec![FORMAT_INSTRUCTIONS_PLACEHOLDER.to_string()],
            _target: PhantomData,
        }
    }

    pub fn field(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.fields.push(FieldSpec { name: name.into(), field_type, description: None });
        self
    }

    pub fn described_field(mut self, name: impl Into<String>, field_type: FieldType, description: impl Into<String>) -> Self {
        self.fields.push(FieldSpec { name: name.into(), field_type, description: Some(description.into()) });
        self
    }

    /// JSON schema of the expected object.
    pub fn schema(&self) -> Value {
        let mut properties = JsonMap::new();
        for field in &self.fields {
            let mut schema = field.field_type.schema();
            if let (Some(description), Some(schema)) = (&field.description, schema.as_object_mut()) {
                schema.insert("description".to_string(), Value::String(description.clone()));
            }
            properties.insert(field.name.clone(), schema);
        }
        let required: Vec<&str> = self.fields.iter().map(|f| f.name.as_str()).collect();
        json!({"properties": properties, "required": required})
    }

    /// Instructions to paste into a prompt so the model answers in the expected shape.
    pub fn format_instructions(&self) -> String {
        format!("The output should be formatted as a JSON instance that conforms to the JSON schema below.\n\n\
        As an example, for the schema {{\"properties\": {{\"foo\": {{\"title\": \"Foo\", \"description\": \"a list of strings\", \
        \"type\": \"array\", \"items\": {{\"type\": \"string\"}}}}}}, \"required\": [\"foo\"]}}\n\
        the object {{\"foo\": [\"bar\", \"baz\"]}} is a well-formatted instance of the schema. \
        The object {{\"properties\": {{\"foo\": [\"bar\", \"baz\"]}}}} is not well-formatted.\n\n\
        Here is the output schema:\n```\n{}\n```", self.schema())
    }
}

impl<T: DeserializeOwned> Default for StructuredOutputParser<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DeserializeOwned + Send> OutputParser<T> for StructuredOutputParser<T> {
    fn parse(&self, text: &str) -> Result<T> {
        filter_to_type(text)
    }
}

impl<T> FillPlaceholders for StructuredOutputParser<T> {
    fn placeholders_to_fill(&self) -> &Vec<String> {
        &self.placeholders
    }
}

impl<T: DeserializeOwned> FillWith<()> for StructuredOutputParser<T> {
    fn fill_with(&self, partial_prompt: &mut PartialPrompt, context: ()) -> Result<()> {
        partial_prompt.try_fill(FORMAT_INSTRUCTIONS_PLACEHOLDER, self.format_instructions())?;
        Ok(context)
    }
}

#[cfg(test)]
mod test_structured {
    use serde::Deserialize;
    use super::*;
    use crate::prompt::{vars, PromptTemplate};

    #[derive(Debug, Deserialize, PartialEq)]
    struct ProductReview {
        rating: i64,
        pros: Vec<String>,
        cons: Vec<String>,
        recommendation: String,
    }

    fn review_parser() -> StructuredOutputParser<ProductReview> {
        StructuredOutputParser::new()
            .described_field("rating", FieldType::Integer, "Rating from 1-5")
            .field("pros", FieldType::StringList)
            .field("cons", FieldType::StringList)
            .field("recommendation", FieldType::String)
    }

    #[test]
    fn test_schema() {
        let schema = review_parser().schema();
        assert_eq!("Rating from 1-5", schema["properties"]["rating"]["description"]);
        assert_eq!("array", schema["properties"]["pros"]["type"]);
        assert_eq!(4, schema["required"].as_array().unwrap().len());
    }

    #[test]
    fn test_parse() {
        let reply = "Sure!\n```json\n{\"rating\": 5, \"pros\": [\"fast\"], \"cons\": [], \"recommendation\": \"buy\"}\n```";
        let review = review_parser().parse(reply).unwrap();
        assert_eq!(ProductReview {
            rating: 5,
            pros: vec!["fast".to_string()],
            cons: vec![],
            recommendation: "buy".to_string(),
        }, review);
        assert!(review_parser().parse("{\"rating\": \"five\"}").is_err());
    }

    #[test]
    fn test_fills_format_instructions() {
        let parser = review_parser();
        let template = PromptTemplate::new("Review this product: {{product}}\n{{format_instructions}}")
            .partial_from(&parser)
            .unwrap();
        assert_eq!(vec!["product".to_string()], template.input_variables());
        let prompt = template.format(&vars([("product", "iPhone 15")])).unwrap();
        assert!(prompt.starts_with("Review this product: iPhone 15\nThe output should be formatted as a JSON instance"));
        assert!(prompt.contains("Rating from 1-5"));
    }
}
