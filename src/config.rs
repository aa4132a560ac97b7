//! # Workshop configuration
//!
//! All settings come from environment variables so that every demo reads the same `.env` file.
//! API key and base URL tolerate sloppy quoting such as `OPENAI_API_KEY="sk-..."`.

use std::convert::Infallible;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::utils::llm::ChatModel;
use crate::utils::llm::demo::DemoChat;
use crate::utils::llm::openai::{ConversationConfig, OpenAIChat};

pub const DEFAULT_SENTINEL_DIR: &str = "/root";

/// Which of the configured models to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ModelKind {
    #[default]
    Default,
    Fast,
    Coding,
    Creative,
}

impl FromStr for ModelKind {
    type Err = Infallible;

    /// Unknown names map to [ModelKind::Default].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "fast" => ModelKind::Fast,
            "coding" => ModelKind::Coding,
            "creative" => ModelKind::Creative,
            _ => ModelKind::Default,
        })
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModelKind::Default => "default",
            ModelKind::Fast => "fast",
            ModelKind::Coding => "coding",
            ModelKind::Creative => "creative",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be an integer, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },

    #[error("OPENAI_API_BASE is not a valid URL: {0}")]
    InvalidApiBase(#[from] url::ParseError),
}

/// Centralized configuration shared by every demo.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkshopConfig {
    pub api_base: String,
    pub api_key: String,
    pub use_real_api: bool,
    pub default_model: String,
    pub fast_model: String,
    pub coding_model: String,
    pub creative_model: String,
    /// Request timeout in seconds
    pub api_timeout: u64,
    pub max_tokens: u32,
    pub debug_mode: bool,
    /// Where sentinel files are written
    pub sentinel_dir: PathBuf,
}

/// Trim whitespace, then surrounding double quotes, then surrounding single quotes.
pub fn strip_quotes(value: &str) -> &str {
    value.trim().trim_matches('"').trim_matches('\'')
}

fn parse_flag(value: Option<String>) -> bool {
    value.map_or(false, |v| v.to_lowercase() == "true")
}

fn parse_number<T: FromStr>(name: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(value) => value.trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { name, value }),
    }
}

impl WorkshopConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration from any variable source. Unset variables take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let string_or = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());
        Ok(Self {
            api_base: strip_quotes(&string_or("OPENAI_API_BASE", "")).to_string(),
            api_key: strip_quotes(&string_or("OPENAI_API_KEY", "")).to_string(),
            use_real_api: parse_flag(lookup("USE_REAL_API")),
            default_model: string_or("DEFAULT_MODEL", "gpt-4"),
            fast_model: string_or("FAST_MODEL", "gpt-3.5-turbo"),
            coding_model: string_or("CODING_MODEL", "gpt-4"),
            creative_model: string_or("CREATIVE_MODEL", "gpt-4"),
            api_timeout: parse_number("API_TIMEOUT", lookup("API_TIMEOUT"), 30)?,
            max_tokens: parse_number("MAX_TOKENS", lookup("MAX_TOKENS"), 1000)?,
            debug_mode: parse_flag(lookup("DEBUG_MODE")),
            sentinel_dir: PathBuf::from(string_or("WORKSHOP_SENTINEL_DIR", DEFAULT_SENTINEL_DIR)),
        })
    }

    /// True iff an API key and base URL are present and real API use is switched on.
    pub fn is_api_configured(&self) -> bool {
        !self.api_key.is_empty() && !self.api_base.is_empty() && self.use_real_api
    }

    pub fn model_name(&self, kind: ModelKind) -> &str {
        match kind {
            ModelKind::Default => &self.default_model,
            ModelKind::Fast => &self.fast_model,
            ModelKind::Coding => &self.coding_model,
            ModelKind::Creative => &self.creative_model,
        }
    }

    pub fn conversation_config(&self, kind: ModelKind, temperature: f32) -> ConversationConfig {
        ConversationConfig {
            model: self.model_name(kind).to_string(),
            temperature,
            max_tokens: Some(self.max_tokens),
            timeout: Duration::from_secs(self.api_timeout),
        }
    }

    /// A configured chat model, or `None` in demo mode.
    pub fn get_model(&self, kind: ModelKind, temperature: f32) -> anyhow::Result<Option<OpenAIChat>> {
        if !self.is_api_configured() {
            return Ok(None);
        }
        let api_base = Url::parse(&self.api_base).map_err(ConfigError::from)?;
        let model = OpenAIChat::new(&self.api_key, &api_base, self.conversation_config(kind, temperature))?;
        Ok(Some(model))
    }

    /// Like [WorkshopConfig::get_model], but hands out a [DemoChat] in demo mode.
    pub fn model_or_demo(&self, kind: ModelKind, temperature: f32) -> anyhow::Result<Arc<dyn ChatModel>> {
        Ok(match self.get_model(kind, temperature)? {
            Some(model) => Arc::new(model),
            None => Arc::new(DemoChat::new(kind)),
        })
    }

    /// Printable summary of the configuration. The API key is masked.
    pub fn status(&self) -> ConfigStatus<'_> {
        ConfigStatus(self)
    }
}

/// Display helper returned by [WorkshopConfig::status].
pub struct ConfigStatus<'a>(&'a WorkshopConfig);

impl fmt::Display for ConfigStatus<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let config = self.0;
        let api_base = if config.api_base.is_empty() { "Not configured" } else { config.api_base.as_str() };
        let api_key = if config.api_key.is_empty() {
            "Not configured".to_string()
        } else {
            let chars: Vec<char> = config.api_key.chars().collect();
            let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
            format!("***{}", tail)
        };
        let mode = if config.is_api_configured() { "Enabled" } else { "Demo mode" };
        writeln!(f, "Workshop Configuration:")?;
        writeln!(f, "   API Base: {}", api_base)?;
        writeln!(f, "   API Key: {}", api_key)?;
        writeln!(f, "   Real API: {}", mode)?;
        writeln!(f, "   Default Model: {}", config.default_model)?;
        writeln!(f, "   Fast Model: {}", config.fast_model)?;
        writeln!(f, "   Coding Model: {}", config.coding_model)?;
        writeln!(f, "   Creative Model: {}", config.creative_model)
    }
}

#[cfg(test)]
mod test_config {
    use std::collections::HashMap;
    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<WorkshopConfig, ConfigError> {
        let env: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        WorkshopConfig::from_lookup(|name| env.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!("", config.api_base);
        assert_eq!("", config.api_key);
        assert!(!config.use_real_api);
        assert_eq!("gpt-4", config.default_model);
        assert_eq!("gpt-3.5-turbo", config.fast_model);
        assert_eq!("gpt-4", config.coding_model);
        assert_eq!("gpt-4", config.creative_model);
        assert_eq!(30, config.api_timeout);
        assert_eq!(1000, config.max_tokens);
        assert!(!config.debug_mode);
        assert_eq!(PathBuf::from("/root"), config.sentinel_dir);
    }

    #[test]
    fn test_quotes_are_stripped() {
        let config = config_from(&[
            ("OPENAI_API_BASE", "  \"http://localhost:4000\" "),
            ("OPENAI_API_KEY", "'sk-abc123'"),
        ]).unwrap();
        assert_eq!("http://localhost:4000", config.api_base);
        assert_eq!("sk-abc123", config.api_key);
        assert_eq!("sk", strip_quotes("\"'sk'\""));
    }

    #[test]
    fn test_flags() {
        let config = config_from(&[("USE_REAL_API", "TRUE"), ("DEBUG_MODE", "yes")]).unwrap();
        assert!(config.use_real_api);
        assert!(!config.debug_mode);
    }

    #[test]
    fn test_invalid_numbers() {
        let err = config_from(&[("API_TIMEOUT", "soon")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNumber { name: "API_TIMEOUT", .. }));
        assert_eq!(50, config_from(&[("MAX_TOKENS", " 50 ")]).unwrap().max_tokens);
    }

    #[test]
    fn test_is_api_configured_needs_all_three() {
        let key = ("OPENAI_API_KEY", "sk-1");
        let base = ("OPENAI_API_BASE", "http://localhost:4000");
        let enabled = ("USE_REAL_API", "true");
        assert!(config_from(&[key, base, enabled]).unwrap().is_api_configured());
        assert!(!config_from(&[base, enabled]).unwrap().is_api_configured());
        assert!(!config_from(&[key, enabled]).unwrap().is_api_configured());
        assert!(!config_from(&[key, base]).unwrap().is_api_configured());
        assert!(!config_from(&[key, base, ("USE_REAL_API", "false")]).unwrap().is_api_configured());
        assert!(!config_from(&[("OPENAI_API_KEY", "\"\""), base, enabled]).unwrap().is_api_configured());
    }

    #[test]
    fn test_model_kinds() {
        let config = config_from(&[("FAST_MODEL", "openai/gpt-4.1-mini")]).unwrap();
        assert_eq!("openai/gpt-4.1-mini", config.model_name(ModelKind::Fast));
        let unknown: ModelKind = "turbo".parse().unwrap();
        assert_eq!(ModelKind::Default, unknown);
        assert_eq!(ModelKind::Creative, "Creative".parse().unwrap());
    }

    #[test]
    fn test_get_model() {
        let config = config_from(&[]).unwrap();
        assert!(config.get_model(ModelKind::Default, 0.0).unwrap().is_none());

        let config = config_from(&[
            ("OPENAI_API_KEY", "sk-1"),
            ("OPENAI_API_BASE", "http://localhost:4000"),
            ("USE_REAL_API", "true"),
            ("API_TIMEOUT", "5"),
        ]).unwrap();
        let model = config.get_model(ModelKind::Fast, 0.7).unwrap().unwrap();
        assert_eq!("gpt-3.5-turbo", model.config.model);
        assert_eq!(0.7, model.config.temperature);
        assert_eq!(Some(1000), model.config.max_tokens);
        assert_eq!(Duration::from_secs(5), model.config.timeout);

        let bad = WorkshopConfig { api_base: "not a url".to_string(), ..config };
        assert!(bad.get_model(ModelKind::Default, 0.0).is_err());
    }

    #[test]
    fn test_status_masks_key() {
        let config = config_from(&[("OPENAI_API_KEY", "sk-secret-9876")]).unwrap();
        let status = config.status().to_string();
        assert!(status.contains("API Key: ***9876"));
        assert!(!status.contains("secret"));
        assert!(status.contains("API Base: Not configured"));
        assert!(status.contains("Real API: Demo mode"));
    }
}
