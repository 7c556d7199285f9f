//! Completion backend selection
//!
//! Two backends are supported: a local Ollama server and the OpenAI API. Each
//! has a default model identifier and a determinism parameter (temperature,
//! `0.0` by default). An unknown backend name is a fatal configuration error.

use crate::providers::openai::DEFAULT_OPENAI_API_BASE;
use crate::{LLMError, Result};
use research_utils::config::{EnvLookup, read_parsed, read_string, require_string};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const DEFAULT_OLLAMA_API_BASE: &str = "http://localhost:11434/v1";
const DEFAULT_OLLAMA_MODEL: &str = "llama3.2";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
const DEFAULT_MAX_TOKENS: usize = 2048;
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Completion backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmBackend {
    /// Local Ollama server
    #[default]
    Ollama,
    /// OpenAI API, requires `OPENAI_API_KEY`
    OpenAI,
}

impl LlmBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ollama => "ollama",
            Self::OpenAI => "openai",
        }
    }

    /// Model used when none is configured
    pub fn default_model(self) -> &'static str {
        match self {
            Self::Ollama => DEFAULT_OLLAMA_MODEL,
            Self::OpenAI => DEFAULT_OPENAI_MODEL,
        }
    }

    /// API base used when none is configured
    pub fn default_api_base(self) -> &'static str {
        match self {
            Self::Ollama => DEFAULT_OLLAMA_API_BASE,
            Self::OpenAI => DEFAULT_OPENAI_API_BASE,
        }
    }
}

impl FromStr for LlmBackend {
    type Err = LLMError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "openai" => Ok(Self::OpenAI),
            _ => Err(LLMError::ConfigurationError(format!(
                "Invalid LLM backend: '{s}'. Must be 'ollama' or 'openai'"
            ))),
        }
    }
}

impl fmt::Display for LlmBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings for the completion client
#[derive(Debug, Clone, PartialEq)]
pub struct LlmSettings {
    pub backend: LlmBackend,
    pub model: String,
    pub temperature: f32,
    pub api_base: String,
    pub api_key: String,
    pub max_tokens: usize,
    pub timeout_secs: u64,
}

impl LlmSettings {
    /// Defaults for a backend; the OpenAI key is left empty
    pub fn for_backend(backend: LlmBackend) -> Self {
        Self {
            backend,
            model: backend.default_model().to_string(),
            temperature: 0.0,
            api_base: backend.default_api_base().to_string(),
            api_key: String::new(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Load settings from the process environment
    ///
    /// Reads `LLM_BACKEND`, `LLM_MODEL`, `LLM_TEMPERATURE`, `LLM_MAX_TOKENS`,
    /// `LLM_TIMEOUT_SECS`, `OLLAMA_API_BASE`, `OPENAI_API_BASE` and
    /// `OPENAI_API_KEY`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(&research_utils::env_lookup)
    }

    /// Load settings from a lookup function
    pub fn from_lookup(lookup: EnvLookup<'_>) -> Result<Self> {
        let backend = match read_string(lookup, "LLM_BACKEND") {
            Some(value) => value.parse()?,
            None => LlmBackend::default(),
        };
        Self::for_backend(backend).with_overrides(lookup)
    }

    /// Apply environment overrides on top of these settings
    pub fn with_overrides(mut self, lookup: EnvLookup<'_>) -> Result<Self> {
        if let Some(model) = read_string(lookup, "LLM_MODEL") {
            self.model = model;
        }
        if let Some(temperature) = read_parsed(lookup, "LLM_TEMPERATURE")? {
            self.temperature = temperature;
        }
        if let Some(max_tokens) = read_parsed(lookup, "LLM_MAX_TOKENS")? {
            self.max_tokens = max_tokens;
        }
        if let Some(timeout) = read_parsed(lookup, "LLM_TIMEOUT_SECS")? {
            self.timeout_secs = timeout;
        }

        match self.backend {
            LlmBackend::Ollama => {
                if let Some(base) = read_string(lookup, "OLLAMA_API_BASE") {
                    self.api_base = base;
                }
            }
            LlmBackend::OpenAI => {
                if let Some(base) = read_string(lookup, "OPENAI_API_BASE") {
                    self.api_base = base;
                }
                self.api_key = require_string(lookup, "OPENAI_API_KEY")?;
            }
        }

        self.validate()?;
        Ok(self)
    }

    /// Override the model identifier
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(LLMError::ConfigurationError(
                "model identifier must not be empty".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(LLMError::ConfigurationError(format!(
                "temperature {} is outside 0.0..=2.0",
                self.temperature
            )));
        }
        if self.max_tokens == 0 {
            return Err(LLMError::ConfigurationError(
                "max_tokens must be greater than 0".to_string(),
            ));
        }
        if self.backend == LlmBackend::OpenAI && self.api_key.is_empty() {
            return Err(LLMError::ConfigurationError(
                "OPENAI_API_KEY environment variable not set".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self::for_backend(LlmBackend::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_backend_parsing() {
        assert_eq!("ollama".parse::<LlmBackend>().unwrap(), LlmBackend::Ollama);
        assert_eq!(" OpenAI ".parse::<LlmBackend>().unwrap(), LlmBackend::OpenAI);

        let err = "anthropic".parse::<LlmBackend>().unwrap_err();
        assert!(matches!(err, LLMError::ConfigurationError(_)));
        assert!(err.to_string().contains("Must be 'ollama' or 'openai'"));
    }

    #[test]
    fn test_defaults_are_ollama() {
        let settings = LlmSettings::from_lookup(&lookup_from(&[])).unwrap();
        assert_eq!(settings.backend, LlmBackend::Ollama);
        assert_eq!(settings.model, "llama3.2");
        assert_eq!(settings.api_base, "http://localhost:11434/v1");
        assert_eq!(settings.temperature, 0.0);
    }

    #[test]
    fn test_openai_requires_key() {
        let result = LlmSettings::from_lookup(&lookup_from(&[("LLM_BACKEND", "openai")]));
        assert!(matches!(result, Err(LLMError::ConfigurationError(_))));

        let settings = LlmSettings::from_lookup(&lookup_from(&[
            ("LLM_BACKEND", "openai"),
            ("OPENAI_API_KEY", "sk-test"),
        ]))
        .unwrap();
        assert_eq!(settings.model, "gpt-4o-mini");
        assert_eq!(settings.api_key, "sk-test");
        assert_eq!(settings.api_base, "https://api.openai.com/v1");
    }

    #[test]
    fn test_invalid_backend_is_fatal() {
        let result = LlmSettings::from_lookup(&lookup_from(&[("LLM_BACKEND", "gemini")]));
        assert!(matches!(result, Err(LLMError::ConfigurationError(_))));
    }

    #[test]
    fn test_overrides() {
        let settings = LlmSettings::from_lookup(&lookup_from(&[
            ("LLM_MODEL", "qwen2.5"),
            ("LLM_TEMPERATURE", "0.2"),
            ("OLLAMA_API_BASE", "http://gpu-box:11434/v1"),
        ]))
        .unwrap();
        assert_eq!(settings.model, "qwen2.5");
        assert_eq!(settings.temperature, 0.2);
        assert_eq!(settings.api_base, "http://gpu-box:11434/v1");

        let bad = LlmSettings::from_lookup(&lookup_from(&[("LLM_TEMPERATURE", "hot")]));
        assert!(bad.is_err());
    }

    #[test]
    fn test_backend_defaults_with_model_override() {
        let settings = LlmSettings::for_backend(LlmBackend::OpenAI).with_model("gpt-4o");
        assert_eq!(settings.model, "gpt-4o");
        assert_eq!(settings.api_base, "https://api.openai.com/v1");
        assert!(settings.api_key.is_empty());
    }
}
