//! Prompt-in, text-out completion client

use crate::providers::{OpenAIConfig, OpenAIProvider};
use crate::{CompletionRequest, LLMProvider, LlmSettings, Message, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, instrument};

/// The single capability analysis nodes need from a language model
///
/// Given a prompt, return text. Failures surface as [`crate::LLMError`],
/// which converts into a completion error at the graph level.
#[async_trait]
pub trait TextCompletion: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// [`TextCompletion`] backed by an [`LLMProvider`]
pub struct CompletionClient {
    provider: Arc<dyn LLMProvider>,
    model: String,
    temperature: f32,
    max_tokens: usize,
}

impl CompletionClient {
    pub fn new(provider: Arc<dyn LLMProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.0,
            max_tokens: 2048,
        }
    }

    /// Build a client for the configured backend
    pub fn from_settings(settings: &LlmSettings) -> Result<Self> {
        settings.validate()?;

        let config = OpenAIConfig::new(settings.api_key.clone())
            .with_api_base(settings.api_base.clone())
            .with_timeout(settings.timeout_secs)
            .with_name(settings.backend.as_str());
        let provider = OpenAIProvider::with_config(config)?;

        Ok(Self::new(Arc::new(provider), settings.model.clone())
            .with_temperature(settings.temperature)
            .with_max_tokens(settings.max_tokens))
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }
}

#[async_trait]
impl TextCompletion for CompletionClient {
    #[instrument(skip(self, prompt), fields(provider = %self.provider.name(), model = %self.model))]
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = CompletionRequest::builder(self.model.clone())
            .add_message(Message::user(prompt))
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build();

        let response = self.provider.complete(request).await?;
        debug!(tokens = response.usage.total(), "completion received");
        Ok(response.message.text().to_string())
    }
}
