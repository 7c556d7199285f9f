//! Error types for market data and research operations

use thiserror::Error;

/// Research pipeline specific errors
#[derive(Debug, Error)]
pub enum StockError {
    /// API request failed
    #[error("API error: {0}")]
    ApiError(String),

    /// Invalid stock symbol provided
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// Data not available for the requested symbol
    #[error("Data not available for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    /// The provider answered with HTTP 429 / Too Many Requests
    #[error("429 Too Many Requests from {provider}")]
    RateLimitExceeded { provider: String },

    /// Network or HTTP error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Yahoo Finance API error
    #[error("Yahoo Finance error: {0}")]
    YahooFinanceError(String),

    /// Text completion failed
    #[error("Completion failed: {0}")]
    Completion(#[from] research_llm::LLMError),

    /// Prompt template failed to render
    #[error("Prompt error: {0}")]
    PromptError(#[from] minijinja::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl StockError {
    /// Whether this error signals that the provider is throttling us
    ///
    /// Only provider-reported failures are inspected: the typed variant, an
    /// HTTP 429 status, or a provider message saying so. Symbol and data
    /// errors never count, whatever text they carry.
    pub fn is_throttling(&self) -> bool {
        match self {
            Self::RateLimitExceeded { .. } => true,
            Self::NetworkError(e) => e.status() == Some(reqwest::StatusCode::TOO_MANY_REQUESTS),
            Self::ApiError(message) | Self::YahooFinanceError(message) | Self::Other(message) => {
                is_throttling_message(message)
            }
            _ => false,
        }
    }
}

fn is_throttling_message(message: &str) -> bool {
    message.contains("429") || message.to_ascii_lowercase().contains("too many requests")
}

/// Result type alias for research operations
pub type Result<T> = std::result::Result<T, StockError>;

/// Convert StockError to research_core::Error
impl From<StockError> for research_core::Error {
    fn from(err: StockError) -> Self {
        match err {
            StockError::Completion(e) => e.into(),
            StockError::ConfigError(msg) => research_core::Error::Config(msg),
            other => research_core::Error::Generic(other.to_string()),
        }
    }
}

impl From<research_core::Error> for StockError {
    fn from(err: research_core::Error) -> Self {
        match err {
            research_core::Error::Config(msg) => StockError::ConfigError(msg),
            other => StockError::Other(other.to_string()),
        }
    }
}

impl From<research_utils::ConfigError> for StockError {
    fn from(err: research_utils::ConfigError) -> Self {
        StockError::ConfigError(err.to_string())
    }
}
