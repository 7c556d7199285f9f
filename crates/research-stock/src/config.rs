//! Configuration for research runs

use crate::error::{Result, StockError};
use research_utils::config::{EnvLookup, read_bool, read_parsed};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::time::Duration;

/// Configuration for market data collection and graph execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchConfig {
    /// Wait between consecutive entity lookups
    pub pacing_delay: Duration,

    /// Wait before the single retry of a throttled lookup
    pub throttle_backoff: Duration,

    /// Provider session limit: requests allowed per `rate_limit_period`
    pub rate_limit_requests: u32,

    /// Window for `rate_limit_requests`
    pub rate_limit_period: Duration,

    /// Request timeout for the market data provider
    pub request_timeout: Duration,

    /// Run the fundamental and quant analyses concurrently
    pub parallel_analysis: bool,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            pacing_delay: Duration::from_secs(15),
            throttle_backoff: Duration::from_secs(120),
            rate_limit_requests: 2,
            rate_limit_period: Duration::from_secs(5),
            request_timeout: Duration::from_secs(30),
            parallel_analysis: true,
        }
    }
}

impl ResearchConfig {
    /// Create a new configuration builder
    pub fn builder() -> ResearchConfigBuilder {
        ResearchConfigBuilder::default()
    }

    /// Load from the process environment
    ///
    /// Reads `RESEARCH_PACING_SECS`, `RESEARCH_BACKOFF_SECS`,
    /// `RESEARCH_RATE_LIMIT`, `RESEARCH_TIMEOUT_SECS` and `RESEARCH_PARALLEL`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(&research_utils::env_lookup)
    }

    /// Load from a lookup function
    pub fn from_lookup(lookup: EnvLookup<'_>) -> Result<Self> {
        let mut builder = Self::builder();

        if let Some(secs) = read_parsed::<u64>(lookup, "RESEARCH_PACING_SECS")? {
            builder = builder.pacing_delay(Duration::from_secs(secs));
        }
        if let Some(secs) = read_parsed::<u64>(lookup, "RESEARCH_BACKOFF_SECS")? {
            builder = builder.throttle_backoff(Duration::from_secs(secs));
        }
        if let Some(requests) = read_parsed::<u32>(lookup, "RESEARCH_RATE_LIMIT")? {
            builder = builder.rate_limit_requests(requests);
        }
        if let Some(secs) = read_parsed::<u64>(lookup, "RESEARCH_TIMEOUT_SECS")? {
            builder = builder.request_timeout(Duration::from_secs(secs));
        }
        if let Some(parallel) = read_bool(lookup, "RESEARCH_PARALLEL")? {
            builder = builder.parallel_analysis(parallel);
        }

        builder.build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.rate_limit_requests == 0 {
            return Err(StockError::ConfigError(
                "rate_limit_requests must be greater than 0".to_string(),
            ));
        }

        if self.rate_limit_period.is_zero() {
            return Err(StockError::ConfigError(
                "rate_limit_period must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(StockError::ConfigError(
                "request_timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Session rate limit as a burst size, `None` when disabled
    pub fn rate_limit_burst(&self) -> Option<NonZeroU32> {
        NonZeroU32::new(self.rate_limit_requests)
    }
}

/// Builder for ResearchConfig
#[derive(Debug, Default)]
pub struct ResearchConfigBuilder {
    pacing_delay: Option<Duration>,
    throttle_backoff: Option<Duration>,
    rate_limit_requests: Option<u32>,
    rate_limit_period: Option<Duration>,
    request_timeout: Option<Duration>,
    parallel_analysis: Option<bool>,
}

impl ResearchConfigBuilder {
    /// Set the wait between entity lookups
    pub fn pacing_delay(mut self, duration: Duration) -> Self {
        self.pacing_delay = Some(duration);
        self
    }

    /// Set the wait before retrying a throttled lookup
    pub fn throttle_backoff(mut self, duration: Duration) -> Self {
        self.throttle_backoff = Some(duration);
        self
    }

    /// Set the number of provider requests allowed per period
    pub fn rate_limit_requests(mut self, requests: u32) -> Self {
        self.rate_limit_requests = Some(requests);
        self
    }

    /// Set the provider rate limit window
    pub fn rate_limit_period(mut self, period: Duration) -> Self {
        self.rate_limit_period = Some(period);
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Run the two analyses concurrently or sequentially
    pub fn parallel_analysis(mut self, parallel: bool) -> Self {
        self.parallel_analysis = Some(parallel);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<ResearchConfig> {
        let defaults = ResearchConfig::default();

        let config = ResearchConfig {
            pacing_delay: self.pacing_delay.unwrap_or(defaults.pacing_delay),
            throttle_backoff: self.throttle_backoff.unwrap_or(defaults.throttle_backoff),
            rate_limit_requests: self
                .rate_limit_requests
                .unwrap_or(defaults.rate_limit_requests),
            rate_limit_period: self.rate_limit_period.unwrap_or(defaults.rate_limit_period),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            parallel_analysis: self.parallel_analysis.unwrap_or(defaults.parallel_analysis),
        };

        config.validate()?;
        Ok(config)
    }
}
