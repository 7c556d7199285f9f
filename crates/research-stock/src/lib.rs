//! Equity research pipeline
//!
//! Produces an investment memo for a stock ticker with a small multi-agent
//! pipeline built on [`research_workflow::AnalysisGraph`]:
//!
//! - Peer discovery asks the completion model for three competitors
//! - The fetch orchestrator collects market data for the ticker and its peers,
//!   one entity at a time with pacing and a throttle backoff
//! - The comparison engine renders P/E, PEG and Price-to-Book against the
//!   peer averages
//! - A fundamentalist and a quant analyse the report independently
//! - A strategist synthesizes both analyses into a BUY/SELL/HOLD memo
//!
//! # Example
//!
//! ```rust,ignore
//! use research_llm::{CompletionClient, LlmSettings};
//! use research_stock::{
//!     EquityResearchPipeline, ResearchConfig, ResearchServices, YahooFinanceClient,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ResearchConfig::from_env()?;
//!     let completion = CompletionClient::from_settings(&LlmSettings::from_env()?)?;
//!     let source = YahooFinanceClient::new(&config)?;
//!
//!     let services = ResearchServices::new(Arc::new(completion), Arc::new(source));
//!     let pipeline = EquityResearchPipeline::new(services, &config)?;
//!
//!     let state = pipeline.analyze("AAPL").await?;
//!     println!("{}", state.final_report);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod comparison;
pub mod config;
pub mod error;
pub mod fetch;
pub mod metrics;
pub mod nodes;
pub mod peers;
pub mod pipeline;
pub mod prompts;
pub mod provider;

#[cfg(test)]
mod testing;

pub use api::{MarketDataSource, RawRecord, YahooFinanceClient};
pub use comparison::{ComparisonReport, RatioComparison, Valuation, compare};
pub use config::{ResearchConfig, ResearchConfigBuilder};
pub use error::{Result, StockError};
pub use fetch::FetchOrchestrator;
pub use metrics::{MarketSnapshot, PeerSet, Ratio, TickerMetrics};
pub use nodes::{FundamentalNode, IngestionNode, QuantNode, SynthesisNode};
pub use peers::{FALLBACK_PEERS, PeerDiscovery};
pub use pipeline::{EquityResearchPipeline, ResearchServices};
pub use provider::DataProviderAdapter;
