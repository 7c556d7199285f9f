//! Market data provider clients

pub mod yahoo;

pub use yahoo::YahooFinanceClient;

use crate::error::Result;
use async_trait::async_trait;

/// Raw key-value record returned by a provider, keyed by its own field names
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// Lookup-by-symbol capability of an external market data provider
///
/// Implementations are long-lived session handles shared across runs.
/// Records may omit any key; normalization happens in
/// [`crate::provider::DataProviderAdapter`].
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Fetch the raw info record for `symbol`
    async fn fetch_info(&self, symbol: &str) -> Result<RawRecord>;

    /// Provider name used in logs and errors
    fn name(&self) -> &str;
}
