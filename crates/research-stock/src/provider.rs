//! Data provider adapter
//!
//! Wraps a [`MarketDataSource`] and normalizes its raw records into
//! [`TickerMetrics`]. The adapter never fails: a provider error becomes an
//! error-tagged record so callers treat "fetch failed" and "fetch succeeded
//! with missing fields" the same way.

use crate::api::{MarketDataSource, RawRecord};
use crate::error::Result;
use crate::metrics::TickerMetrics;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Normalizing front of a market data source
#[derive(Clone)]
pub struct DataProviderAdapter {
    source: Arc<dyn MarketDataSource>,
}

impl DataProviderAdapter {
    pub fn new(source: Arc<dyn MarketDataSource>) -> Self {
        Self { source }
    }

    /// Name of the wrapped provider
    pub fn provider_name(&self) -> &str {
        self.source.name()
    }

    /// Fetch and normalize `symbol`, keeping the provider's typed error
    pub async fn fetch(&self, symbol: &str) -> Result<TickerMetrics> {
        let record = self.source.fetch_info(symbol).await?;
        Ok(normalize(symbol, &record))
    }

    /// Look up `symbol` and normalize the result
    ///
    /// On provider failure the record holds only `symbol` and `error`, the
    /// latter carrying the provider's error text.
    #[instrument(skip(self))]
    pub async fn lookup(&self, symbol: &str) -> TickerMetrics {
        self.fetch(symbol).await.unwrap_or_else(|e| {
            debug!("Lookup failed for {}: {}", symbol, e);
            TickerMetrics::unavailable(symbol, e.to_string())
        })
    }
}

/// Map a raw provider record onto the fixed metrics shape
///
/// Price falls back from `currentPrice` to `regularMarketPrice`, P/E from
/// `trailingPE` to `forwardPE`. Ratios that are missing, zero or not finite
/// are reported as absent. Numbers are rounded to two decimals.
pub fn normalize(symbol: &str, record: &RawRecord) -> TickerMetrics {
    let price = first_present(record, &["currentPrice", "regularMarketPrice"])
        .map_or(0.0, |price| round2(price.max(0.0)));

    let market_cap = number(record, "marketCap").map_or(0, |cap| {
        if cap > 0.0 { cap.round() as u64 } else { 0 }
    });

    TickerMetrics {
        symbol: symbol.to_string(),
        price,
        market_cap,
        pe: first_present(record, &["trailingPE", "forwardPE"]).map(round2),
        peg: first_present(record, &["pegRatio"]).map(round2),
        price_to_book: first_present(record, &["priceToBook"]).map(round2),
        error: None,
    }
}

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// First key holding a usable (finite, non-zero) number
fn first_present(record: &RawRecord, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .filter_map(|key| number(record, key))
        .find(|value| *value != 0.0)
}

/// Read a finite number, accepting numeric strings
fn number(record: &RawRecord, key: &str) -> Option<f64> {
    let value = match record.get(key)? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    value.is_finite().then_some(value)
}
