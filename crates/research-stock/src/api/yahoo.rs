//! Yahoo Finance API client
//!
//! Fetches the `quoteSummary` endpoint and flattens its modules into a single
//! record keyed the way Yahoo names the fields (`currentPrice`, `trailingPE`,
//! `pegRatio`, ...). Yahoo requires a session cookie plus a matching crumb;
//! both are obtained lazily and kept for the lifetime of the client.

use super::{MarketDataSource, RawRecord};
use crate::config::ResearchConfig;
use crate::error::{Result, StockError};
use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

const PROVIDER: &str = "Yahoo Finance";
const COOKIE_URL: &str = "https://fc.yahoo.com";
const CRUMB_URL: &str = "https://query1.finance.yahoo.com/v1/test/getcrumb";
const QUOTE_SUMMARY_URL: &str = "https://query2.finance.yahoo.com/v10/finance/quoteSummary";
const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Modules requested from `quoteSummary`, in precedence order for shared keys
const MODULES: [&str; 4] = [
    "financialData",
    "defaultKeyStatistics",
    "summaryDetail",
    "price",
];

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Yahoo Finance API client
///
/// One instance is a process-wide session: the cookie store, crumb and rate
/// limiter are shared by every lookup.
pub struct YahooFinanceClient {
    client: Client,
    rate_limiter: SharedRateLimiter,
    crumb: Mutex<Option<String>>,
}

impl YahooFinanceClient {
    /// Create a new client from the research configuration
    ///
    /// The session allows `rate_limit_requests` per `rate_limit_period`.
    pub fn new(config: &ResearchConfig) -> Result<Self> {
        config.validate()?;

        let burst = config.rate_limit_burst().ok_or_else(|| {
            StockError::ConfigError("rate_limit_requests must be greater than 0".to_string())
        })?;
        let quota = Quota::with_period(config.rate_limit_period / burst.get())
            .ok_or_else(|| {
                StockError::ConfigError("rate_limit_period must be greater than 0".to_string())
            })?
            .allow_burst(burst);

        let client = Client::builder()
            .cookie_store(true)
            .user_agent(USER_AGENT)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
            crumb: Mutex::new(None),
        })
    }

    /// Return the session crumb, fetching cookie and crumb on first use
    async fn crumb(&self) -> Result<String> {
        let mut guard = self.crumb.lock().await;
        if let Some(crumb) = guard.as_ref() {
            return Ok(crumb.clone());
        }

        // fc.yahoo.com answers 404 but sets the session cookie
        self.rate_limiter.until_ready().await;
        let _ = self.client.get(COOKIE_URL).send().await?;

        self.rate_limiter.until_ready().await;
        let response = self.client.get(CRUMB_URL).send().await?;
        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(StockError::RateLimitExceeded {
                provider: PROVIDER.to_string(),
            });
        }

        let crumb = response.text().await?.trim().to_string();
        if !status.is_success() || crumb.is_empty() || crumb.contains('<') {
            return Err(StockError::YahooFinanceError(format!(
                "Failed to obtain crumb (HTTP {status})"
            )));
        }

        debug!("Obtained Yahoo Finance crumb");
        *guard = Some(crumb.clone());
        Ok(crumb)
    }

    async fn invalidate_crumb(&self) {
        *self.crumb.lock().await = None;
    }
}

#[async_trait]
impl MarketDataSource for YahooFinanceClient {
    #[instrument(skip(self))]
    async fn fetch_info(&self, symbol: &str) -> Result<RawRecord> {
        let url = quote_summary_url(symbol)?;
        let crumb = self.crumb().await?;

        self.rate_limiter.until_ready().await;
        let response = self
            .client
            .get(url)
            .query(&[("modules", MODULES.join(",")), ("crumb", crumb)])
            .send()
            .await?;

        let status = response.status();
        match status {
            StatusCode::TOO_MANY_REQUESTS => {
                return Err(StockError::RateLimitExceeded {
                    provider: PROVIDER.to_string(),
                });
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                warn!("Yahoo Finance rejected the session, refreshing crumb on next call");
                self.invalidate_crumb().await;
                return Err(StockError::YahooFinanceError(format!("HTTP {status}")));
            }
            StatusCode::NOT_FOUND => {
                return Err(StockError::InvalidSymbol(symbol.to_string()));
            }
            _ if !status.is_success() => {
                return Err(StockError::YahooFinanceError(format!("HTTP {status}")));
            }
            _ => {}
        }

        let body: Value = response.json().await?;
        parse_quote_summary(symbol, &body)
    }

    fn name(&self) -> &str {
        PROVIDER
    }
}

/// `quoteSummary` URL with `symbol` as one percent-encoded path segment
fn quote_summary_url(symbol: &str) -> Result<Url> {
    let trimmed = symbol.trim();
    if trimmed.is_empty() || trimmed == "." || trimmed == ".." {
        return Err(StockError::InvalidSymbol(symbol.to_string()));
    }

    let mut url = Url::parse(QUOTE_SUMMARY_URL)
        .map_err(|e| StockError::YahooFinanceError(format!("bad endpoint URL: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| StockError::YahooFinanceError("endpoint URL cannot hold a path".to_string()))?
        .push(symbol);
    Ok(url)
}

/// Flatten a `quoteSummary` response into a single record
///
/// `{raw, fmt}` values become their raw number; empty objects and nulls are
/// dropped. When a key appears in several modules the first module in
/// [`MODULES`] wins.
fn parse_quote_summary(symbol: &str, body: &Value) -> Result<RawRecord> {
    let summary = &body["quoteSummary"];

    if let Some(description) = summary["error"]["description"].as_str() {
        return Err(StockError::DataUnavailable {
            symbol: symbol.to_string(),
            reason: description.to_string(),
        });
    }

    let result = summary["result"]
        .get(0)
        .and_then(Value::as_object)
        .ok_or_else(|| StockError::DataUnavailable {
            symbol: symbol.to_string(),
            reason: "empty quoteSummary result".to_string(),
        })?;

    let mut record = RawRecord::new();
    for module in MODULES {
        let Some(fields) = result.get(module).and_then(Value::as_object) else {
            continue;
        };
        for (key, value) in fields {
            if let Some(value) = flatten_value(value) {
                record.entry(key.clone()).or_insert(value);
            }
        }
    }

    if record.is_empty() {
        return Err(StockError::DataUnavailable {
            symbol: symbol.to_string(),
            reason: "no fields reported".to_string(),
        });
    }

    Ok(record)
}

fn flatten_value(value: &Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::Object(map) => map.get("raw").filter(|raw| !raw.is_null()).cloned(),
        Value::Array(_) => None,
        other => Some(other.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_quote_summary_flattens_modules() {
        let body = json!({
            "quoteSummary": {
                "result": [{
                    "financialData": {
                        "currentPrice": {"raw": 189.84, "fmt": "189.84"},
                        "recommendationKey": "buy"
                    },
                    "defaultKeyStatistics": {
                        "pegRatio": {"raw": 2.79, "fmt": "2.79"},
                        "priceToBook": {"raw": 47.1, "fmt": "47.10"},
                        "forwardPE": {}
                    },
                    "summaryDetail": {
                        "trailingPE": {"raw": 29.5, "fmt": "29.50"},
                        "marketCap": {"raw": 2_950_000_000_000_i64, "fmt": "2.95T"},
                        "forwardPE": {"raw": 27.1, "fmt": "27.10"}
                    },
                    "price": {
                        "regularMarketPrice": {"raw": 190.0, "fmt": "190.00"},
                        "marketCap": {"raw": 1, "fmt": "1"},
                        "currency": "USD",
                        "longName": null
                    }
                }],
                "error": null
            }
        });

        let record = parse_quote_summary("AAPL", &body).unwrap();
        assert_eq!(record["currentPrice"], json!(189.84));
        assert_eq!(record["pegRatio"], json!(2.79));
        assert_eq!(record["priceToBook"], json!(47.1));
        assert_eq!(record["trailingPE"], json!(29.5));
        assert_eq!(record["forwardPE"], json!(27.1));
        assert_eq!(record["regularMarketPrice"], json!(190.0));
        assert_eq!(record["marketCap"], json!(2_950_000_000_000_i64));
        assert_eq!(record["currency"], json!("USD"));
        assert!(!record.contains_key("longName"));
    }

    #[test]
    fn test_parse_quote_summary_error() {
        let body = json!({
            "quoteSummary": {
                "result": null,
                "error": {"code": "Not Found", "description": "Quote not found for symbol: ZZZZ"}
            }
        });

        let err = parse_quote_summary("ZZZZ", &body).unwrap_err();
        assert!(matches!(
            err,
            StockError::DataUnavailable { ref symbol, ref reason }
                if symbol == "ZZZZ" && reason.contains("Quote not found")
        ));
    }

    #[test]
    fn test_parse_quote_summary_empty_result() {
        let body = json!({"quoteSummary": {"result": [], "error": null}});
        assert!(matches!(
            parse_quote_summary("AAPL", &body),
            Err(StockError::DataUnavailable { .. })
        ));
    }

    #[test]
    fn test_quote_summary_url_encodes_symbol() {
        let url = quote_summary_url("BRK-B").unwrap();
        assert_eq!(url.path(), "/v10/finance/quoteSummary/BRK-B");

        let url = quote_summary_url("BRK/B?x#y").unwrap();
        assert_eq!(url.path(), "/v10/finance/quoteSummary/BRK%2FB%3Fx%23y");
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn test_quote_summary_url_rejects_path_symbols() {
        for symbol in ["", "  ", ".", ".."] {
            assert!(matches!(
                quote_summary_url(symbol),
                Err(StockError::InvalidSymbol(_))
            ));
        }
    }

    #[test]
    fn test_client_rejects_zero_rate_limit() {
        let config = ResearchConfig {
            rate_limit_requests: 0,
            ..ResearchConfig::default()
        };
        assert!(YahooFinanceClient::new(&config).is_err());
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_fetch_info() {
        let client = YahooFinanceClient::new(&ResearchConfig::default()).unwrap();
        let record = client.fetch_info("AAPL").await.unwrap();
        assert!(record.contains_key("marketCap"));
    }
}
