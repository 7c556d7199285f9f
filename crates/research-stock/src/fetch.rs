//! Multi-entity fetch orchestration
//!
//! Fetches the target and its peers one at a time, pausing between lookups
//! to stay under the provider's rate limit. A throttled lookup gets one
//! retry after a long backoff; any other failure is kept as an error record.
//! A single entity failing never aborts the batch.

use crate::config::ResearchConfig;
use crate::error::Result;
use crate::metrics::{MarketSnapshot, PeerSet, TickerMetrics};
use crate::peers::PeerDiscovery;
use crate::provider::DataProviderAdapter;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Sequential, rate-limit aware collector of [`MarketSnapshot`]s
pub struct FetchOrchestrator {
    discovery: PeerDiscovery,
    adapter: DataProviderAdapter,
    pacing_delay: Duration,
    throttle_backoff: Duration,
}

impl FetchOrchestrator {
    pub fn new(
        discovery: PeerDiscovery,
        adapter: DataProviderAdapter,
        config: &ResearchConfig,
    ) -> Self {
        Self {
            discovery,
            adapter,
            pacing_delay: config.pacing_delay,
            throttle_backoff: config.throttle_backoff,
        }
    }

    /// Discover peers for `symbol` and fetch metrics for all of them
    ///
    /// Only a completion failure during peer discovery is returned as an
    /// error; lookup failures end up as error records in the snapshot.
    #[instrument(skip(self))]
    pub async fn fetch_snapshot(&self, symbol: &str) -> Result<MarketSnapshot> {
        let peer_set = self.discovery.discover(symbol).await?;
        Ok(self.fetch_peer_set(&peer_set).await)
    }

    /// Fetch the target and its peers strictly in order
    pub async fn fetch_peer_set(&self, peer_set: &PeerSet) -> MarketSnapshot {
        let entities = peer_set.entities();
        info!(
            "Fetching data for {} and peers: {}",
            peer_set.target(),
            peer_set.peers().join(", ")
        );

        let mut records = Vec::with_capacity(entities.len());
        for (idx, symbol) in entities.iter().enumerate() {
            records.push(self.fetch_entity(symbol).await);

            if idx + 1 < entities.len() {
                info!("Waiting {:?} before next request", self.pacing_delay);
                tokio::time::sleep(self.pacing_delay).await;
            }
        }

        let mut records = records.into_iter();
        let target = records
            .next()
            .unwrap_or_else(|| TickerMetrics::unavailable(peer_set.target(), "not fetched"));

        let mut snapshot = MarketSnapshot::new(target);
        for record in records {
            snapshot.insert_peer(record);
        }
        snapshot
    }

    async fn fetch_entity(&self, symbol: &str) -> TickerMetrics {
        info!("Fetching {}", symbol);
        let err = match self.adapter.fetch(symbol).await {
            Ok(metrics) => return metrics,
            Err(e) => e,
        };

        if !err.is_throttling() {
            warn!("Error fetching {}: {}", symbol, err);
            return TickerMetrics::unavailable(symbol, err.to_string());
        }

        warn!(
            "Rate limited on {}. Waiting {:?} before retrying",
            symbol, self.throttle_backoff
        );
        tokio::time::sleep(self.throttle_backoff).await;

        let retry = self.adapter.lookup(symbol).await;
        match retry.error.as_deref() {
            None => info!("Retry successful for {}", symbol),
            Some(error) => warn!("Failed after retry for {}: {}", symbol, error),
        }
        retry
    }
}
