//! Normalized market data records

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Valuation metrics for one symbol
///
/// `None` ratios mean the provider did not report the metric; they are never
/// read as zero. A record with `error` set carries no usable numbers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickerMetrics {
    pub symbol: String,
    pub price: f64,
    pub market_cap: u64,
    pub pe: Option<f64>,
    pub peg: Option<f64>,
    pub price_to_book: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TickerMetrics {
    /// Record for a failed lookup: only the symbol and the error are set
    pub fn unavailable(symbol: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// Whether this record came from a failed lookup
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Read one of the comparison ratios
    pub fn ratio(&self, ratio: Ratio) -> Option<f64> {
        match ratio {
            Ratio::PriceEarnings => self.pe,
            Ratio::Peg => self.peg,
            Ratio::PriceToBook => self.price_to_book,
        }
    }
}

/// Valuation ratios compared against the peer group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ratio {
    PriceEarnings,
    Peg,
    PriceToBook,
}

impl Ratio {
    /// Ratios in report order
    pub const ALL: [Ratio; 3] = [Ratio::PriceEarnings, Ratio::Peg, Ratio::PriceToBook];

    /// Display name used in the comparison report
    pub fn label(self) -> &'static str {
        match self {
            Self::PriceEarnings => "P/E Ratio",
            Self::Peg => "PEG Ratio",
            Self::PriceToBook => "Price-to-Book Ratio",
        }
    }
}

/// Number of peers discovered per run
pub const PEER_COUNT: usize = 3;

/// Target symbol and its discovered competitors
///
/// Duplicates and the target itself are kept as returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerSet {
    target: String,
    peers: [String; PEER_COUNT],
}

impl PeerSet {
    pub fn new(target: impl Into<String>, peers: [String; PEER_COUNT]) -> Self {
        Self {
            target: target.into(),
            peers,
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn peers(&self) -> &[String] {
        &self.peers
    }

    /// Target followed by the peers, in fetch order
    pub fn entities(&self) -> Vec<String> {
        std::iter::once(self.target.clone())
            .chain(self.peers.iter().cloned())
            .collect()
    }
}

/// Metrics for the target and its peers, collected in one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub target: TickerMetrics,
    /// Last record fetched per peer symbol
    pub peers: BTreeMap<String, TickerMetrics>,
    /// Peer symbols in discovery order
    pub peer_list: Vec<String>,
}

impl MarketSnapshot {
    pub fn new(target: TickerMetrics) -> Self {
        Self {
            target,
            peers: BTreeMap::new(),
            peer_list: Vec::new(),
        }
    }

    /// Add a peer record; a repeated symbol replaces the earlier record
    pub fn insert_peer(&mut self, metrics: TickerMetrics) {
        self.peer_list.push(metrics.symbol.clone());
        self.peers.insert(metrics.symbol.clone(), metrics);
    }

    /// Peer values present for a ratio
    pub fn peer_values(&self, ratio: Ratio) -> Vec<f64> {
        self.peers
            .values()
            .filter_map(|metrics| metrics.ratio(ratio))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(symbol: &str, pe: Option<f64>) -> TickerMetrics {
        TickerMetrics {
            symbol: symbol.to_string(),
            price: 100.0,
            pe,
            ..TickerMetrics::default()
        }
    }

    #[test]
    fn test_unavailable_record() {
        let record = TickerMetrics::unavailable("XYZ", "HTTP 404");
        assert_eq!(record.symbol, "XYZ");
        assert!(record.is_error());
        assert_eq!(record.price, 0.0);
        assert_eq!(record.market_cap, 0);
        assert_eq!(record.pe, None);
        assert_eq!(record.peg, None);
        assert_eq!(record.price_to_book, None);
    }

    #[test]
    fn test_peer_set_entities() {
        let peers = PeerSet::new(
            "AAPL",
            ["MSFT".to_string(), "GOOGL".to_string(), "META".to_string()],
        );
        assert_eq!(peers.entities(), vec!["AAPL", "MSFT", "GOOGL", "META"]);
    }

    #[test]
    fn test_snapshot_excludes_absent_values() {
        let mut snapshot = MarketSnapshot::new(metrics("AAPL", Some(30.0)));
        snapshot.insert_peer(metrics("MSFT", Some(35.0)));
        snapshot.insert_peer(metrics("GOOGL", None));
        snapshot.insert_peer(TickerMetrics::unavailable("META", "timeout"));

        assert_eq!(snapshot.peer_values(Ratio::PriceEarnings), vec![35.0]);
        assert!(snapshot.peer_values(Ratio::Peg).is_empty());
        assert_eq!(snapshot.peer_list, vec!["MSFT", "GOOGL", "META"]);
    }

    #[test]
    fn test_duplicate_peer_keeps_last_record() {
        let mut snapshot = MarketSnapshot::new(metrics("AAPL", None));
        snapshot.insert_peer(metrics("MSFT", Some(10.0)));
        snapshot.insert_peer(metrics("MSFT", Some(20.0)));

        assert_eq!(snapshot.peers.len(), 1);
        assert_eq!(snapshot.peers["MSFT"].pe, Some(20.0));
        assert_eq!(snapshot.peer_list, vec!["MSFT", "MSFT"]);
    }
}
