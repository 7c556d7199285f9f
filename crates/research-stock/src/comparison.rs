//! Peer comparison engine
//!
//! Compares the target's valuation ratios with the peer-group averages and
//! renders the market data report handed to the analyst nodes. The report is
//! a pure function of the snapshot: the same snapshot always renders the same
//! text.

use crate::metrics::{MarketSnapshot, Ratio};
use std::fmt;

const RULE_WIDTH: usize = 60;

/// Whether the target trades above or below its peer average
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Valuation {
    Premium,
    Discount,
}

impl Valuation {
    /// Positive deviation is a premium; zero or negative is a discount
    pub fn from_deviation(deviation: f64) -> Self {
        if deviation > 0.0 {
            Self::Premium
        } else {
            Self::Discount
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Premium => "PREMIUM",
            Self::Discount => "DISCOUNT",
        }
    }
}

impl fmt::Display for Valuation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target value against the peer average for one ratio
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatioComparison {
    pub ratio: Ratio,
    pub target: f64,
    pub peer_average: f64,
    /// Signed percentage deviation of the target from the average
    pub deviation: f64,
}

impl RatioComparison {
    /// Compare one ratio; `None` when either side is not available
    pub fn compute(ratio: Ratio, snapshot: &MarketSnapshot) -> Option<Self> {
        let target = snapshot.target.ratio(ratio)?;
        let peer_average = peer_average(&snapshot.peer_values(ratio))?;
        let deviation = percentage_deviation(target, peer_average)?;

        Some(Self {
            ratio,
            target,
            peer_average,
            deviation,
        })
    }

    pub fn valuation(&self) -> Valuation {
        Valuation::from_deviation(self.deviation)
    }
}

/// Arithmetic mean, `None` for an empty slice
pub fn peer_average(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// `(target - average) / average * 100`, `None` when the average is zero
pub fn percentage_deviation(target: f64, average: f64) -> Option<f64> {
    if average == 0.0 {
        return None;
    }
    Some((target - average) / average * 100.0)
}

/// Rendered peer comparison report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonReport {
    text: String,
}

impl ComparisonReport {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl fmt::Display for ComparisonReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Build the comparison report for `symbol`
///
/// Never fails: a ratio without a target value or without any peer value is
/// reported as "Data not available".
pub fn compare(symbol: &str, snapshot: &MarketSnapshot) -> ComparisonReport {
    let rule = "=".repeat(RULE_WIDTH);
    let target = &snapshot.target;

    let mut lines = vec![
        rule.clone(),
        format!("PEER COMPARISON ANALYSIS FOR {symbol}"),
        rule.clone(),
        String::new(),
        format!("Main Ticker: {symbol}"),
        format!("Price: ${}", format_price(target.price)),
        format!("Market Cap: ${}", format_thousands(target.market_cap)),
        String::new(),
        format!("Peer Group: {}", snapshot.peer_list.join(", ")),
        String::new(),
        "--- VALUATION METRICS ---".to_string(),
        String::new(),
    ];

    for ratio in Ratio::ALL {
        match RatioComparison::compute(ratio, snapshot) {
            Some(comparison) => {
                lines.push(format!("{}:", ratio.label()));
                lines.push(format!("  {symbol}: {}", format_number(comparison.target)));
                lines.push(format!("  Peer Avg: {:.2}", comparison.peer_average));
                lines.push(format!(
                    "  Difference: {:+.1}% ({})",
                    comparison.deviation,
                    comparison.valuation()
                ));
            }
            None => lines.push(format!("{}: Data not available", ratio.label())),
        }
        lines.push(String::new());
    }

    lines.push(rule);

    ComparisonReport {
        text: lines.join("\n"),
    }
}

/// Shortest round-trip form, keeping one decimal for whole numbers
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

/// A missing price prints as a bare `0`
fn format_price(price: f64) -> String {
    if price == 0.0 {
        "0".to_string()
    } else {
        format_number(price)
    }
}

fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
