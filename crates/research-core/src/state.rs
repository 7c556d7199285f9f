//! Run state threaded through the analysis graph
//!
//! A [`RunState`] is created fresh for every ticker analysis. Nodes read it
//! through a shared reference and hand back a [`StateUpdate`] carrying only
//! the fields they produce; the runner merges those partial updates into the
//! accumulating whole.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Named fields of the run state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateField {
    /// Ticker under analysis
    Target,
    /// Peer comparison report produced by ingestion
    MarketData,
    /// Fundamentalist analysis text
    FundamentalAnalysis,
    /// Quant analysis text
    QuantAnalysis,
    /// Strategist memo, the terminal output
    FinalReport,
}

impl StateField {
    /// Field name as it appears in serialized state
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Target => "target",
            Self::MarketData => "market_data",
            Self::FundamentalAnalysis => "fundamental_analysis",
            Self::QuantAnalysis => "quant_analysis",
            Self::FinalReport => "final_report",
        }
    }
}

impl fmt::Display for StateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State value threaded through the graph for a single run
///
/// All fields except `target` start empty.
///
/// # Example
///
/// ```
/// use research_core::{RunState, StateField, StateUpdate};
///
/// let mut state = RunState::new("AAPL");
/// assert!(!state.is_set(StateField::MarketData));
///
/// state.apply(StateUpdate::new().with_market_data("report"));
/// assert_eq!(state.market_data, "report");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunState {
    pub target: String,
    pub market_data: String,
    pub fundamental_analysis: String,
    pub quant_analysis: String,
    pub final_report: String,
}

impl RunState {
    /// Create the initial state for a ticker
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..Self::default()
        }
    }

    /// Borrow a field by name
    pub fn field(&self, field: StateField) -> &str {
        match field {
            StateField::Target => &self.target,
            StateField::MarketData => &self.market_data,
            StateField::FundamentalAnalysis => &self.fundamental_analysis,
            StateField::QuantAnalysis => &self.quant_analysis,
            StateField::FinalReport => &self.final_report,
        }
    }

    /// Whether a field holds a non-empty value
    pub fn is_set(&self, field: StateField) -> bool {
        !self.field(field).is_empty()
    }

    /// Merge a partial update into this state
    ///
    /// Only the fields present in the update are overwritten.
    pub fn apply(&mut self, update: StateUpdate) {
        if let Some(value) = update.market_data {
            self.market_data = value;
        }
        if let Some(value) = update.fundamental_analysis {
            self.fundamental_analysis = value;
        }
        if let Some(value) = update.quant_analysis {
            self.quant_analysis = value;
        }
        if let Some(value) = update.final_report {
            self.final_report = value;
        }
    }
}

/// Partial update returned by a node
///
/// `target` is never part of an update: it is fixed when the run starts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fundamental_analysis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quant_analysis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_report: Option<String>,
}

impl StateUpdate {
    /// Create an empty update
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an update that sets a single field
    ///
    /// Setting [`StateField::Target`] is ignored.
    pub fn single(field: StateField, value: impl Into<String>) -> Self {
        let value = Some(value.into());
        let mut update = Self::new();
        match field {
            StateField::Target => {}
            StateField::MarketData => update.market_data = value,
            StateField::FundamentalAnalysis => update.fundamental_analysis = value,
            StateField::QuantAnalysis => update.quant_analysis = value,
            StateField::FinalReport => update.final_report = value,
        }
        update
    }

    pub fn with_market_data(mut self, value: impl Into<String>) -> Self {
        self.market_data = Some(value.into());
        self
    }

    pub fn with_fundamental_analysis(mut self, value: impl Into<String>) -> Self {
        self.fundamental_analysis = Some(value.into());
        self
    }

    pub fn with_quant_analysis(mut self, value: impl Into<String>) -> Self {
        self.quant_analysis = Some(value.into());
        self
    }

    pub fn with_final_report(mut self, value: impl Into<String>) -> Self {
        self.final_report = Some(value.into());
        self
    }

    /// Fields carried by this update, in declaration order
    pub fn fields(&self) -> Vec<StateField> {
        let mut fields = Vec::new();
        if self.market_data.is_some() {
            fields.push(StateField::MarketData);
        }
        if self.fundamental_analysis.is_some() {
            fields.push(StateField::FundamentalAnalysis);
        }
        if self.quant_analysis.is_some() {
            fields.push(StateField::QuantAnalysis);
        }
        if self.final_report.is_some() {
            fields.push(StateField::FinalReport);
        }
        fields
    }

    /// Check if the update carries no fields
    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }
}

/// Lifecycle of a single graph execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    Pending,
    Ingesting,
    Analyzing,
    Synthesizing,
    Done,
}

impl RunPhase {
    /// The phase that follows this one, `None` once done
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Pending => Some(Self::Ingesting),
            Self::Ingesting => Some(Self::Analyzing),
            Self::Analyzing => Some(Self::Synthesizing),
            Self::Synthesizing => Some(Self::Done),
            Self::Done => None,
        }
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "PENDING",
            Self::Ingesting => "INGESTING",
            Self::Analyzing => "ANALYZING",
            Self::Synthesizing => "SYNTHESIZING",
            Self::Done => "DONE",
        };
        f.write_str(name)
    }
}
