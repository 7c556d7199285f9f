//! Graph node trait and the fixed node topology

use crate::state::{RunState, StateField, StateUpdate};
use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of one of the four nodes of the analysis graph
///
/// The topology is fixed: `ingestion -> {fundamental, quant} -> synthesis`.
/// Each node declares its predecessors, the fields it reads and the single
/// field it writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeId {
    Ingestion,
    Fundamental,
    Quant,
    Synthesis,
}

impl NodeId {
    /// All nodes in a valid topological order
    pub const ALL: [NodeId; 4] = [
        NodeId::Ingestion,
        NodeId::Fundamental,
        NodeId::Quant,
        NodeId::Synthesis,
    ];

    /// Stable node name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ingestion => "ingestion",
            Self::Fundamental => "fundamental",
            Self::Quant => "quant",
            Self::Synthesis => "synthesis",
        }
    }

    /// Nodes that must complete before this one may start
    pub fn predecessors(self) -> &'static [NodeId] {
        match self {
            Self::Ingestion => &[],
            Self::Fundamental | Self::Quant => &[NodeId::Ingestion],
            Self::Synthesis => &[NodeId::Fundamental, NodeId::Quant],
        }
    }

    /// State fields this node reads
    pub fn reads(self) -> &'static [StateField] {
        match self {
            Self::Ingestion => &[StateField::Target],
            Self::Fundamental | Self::Quant => &[StateField::Target, StateField::MarketData],
            Self::Synthesis => &[
                StateField::Target,
                StateField::FundamentalAnalysis,
                StateField::QuantAnalysis,
            ],
        }
    }

    /// The one state field this node produces
    pub fn writes(self) -> StateField {
        match self {
            Self::Ingestion => StateField::MarketData,
            Self::Fundamental => StateField::FundamentalAnalysis,
            Self::Quant => StateField::QuantAnalysis,
            Self::Synthesis => StateField::FinalReport,
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unit of work in the analysis graph
///
/// Nodes receive a read-only view of the run state and return only the
/// fields they produce. They must not hold per-run mutable state: the same
/// node instance is reused across many runs and the two analysis nodes may
/// run concurrently.
#[async_trait]
pub trait Node: Send + Sync {
    /// Which slot of the graph this node fills
    fn id(&self) -> NodeId;

    /// Run the node against the current state
    async fn run(&self, state: &RunState) -> Result<StateUpdate>;

    /// Human-readable name used in logs
    fn name(&self) -> &str {
        self.id().as_str()
    }
}
