//! The four concrete nodes of the analysis graph
//!
//! `IngestionNode` collects market data and renders the peer comparison,
//! `FundamentalNode` and `QuantNode` each run one persona over that report,
//! and `SynthesisNode` merges both analyses into the final memo.

use crate::comparison;
use crate::error::StockError;
use crate::fetch::FetchOrchestrator;
use crate::prompts;
use async_trait::async_trait;
use research_core::{Error, Node, NodeId, Result, RunState, StateUpdate};
use research_llm::TextCompletion;
use std::sync::Arc;
use tracing::info;

/// Map a research error raised inside `node` onto the graph error taxonomy
///
/// Completion and configuration failures keep their category; everything
/// else becomes a failure of that node.
fn node_error(node: NodeId, err: StockError) -> Error {
    match err {
        StockError::Completion(_) | StockError::ConfigError(_) => err.into(),
        other => Error::NodeFailed {
            node,
            message: other.to_string(),
        },
    }
}

/// Fetches the target and its peers and writes the comparison report
pub struct IngestionNode {
    fetch: Arc<FetchOrchestrator>,
}

impl IngestionNode {
    pub fn new(fetch: Arc<FetchOrchestrator>) -> Self {
        Self { fetch }
    }
}

#[async_trait]
impl Node for IngestionNode {
    fn id(&self) -> NodeId {
        NodeId::Ingestion
    }

    async fn run(&self, state: &RunState) -> Result<StateUpdate> {
        info!("Gathering market data for {}", state.target);
        let snapshot = self
            .fetch
            .fetch_snapshot(&state.target)
            .await
            .map_err(|e| node_error(self.id(), e))?;

        let report = comparison::compare(&state.target, &snapshot);
        Ok(StateUpdate::new().with_market_data(report.into_string()))
    }
}

/// Value-investor reading of the market data report
pub struct FundamentalNode {
    completion: Arc<dyn TextCompletion>,
}

impl FundamentalNode {
    pub fn new(completion: Arc<dyn TextCompletion>) -> Self {
        Self { completion }
    }
}

#[async_trait]
impl Node for FundamentalNode {
    fn id(&self) -> NodeId {
        NodeId::Fundamental
    }

    async fn run(&self, state: &RunState) -> Result<StateUpdate> {
        let prompt = prompts::fundamental_prompt(&state.target, &state.market_data)
            .map_err(|e| node_error(self.id(), e.into()))?;
        let analysis = self.completion.complete(&prompt).await?;
        Ok(StateUpdate::new().with_fundamental_analysis(analysis))
    }
}

/// Peer-relative reading of the comparison figures
pub struct QuantNode {
    completion: Arc<dyn TextCompletion>,
}

impl QuantNode {
    pub fn new(completion: Arc<dyn TextCompletion>) -> Self {
        Self { completion }
    }
}

#[async_trait]
impl Node for QuantNode {
    fn id(&self) -> NodeId {
        NodeId::Quant
    }

    async fn run(&self, state: &RunState) -> Result<StateUpdate> {
        let prompt = prompts::quant_prompt(&state.target, &state.market_data)
            .map_err(|e| node_error(self.id(), e.into()))?;
        let analysis = self.completion.complete(&prompt).await?;
        Ok(StateUpdate::new().with_quant_analysis(analysis))
    }
}

/// Strategist memo built from both analyses
pub struct SynthesisNode {
    completion: Arc<dyn TextCompletion>,
}

impl SynthesisNode {
    pub fn new(completion: Arc<dyn TextCompletion>) -> Self {
        Self { completion }
    }
}

#[async_trait]
impl Node for SynthesisNode {
    fn id(&self) -> NodeId {
        NodeId::Synthesis
    }

    async fn run(&self, state: &RunState) -> Result<StateUpdate> {
        let prompt = prompts::synthesis_prompt(
            &state.target,
            &state.fundamental_analysis,
            &state.quant_analysis,
        )
        .map_err(|e| node_error(self.id(), e.into()))?;
        let memo = self.completion.complete(&prompt).await?;
        Ok(StateUpdate::new().with_final_report(memo))
    }
}
