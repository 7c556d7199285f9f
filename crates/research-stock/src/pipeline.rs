//! Equity research pipeline facade
//!
//! Wires the shared completion client and market data source into the four
//! nodes and the analysis graph. The pipeline is built once and reused for
//! every ticker; each call to [`EquityResearchPipeline::analyze`] is an
//! independent run with its own state.

use crate::api::MarketDataSource;
use crate::config::ResearchConfig;
use crate::error::Result;
use crate::fetch::FetchOrchestrator;
use crate::nodes::{FundamentalNode, IngestionNode, QuantNode, SynthesisNode};
use crate::peers::PeerDiscovery;
use crate::provider::DataProviderAdapter;
use research_core::RunState;
use research_llm::TextCompletion;
use research_workflow::AnalysisGraph;
use std::sync::Arc;
use tracing::info;

/// Process-wide handles shared by every run
#[derive(Clone)]
pub struct ResearchServices {
    pub completion: Arc<dyn TextCompletion>,
    pub source: Arc<dyn MarketDataSource>,
}

impl ResearchServices {
    pub fn new(completion: Arc<dyn TextCompletion>, source: Arc<dyn MarketDataSource>) -> Self {
        Self { completion, source }
    }
}

/// Ingest, analyse and synthesise a research memo for one ticker at a time
pub struct EquityResearchPipeline {
    graph: AnalysisGraph,
}

impl EquityResearchPipeline {
    /// Build the graph from shared services
    pub fn new(services: ResearchServices, config: &ResearchConfig) -> Result<Self> {
        config.validate()?;

        let fetch = FetchOrchestrator::new(
            PeerDiscovery::new(Arc::clone(&services.completion)),
            DataProviderAdapter::new(services.source),
            config,
        );

        let graph = AnalysisGraph::builder()
            .node(Arc::new(IngestionNode::new(Arc::new(fetch))))
            .node(Arc::new(FundamentalNode::new(Arc::clone(&services.completion))))
            .node(Arc::new(QuantNode::new(Arc::clone(&services.completion))))
            .node(Arc::new(SynthesisNode::new(services.completion)))
            .parallel(config.parallel_analysis)
            .build()?;

        Ok(Self { graph })
    }

    /// Run the full analysis for `ticker`
    ///
    /// Returns the completed state; the memo is in `final_report`. Any node
    /// failure ends the run and is returned unchanged.
    pub async fn analyze(&self, ticker: &str) -> research_core::Result<RunState> {
        info!("Starting analysis for {}", ticker);
        let state = self.graph.run(ticker).await?;
        info!("Analysis complete for {}", ticker);
        Ok(state)
    }

    pub fn graph(&self) -> &AnalysisGraph {
        &self.graph
    }
}
