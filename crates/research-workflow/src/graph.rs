//! Fixed analysis graph and its runner

use research_core::{Error, Node, NodeId, Result, RunPhase, RunState, StateUpdate};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{Instrument, debug, info, info_span};

/// The four-node analysis graph
///
/// `ingestion` runs first, `fundamental` and `quant` run once it has
/// completed (concurrently unless the graph is built sequential), and
/// `synthesis` runs after both analyses. Every node receives a read-only view
/// of the state accumulated so far and returns only the field it produces.
///
/// A node failure is not caught: it ends the run and is returned to the
/// caller. The partially filled state is dropped with it.
///
/// # Example
///
/// ```no_run
/// use research_workflow::AnalysisGraph;
/// # use research_core::Node;
/// # use std::sync::Arc;
///
/// # async fn example(nodes: Vec<Arc<dyn Node>>) -> research_core::Result<()> {
/// let mut builder = AnalysisGraph::builder();
/// for node in nodes {
///     builder = builder.node(node);
/// }
/// let graph = builder.build()?;
///
/// let state = graph.run("AAPL").await?;
/// println!("{}", state.final_report);
/// # Ok(())
/// # }
/// ```
pub struct AnalysisGraph {
    nodes: BTreeMap<NodeId, Arc<dyn Node>>,
    parallel: bool,
}

impl AnalysisGraph {
    /// Create a new graph builder
    pub fn builder() -> AnalysisGraphBuilder {
        AnalysisGraphBuilder::new()
    }

    /// Whether the two analysis nodes run concurrently
    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    /// Execute one run for `target`
    ///
    /// Returns the completed state; `final_report` holds the terminal output.
    pub async fn run(&self, target: impl Into<String>) -> Result<RunState> {
        let mut run = GraphRun::new(target.into());
        let span = info_span!("analysis_run", ticker = %run.state.target);

        self.run_phases(&mut run).instrument(span).await?;
        Ok(run.state)
    }

    async fn run_phases(&self, run: &mut GraphRun) -> Result<()> {
        run.advance(RunPhase::Ingesting)?;
        let update = self.execute(NodeId::Ingestion, run).await?;
        run.merge(NodeId::Ingestion, update)?;

        run.advance(RunPhase::Analyzing)?;
        let (fundamental, quant) = if self.parallel {
            tokio::try_join!(
                self.execute(NodeId::Fundamental, run),
                self.execute(NodeId::Quant, run),
            )?
        } else {
            let fundamental = self.execute(NodeId::Fundamental, run).await?;
            let quant = self.execute(NodeId::Quant, run).await?;
            (fundamental, quant)
        };
        run.merge(NodeId::Fundamental, fundamental)?;
        run.merge(NodeId::Quant, quant)?;

        run.advance(RunPhase::Synthesizing)?;
        let update = self.execute(NodeId::Synthesis, run).await?;
        run.merge(NodeId::Synthesis, update)?;

        run.advance(RunPhase::Done)
    }

    fn node(&self, id: NodeId) -> Result<&Arc<dyn Node>> {
        self.nodes
            .get(&id)
            .ok_or_else(|| Error::Config(format!("No node registered for '{id}'")))
    }

    async fn execute(&self, id: NodeId, run: &GraphRun) -> Result<StateUpdate> {
        run.check_ready(id)?;
        let node = self.node(id)?;

        let span = info_span!("node", node = %id, ticker = %run.state.target);
        info!(parent: &span, "Running node {}", node.name());
        let update = node.run(&run.state).instrument(span.clone()).await?;
        debug!(parent: &span, "Node {} produced {:?}", id, update.fields());
        Ok(update)
    }
}

/// Mutable bookkeeping for a single run
struct GraphRun {
    state: RunState,
    phase: RunPhase,
    completed: BTreeSet<NodeId>,
}

impl GraphRun {
    fn new(target: String) -> Self {
        Self {
            state: RunState::new(target),
            phase: RunPhase::Pending,
            completed: BTreeSet::new(),
        }
    }

    /// Move to the next phase; phases are never skipped
    fn advance(&mut self, to: RunPhase) -> Result<()> {
        if self.phase.next() != Some(to) {
            return Err(Error::Generic(format!(
                "Invalid phase transition {} -> {}",
                self.phase, to
            )));
        }
        info!("{} -> {}", self.phase, to);
        self.phase = to;
        Ok(())
    }

    fn check_ready(&self, id: NodeId) -> Result<()> {
        match id
            .predecessors()
            .iter()
            .find(|pred| !self.completed.contains(*pred))
        {
            Some(missing) => Err(Error::DependencyNotSatisfied {
                node: id,
                missing: *missing,
            }),
            None => Ok(()),
        }
    }

    /// Merge a node's update, rejecting writes outside its output field
    fn merge(&mut self, id: NodeId, update: StateUpdate) -> Result<()> {
        let output = id.writes();
        let fields = update.fields();

        if let Some(field) = fields.iter().find(|field| **field != output) {
            return Err(Error::InvalidUpdate {
                node: id,
                field: *field,
            });
        }
        if !fields.contains(&output) {
            return Err(Error::MissingOutput { node: id, field: output });
        }

        self.state.apply(update);
        self.completed.insert(id);
        Ok(())
    }
}

/// Builder for [`AnalysisGraph`]
pub struct AnalysisGraphBuilder {
    nodes: BTreeMap<NodeId, Arc<dyn Node>>,
    parallel: bool,
}

impl AnalysisGraphBuilder {
    /// Create a new builder; analyses run concurrently by default
    pub fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
            parallel: true,
        }
    }

    /// Register a node under its own [`NodeId`]
    ///
    /// Registering a second node with the same id replaces the first.
    pub fn node(mut self, node: Arc<dyn Node>) -> Self {
        self.nodes.insert(node.id(), node);
        self
    }

    /// Run the two analysis nodes concurrently or one after the other
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Build the graph; every [`NodeId`] must have a node
    pub fn build(self) -> Result<AnalysisGraph> {
        if let Some(missing) = NodeId::ALL.iter().find(|id| !self.nodes.contains_key(*id)) {
            return Err(Error::Config(format!("No node registered for '{missing}'")));
        }

        Ok(AnalysisGraph {
            nodes: self.nodes,
            parallel: self.parallel,
        })
    }
}

impl Default for AnalysisGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use research_core::StateField;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::Barrier;

    type Log = Arc<Mutex<Vec<String>>>;

    /// Records start/end events and writes `"<id>:<target>"` to its field
    struct RecordingNode {
        id: NodeId,
        log: Log,
        delay: Duration,
        barrier: Option<Arc<Barrier>>,
    }

    impl RecordingNode {
        fn new(id: NodeId, log: &Log) -> Self {
            Self {
                id,
                log: Arc::clone(log),
                delay: Duration::ZERO,
                barrier: None,
            }
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        fn with_barrier(mut self, barrier: Arc<Barrier>) -> Self {
            self.barrier = Some(barrier);
            self
        }
    }

    #[async_trait]
    impl Node for RecordingNode {
        fn id(&self) -> NodeId {
            self.id
        }

        async fn run(&self, state: &RunState) -> Result<StateUpdate> {
            for field in self.id.reads() {
                assert!(
                    state.is_set(*field),
                    "{} observed unset field {}",
                    self.id,
                    field
                );
            }

            self.log.lock().unwrap().push(format!("start:{}", self.id));
            if let Some(barrier) = &self.barrier {
                barrier.wait().await;
            }
            tokio::time::sleep(self.delay).await;
            self.log.lock().unwrap().push(format!("end:{}", self.id));

            Ok(StateUpdate::single(
                self.id.writes(),
                format!("{}:{}", self.id, state.target),
            ))
        }
    }

    struct FailingNode(NodeId);

    #[async_trait]
    impl Node for FailingNode {
        fn id(&self) -> NodeId {
            self.0
        }

        async fn run(&self, _state: &RunState) -> Result<StateUpdate> {
            Err(Error::Completion("connection refused".to_string()))
        }
    }

    /// Writes the wrong field, or nothing at all
    struct MisbehavingNode {
        id: NodeId,
        update: StateUpdate,
    }

    #[async_trait]
    impl Node for MisbehavingNode {
        fn id(&self) -> NodeId {
            self.id
        }

        async fn run(&self, _state: &RunState) -> Result<StateUpdate> {
            Ok(self.update.clone())
        }
    }

    /// Synthesis node that captures the state it was given
    struct CapturingSynthesis {
        seen: Arc<Mutex<Option<RunState>>>,
    }

    #[async_trait]
    impl Node for CapturingSynthesis {
        fn id(&self) -> NodeId {
            NodeId::Synthesis
        }

        async fn run(&self, state: &RunState) -> Result<StateUpdate> {
            *self.seen.lock().unwrap() = Some(state.clone());
            Ok(StateUpdate::new().with_final_report("memo"))
        }
    }

    fn recording_graph(log: &Log, parallel: bool) -> AnalysisGraph {
        let mut builder = AnalysisGraph::builder().parallel(parallel);
        for id in NodeId::ALL {
            builder = builder.node(Arc::new(RecordingNode::new(id, log)));
        }
        builder.build().unwrap()
    }

    fn position(events: &[String], event: &str) -> usize {
        events.iter().position(|e| e == event).unwrap()
    }

    #[tokio::test]
    async fn test_run_fills_every_field() {
        let log = Log::default();
        let graph = recording_graph(&log, true);

        let state = graph.run("AAPL").await.unwrap();
        assert_eq!(state.target, "AAPL");
        assert_eq!(state.market_data, "ingestion:AAPL");
        assert_eq!(state.fundamental_analysis, "fundamental:AAPL");
        assert_eq!(state.quant_analysis, "quant:AAPL");
        assert_eq!(state.final_report, "synthesis:AAPL");
    }

    #[tokio::test]
    async fn test_dependency_order_is_respected() {
        for parallel in [true, false] {
            let log = Log::default();
            recording_graph(&log, parallel).run("MSFT").await.unwrap();
            let events = log.lock().unwrap().clone();

            let ingestion_end = position(&events, "end:ingestion");
            assert!(ingestion_end < position(&events, "start:fundamental"));
            assert!(ingestion_end < position(&events, "start:quant"));

            let synthesis_start = position(&events, "start:synthesis");
            assert!(position(&events, "end:fundamental") < synthesis_start);
            assert!(position(&events, "end:quant") < synthesis_start);
        }
    }

    #[tokio::test]
    async fn test_analysis_nodes_run_concurrently() {
        let log = Log::default();
        let barrier = Arc::new(Barrier::new(2));
        let graph = AnalysisGraph::builder()
            .node(Arc::new(RecordingNode::new(NodeId::Ingestion, &log)))
            .node(Arc::new(
                RecordingNode::new(NodeId::Fundamental, &log).with_barrier(Arc::clone(&barrier)),
            ))
            .node(Arc::new(
                RecordingNode::new(NodeId::Quant, &log).with_barrier(Arc::clone(&barrier)),
            ))
            .node(Arc::new(RecordingNode::new(NodeId::Synthesis, &log)))
            .build()
            .unwrap();

        // Both analyses must be in flight at once to pass the barrier
        let state = tokio::time::timeout(Duration::from_secs(5), graph.run("NVDA"))
            .await
            .expect("analysis nodes did not run concurrently")
            .unwrap();
        assert_eq!(state.final_report, "synthesis:NVDA");
    }

    #[tokio::test(start_paused = true)]
    async fn test_synthesis_waits_for_slower_analysis() {
        for (fundamental_delay, quant_delay) in [(50, 5), (5, 50)] {
            let log = Log::default();
            let seen = Arc::new(Mutex::new(None));
            let graph = AnalysisGraph::builder()
                .node(Arc::new(RecordingNode::new(NodeId::Ingestion, &log)))
                .node(Arc::new(
                    RecordingNode::new(NodeId::Fundamental, &log)
                        .with_delay(Duration::from_millis(fundamental_delay)),
                ))
                .node(Arc::new(
                    RecordingNode::new(NodeId::Quant, &log)
                        .with_delay(Duration::from_millis(quant_delay)),
                ))
                .node(Arc::new(CapturingSynthesis {
                    seen: Arc::clone(&seen),
                }))
                .build()
                .unwrap();

            graph.run("GOOGL").await.unwrap();

            let seen = seen.lock().unwrap().clone().unwrap();
            assert_eq!(seen.fundamental_analysis, "fundamental:GOOGL");
            assert_eq!(seen.quant_analysis, "quant:GOOGL");
            assert!(!seen.is_set(StateField::FinalReport));
        }
    }

    #[tokio::test]
    async fn test_node_failure_propagates() {
        let log = Log::default();
        let graph = AnalysisGraph::builder()
            .node(Arc::new(RecordingNode::new(NodeId::Ingestion, &log)))
            .node(Arc::new(RecordingNode::new(NodeId::Fundamental, &log)))
            .node(Arc::new(FailingNode(NodeId::Quant)))
            .node(Arc::new(RecordingNode::new(NodeId::Synthesis, &log)))
            .build()
            .unwrap();

        let err = graph.run("TSLA").await.unwrap_err();
        assert!(err.is_completion());

        let events = log.lock().unwrap().clone();
        assert!(!events.contains(&"start:synthesis".to_string()));
    }

    #[tokio::test]
    async fn test_update_outside_write_set_is_rejected() {
        let log = Log::default();
        let graph = AnalysisGraph::builder()
            .node(Arc::new(RecordingNode::new(NodeId::Ingestion, &log)))
            .node(Arc::new(MisbehavingNode {
                id: NodeId::Fundamental,
                update: StateUpdate::new()
                    .with_fundamental_analysis("ok")
                    .with_final_report("sneaky"),
            }))
            .node(Arc::new(RecordingNode::new(NodeId::Quant, &log)))
            .node(Arc::new(RecordingNode::new(NodeId::Synthesis, &log)))
            .build()
            .unwrap();

        let err = graph.run("AMZN").await.unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidUpdate {
                node: NodeId::Fundamental,
                field: StateField::FinalReport
            }
        ));
    }

    #[tokio::test]
    async fn test_missing_output_is_rejected() {
        let log = Log::default();
        let graph = AnalysisGraph::builder()
            .node(Arc::new(MisbehavingNode {
                id: NodeId::Ingestion,
                update: StateUpdate::new(),
            }))
            .node(Arc::new(RecordingNode::new(NodeId::Fundamental, &log)))
            .node(Arc::new(RecordingNode::new(NodeId::Quant, &log)))
            .node(Arc::new(RecordingNode::new(NodeId::Synthesis, &log)))
            .build()
            .unwrap();

        let err = graph.run("META").await.unwrap_err();
        assert!(matches!(
            err,
            Error::MissingOutput {
                node: NodeId::Ingestion,
                field: StateField::MarketData
            }
        ));
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_build_requires_every_node() {
        let log = Log::default();
        let result = AnalysisGraph::builder()
            .node(Arc::new(RecordingNode::new(NodeId::Ingestion, &log)))
            .node(Arc::new(RecordingNode::new(NodeId::Fundamental, &log)))
            .node(Arc::new(RecordingNode::new(NodeId::Synthesis, &log)))
            .build();

        assert!(matches!(result, Err(Error::Config(msg)) if msg.contains("quant")));
    }

    #[test]
    fn test_run_bookkeeping() {
        let mut run = GraphRun::new("AAPL".to_string());
        assert!(matches!(
            run.check_ready(NodeId::Quant),
            Err(Error::DependencyNotSatisfied {
                node: NodeId::Quant,
                missing: NodeId::Ingestion
            })
        ));
        assert!(run.advance(RunPhase::Analyzing).is_err());

        run.advance(RunPhase::Ingesting).unwrap();
        run.merge(
            NodeId::Ingestion,
            StateUpdate::new().with_market_data("report"),
        )
        .unwrap();
        assert!(run.check_ready(NodeId::Quant).is_ok());
        assert!(matches!(
            run.check_ready(NodeId::Synthesis),
            Err(Error::DependencyNotSatisfied {
                missing: NodeId::Fundamental,
                ..
            })
        ));
    }
}
