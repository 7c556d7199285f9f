//! Analysis graph execution for the equity research pipeline
//!
//! The graph is fixed: `ingestion` feeds two independent analysis nodes,
//! `fundamental` and `quant`, and `synthesis` waits on both. This crate runs
//! the four nodes in dependency order and merges their partial updates into
//! a single [`research_core::RunState`].

pub mod graph;

// Re-export for convenience
pub use graph::{AnalysisGraph, AnalysisGraphBuilder};
