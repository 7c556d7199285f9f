//! Core abstractions for the equity research pipeline
//!
//! This crate defines the state-passing contract between graph nodes: the
//! [`RunState`] threaded through a run, the partial [`StateUpdate`] each node
//! returns, the fixed [`NodeId`] topology and the [`Node`] trait.

pub mod error;
pub mod node;
pub mod state;

pub use error::{Error, Result};
pub use node::{Node, NodeId};
pub use state::{RunPhase, RunState, StateField, StateUpdate};
