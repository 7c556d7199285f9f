//! Error types for research-core

use crate::node::NodeId;
use crate::state::StateField;
use thiserror::Error;

/// Result type alias for research-core
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for graph and node operations
#[derive(Error, Debug)]
pub enum Error {
    /// Generic error message
    #[error("{0}")]
    Generic(String),

    /// The text-completion capability failed (network, auth, model errors)
    #[error("Completion failed: {0}")]
    Completion(String),

    /// Invalid configuration detected while building or running a node
    #[error("Configuration error: {0}")]
    Config(String),

    /// A node failed for a reason other than a completion error
    #[error("Node '{node}' failed: {message}")]
    NodeFailed {
        /// Node that failed
        node: NodeId,
        /// Failure description
        message: String,
    },

    /// A node was scheduled before one of its predecessors completed
    #[error("Node '{node}' scheduled before predecessor '{missing}' completed")]
    DependencyNotSatisfied {
        /// Node that was about to run
        node: NodeId,
        /// Predecessor that has not produced its output yet
        missing: NodeId,
    },

    /// A node returned an update touching a field it does not own
    #[error("Node '{node}' attempted to write field '{field}' it does not produce")]
    InvalidUpdate {
        /// Offending node
        node: NodeId,
        /// Field outside the node's write set
        field: StateField,
    },

    /// A node completed without producing its output field
    #[error("Node '{node}' completed without producing '{field}'")]
    MissingOutput {
        /// Offending node
        node: NodeId,
        /// Field the node should have produced
        field: StateField,
    },
}

impl Error {
    /// Whether this error came from the text-completion capability
    pub fn is_completion(&self) -> bool {
        matches!(self, Self::Completion(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::DependencyNotSatisfied {
            node: NodeId::Synthesis,
            missing: NodeId::Quant,
        };
        assert_eq!(
            err.to_string(),
            "Node 'synthesis' scheduled before predecessor 'quant' completed"
        );

        let err = Error::InvalidUpdate {
            node: NodeId::Quant,
            field: StateField::FinalReport,
        };
        assert_eq!(
            err.to_string(),
            "Node 'quant' attempted to write field 'final_report' it does not produce"
        );
    }

    #[test]
    fn test_is_completion() {
        assert!(Error::Completion("timeout".to_string()).is_completion());
        assert!(!Error::Generic("other".to_string()).is_completion());
    }
}
