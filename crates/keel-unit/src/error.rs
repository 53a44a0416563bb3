//! Error types for compilation units

use keel_ast::NodeId;
use thiserror::Error;

/// Failure raised by a deferred check
///
/// A failing check is a programmer error in the code being checked, not a
/// recoverable pipeline condition: it aborts the drain it occurred in.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckFailure {
    /// E-UNIT-001: synthetic definitions were never re-homed into the tree
    #[error("{remaining} synthetic definition(s) were never consumed")]
    SyntheticsNotDrained { remaining: usize },

    /// E-UNIT-002: a node that must have a memoized result has none
    #[error("no computed result for node {}", node.0)]
    MissingComputation { node: NodeId },

    /// E-UNIT-003: host-defined validation failed
    #[error("check {check} failed: {message}")]
    Failed { check: String, message: String },
}

impl CheckFailure {
    /// Error code for machine-readable output
    pub fn code(&self) -> &'static str {
        match self {
            CheckFailure::SyntheticsNotDrained { .. } => "E-UNIT-001",
            CheckFailure::MissingComputation { .. } => "E-UNIT-002",
            CheckFailure::Failed { .. } => "E-UNIT-003",
        }
    }
}

#[derive(Debug, Error)]
pub enum UnitError {
    #[error("deferred check failed in {unit}: {source}")]
    CheckFailed {
        unit: String,
        #[source]
        source: CheckFailure,
    },

    #[error("invalid settings: {0}")]
    InvalidSettings(#[from] serde_json::Error),
}
