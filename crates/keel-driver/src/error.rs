//! Error types for the driver

use keel_ast::SourceError;
use keel_unit::{Phase, UnitError};
use thiserror::Error;

/// Failure reported by a phase implementation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct PhaseError {
    pub message: String,
}

impl PhaseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("{unit}: parser produced no tree")]
    MissingBody { unit: String },

    #[error("{unit}: {phase} failed: {source}")]
    Phase {
        phase: Phase,
        unit: String,
        #[source]
        source: PhaseError,
    },

    #[error(transparent)]
    Unit(#[from] UnitError),

    #[error(transparent)]
    Source(#[from] SourceError),
}
