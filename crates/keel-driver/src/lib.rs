//! Keel driver
//!
//! Owns phase ordering for a compiler run: one unit per source, every phase
//! in order, deferred checks drained at checkpoints, and failures isolated
//! to the unit that caused them.

mod driver;
mod error;

pub use driver::{CompilerPhase, Driver, RunReport, UnitFailure};
pub use error::{DriverError, PhaseError};
