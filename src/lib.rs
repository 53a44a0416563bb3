//! Keel - per-source compilation unit state for a multi-phase compiler
//!
//! This is the root workspace crate that provides integration tests.
//! The actual implementation is in the workspace member crates.

// Re-export main crates for convenience
pub use keel_ast as ast;
pub use keel_driver as driver;
pub use keel_unit as unit;
