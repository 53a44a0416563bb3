//! Keel AST - Leaf types shared by every compiler phase
//!
//! This crate defines source handles, spans and positions, the per-unit
//! syntax tree arena, and the declaration table name resolution fills.

mod span;
mod error;
mod source;
mod tree;
mod decl;

pub use span::*;
pub use error::*;
pub use source::*;
pub use tree::*;
pub use decl::*;
