//! Error types for source loading

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("cannot read source {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Errors from building the declaration table
#[derive(Debug, Clone, Error)]
pub enum DeclError {
    #[error("duplicate declaration: {name}")]
    Duplicate { name: String },
}
