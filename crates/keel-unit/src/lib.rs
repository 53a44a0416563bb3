//! Keel compilation units
//!
//! This crate implements the per-source state every compiler phase shares:
//! - [`CompilationUnit`]: the record handed from phase to phase
//! - fresh-name generation with a typer-phase misuse guard
//! - synthetic definition staging and the per-node computation cache
//! - dependency tracking for incremental builds, excluding virtual sources
//! - the deferred check queue drained at phase checkpoints
//! - [`NO_COMPILATION_UNIT`], the value that stands for "no unit"
//!
//! # Example
//!
//! ```
//! use keel_ast::SourceFile;
//! use keel_unit::{CompilationUnit, Session, Settings};
//!
//! let session = Session::shared(Settings::default());
//! let mut unit = CompilationUnit::new(session, SourceFile::new("A.scala", "object A"));
//! assert!(unit.exists());
//! assert_eq!(unit.fresh_term_name("x$").as_str(), "x$1");
//! ```

mod cache;
mod checks;
mod deps;
mod diagnostics;
mod error;
mod fresh;
mod session;
mod synthetic;
mod unit;

pub use cache::ComputationCache;
pub use checks::{CheckPoint, CheckQueue, CheckRunner, DeferredCheck, Feature, StandardChecks};
pub use deps::{DependencyReport, DependencyTracker};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::{CheckFailure, UnitError};
pub use fresh::{FreshNameCreator, TermName, TypeName};
pub use session::{Phase, Session, Settings};
pub use synthetic::SyntheticDefinitions;
pub use unit::{CompilationUnit, IrClass, NO_COMPILATION_UNIT};
