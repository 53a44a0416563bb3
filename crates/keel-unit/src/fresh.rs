//! Fresh name generation
//!
//! Names are unique among everything one [`FreshNameCreator`] has handed
//! out; they are not unique across units.

use crate::{Phase, Session};
use serde::{Deserialize, Serialize};
use std::backtrace::Backtrace;
use std::collections::HashMap;
use std::fmt;
use tracing::warn;

/// A compiler-generated term name (values, methods)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TermName(String);

/// A compiler-generated type name (classes, type members)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeName(String);

impl TermName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TypeName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TermName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-prefix monotonic counters
///
/// Term and type names draw from the same counters, so a term and a type
/// minted with the same prefix never collide either.
#[derive(Debug, Default, Clone)]
pub struct FreshNameCreator {
    counters: HashMap<String, u64>,
}

impl FreshNameCreator {
    pub fn new() -> Self {
        Self::default()
    }

    /// `prefix` followed by the next value of its counter, starting at 1
    pub fn new_name(&mut self, prefix: &str) -> String {
        let counter = self.counters.entry(prefix.to_string()).or_insert(0);
        *counter += 1;
        format!("{prefix}{counter}")
    }

    pub fn fresh_term_name(&mut self, prefix: &str) -> TermName {
        TermName(self.new_name(prefix))
    }

    pub fn fresh_type_name(&mut self, prefix: &str) -> TypeName {
        TypeName(self.new_name(prefix))
    }

    /// How many names have been minted for `prefix`
    pub fn count(&self, prefix: &str) -> u64 {
        self.counters.get(prefix).copied().unwrap_or(0)
    }
}

/// Warn if a unit-scoped fresh name is being minted during type checking
///
/// Names minted there tend to drift out of sync with the symbol table. The
/// warning never stops compilation. Returns whether it fired.
pub(crate) fn guard_fresh_name(session: &Session, unit: &dyn fmt::Display, prefix: &str) -> bool {
    if !session.fresh_name_guard() || session.phase() != Phase::Typer {
        return false;
    }
    warn!(
        unit = %unit,
        prefix,
        phase = %Phase::Typer,
        stack = %bounded_stack_dump(session.stack_dump_depth()),
        "unit-scoped fresh name created during typer; use a typer-local name creator"
    );
    true
}

fn bounded_stack_dump(depth: usize) -> String {
    let trace = Backtrace::force_capture().to_string();
    let mut frames = 0;
    let mut kept = Vec::new();
    for line in trace.lines() {
        if is_frame_header(line) {
            frames += 1;
            if frames > depth {
                kept.push("   ...");
                break;
            }
        }
        kept.push(line);
    }
    kept.join("\n")
}

fn is_frame_header(line: &str) -> bool {
    line.trim_start()
        .split_once(':')
        .is_some_and(|(n, _)| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}
