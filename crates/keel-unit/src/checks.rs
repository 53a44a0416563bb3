//! Deferred checks
//!
//! Some validations cannot run until a unit, or its type checking, is
//! complete. Phases queue them here as plain data and the driver replays
//! them at the matching checkpoint.

use crate::{CheckFailure, CompilationUnit};
use keel_ast::{NodeId, Position};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::fmt;

/// A language feature that must be enabled before use (e.g. "postfixOps")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Feature(String);

impl Feature {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// When a queued check runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CheckPoint {
    /// Once, after every phase has finished with the unit
    PostUnit,
    /// Once, after the type checker has finished with the unit
    PostTyper,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeferredCheck {
    /// `feature` was used at `pos` and must be enabled by the end of the unit
    FeatureEnabled { feature: Feature, pos: Position },
    /// Every staged synthetic definition must have been consumed
    SyntheticsDrained,
    /// `node` must have a memoized result
    Computed { node: NodeId },
    /// Host-defined validation identified by `code`
    Validate {
        code: String,
        node: Option<NodeId>,
        message: String,
    },
}

#[derive(Debug, Clone)]
struct QueuedCheck {
    checkpoint: CheckPoint,
    check: DeferredCheck,
}

/// One FIFO queue shared by both checkpoints
#[derive(Debug, Default, Clone)]
pub struct CheckQueue {
    entries: VecDeque<QueuedCheck>,
}

impl CheckQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, checkpoint: CheckPoint, check: DeferredCheck) {
        self.entries.push_back(QueuedCheck { checkpoint, check });
    }

    pub fn push_post_unit(&mut self, check: DeferredCheck) {
        self.push(CheckPoint::PostUnit, check);
    }

    pub fn push_post_typer(&mut self, check: DeferredCheck) {
        self.push(CheckPoint::PostTyper, check);
    }

    /// Remove and return every check queued for `checkpoint`, oldest first
    ///
    /// Checks for the other checkpoint keep their relative order.
    pub fn take(&mut self, checkpoint: CheckPoint) -> Vec<DeferredCheck> {
        let (taken, kept): (VecDeque<_>, VecDeque<_>) = self
            .entries
            .drain(..)
            .partition(|e| e.checkpoint == checkpoint);
        self.entries = kept;
        taken.into_iter().map(|e| e.check).collect()
    }

    /// Put checks back ahead of everything else, keeping their order
    pub(crate) fn requeue_front(&mut self, checkpoint: CheckPoint, checks: Vec<DeferredCheck>) {
        for check in checks.into_iter().rev() {
            self.entries.push_front(QueuedCheck { checkpoint, check });
        }
    }

    pub fn pending(&self, checkpoint: CheckPoint) -> usize {
        self.entries
            .iter()
            .filter(|e| e.checkpoint == checkpoint)
            .count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CheckPoint, &DeferredCheck)> {
        self.entries.iter().map(|e| (e.checkpoint, &e.check))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Executes deferred checks against the unit that queued them
///
/// Diagnostics are reported through the unit. An `Err` aborts the drain.
pub trait CheckRunner {
    fn run(
        &mut self,
        unit: &mut CompilationUnit,
        check: &DeferredCheck,
    ) -> Result<(), CheckFailure>;
}

/// Runner for the built-in check kinds
#[derive(Debug, Default, Clone)]
pub struct StandardChecks {
    enabled: HashSet<Feature>,
}

impl StandardChecks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_features(features: impl IntoIterator<Item = Feature>) -> Self {
        Self {
            enabled: features.into_iter().collect(),
        }
    }

    pub fn enable(&mut self, feature: Feature) {
        self.enabled.insert(feature);
    }
}

impl CheckRunner for StandardChecks {
    fn run(
        &mut self,
        unit: &mut CompilationUnit,
        check: &DeferredCheck,
    ) -> Result<(), CheckFailure> {
        match check {
            DeferredCheck::FeatureEnabled { feature, pos } => {
                if !self.enabled.contains(feature)
                    && unit.checked_features_mut().insert(feature.clone())
                {
                    unit.warning(
                        *pos,
                        format!(
                            "{feature} is a language feature that should be enabled explicitly"
                        ),
                    );
                }
                Ok(())
            }
            DeferredCheck::SyntheticsDrained => match unit.synthetics().len() {
                0 => Ok(()),
                remaining => Err(CheckFailure::SyntheticsNotDrained { remaining }),
            },
            DeferredCheck::Computed { node } => {
                if unit.computation_cache().contains(*node) {
                    Ok(())
                } else {
                    Err(CheckFailure::MissingComputation { node: *node })
                }
            }
            DeferredCheck::Validate {
                code,
                node,
                message,
            } => {
                let pos = node.map_or(Position::NONE, |n| unit.node_position(n));
                unit.error(pos, format!("[{code}] {message}"));
                Ok(())
            }
        }
    }
}
