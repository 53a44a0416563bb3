//! Synthetic definition staging
//!
//! Name resolution creates definitions (accessors, companions, default
//! getters) before there is a place for them in the tree. They are staged
//! here keyed by declaration and the type checker moves them into the tree.
//! A well-behaved pipeline leaves this table empty once a unit is checked.

use keel_ast::{DeclId, NodeId};
use std::collections::HashMap;

#[derive(Debug, Default, Clone)]
pub struct SyntheticDefinitions {
    entries: HashMap<DeclId, NodeId>,
}

impl SyntheticDefinitions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage `tree` for `decl`; a second put for the same declaration wins
    pub fn put(&mut self, decl: DeclId, tree: NodeId) -> Option<NodeId> {
        self.entries.insert(decl, tree)
    }

    pub fn get(&self, decl: DeclId) -> Option<NodeId> {
        self.entries.get(&decl).copied()
    }

    pub fn remove(&mut self, decl: DeclId) -> Option<NodeId> {
        self.entries.remove(&decl)
    }

    pub fn contains(&self, decl: DeclId) -> bool {
        self.entries.contains_key(&decl)
    }

    /// Declarations with a live association, in no particular order
    pub fn keys(&self) -> impl Iterator<Item = DeclId> + '_ {
        self.entries.keys().copied()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
