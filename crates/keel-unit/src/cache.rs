//! Memoized per-node results
//!
//! Keys are node handles, never node contents. There is no eviction; the
//! cache lives and dies with its unit.

use keel_ast::NodeId;
use std::collections::HashMap;

#[derive(Debug, Default, Clone)]
pub struct ComputationCache {
    results: HashMap<NodeId, NodeId>,
}

impl ComputationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, node: NodeId, result: NodeId) -> Option<NodeId> {
        self.results.insert(node, result)
    }

    pub fn get(&self, node: NodeId) -> Option<NodeId> {
        self.results.get(&node).copied()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.results.contains_key(&node)
    }

    /// Cached result for `node`, computing and storing it on first request
    pub fn get_or_compute(&mut self, node: NodeId, compute: impl FnOnce() -> NodeId) -> NodeId {
        *self.results.entry(node).or_insert_with(compute)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.results.clear();
    }
}
