//! Syntax tree arena
//!
//! Nodes are allocated into a [`TreeArena`] owned by their compilation unit
//! and addressed by [`NodeId`]. Caches keyed by node use the id, so two
//! structurally identical nodes allocated separately are distinct keys.

use crate::Span;
use serde::{Deserialize, Serialize};

/// Handle to a node inside one unit's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    Package { name: String },
    Import { path: String },
    ClassDef { name: String },
    DefDef { name: String },
    ValDef { name: String },
    Block,
    Apply,
    Ident { name: String },
    Literal { value: String },
    XmlLiteral,
    /// A definition produced by the compiler rather than written by the user
    Synthetic { name: String },
}

impl NodeKind {
    /// Name introduced by this node, if it is a definition
    pub fn defined_name(&self) -> Option<&str> {
        match self {
            NodeKind::ClassDef { name }
            | NodeKind::DefDef { name }
            | NodeKind::ValDef { name }
            | NodeKind::Synthetic { name } => Some(name),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    pub children: Vec<NodeId>,
}

impl Node {
    pub fn new(kind: NodeKind, span: Span) -> Self {
        Self {
            kind,
            span,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = NodeId>) -> Self {
        self.children.extend(children);
        self
    }
}

/// Owning storage for every node of a unit
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct TreeArena {
    nodes: Vec<Node>,
}

impl TreeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Rewrite a node in place, returning the old one
    ///
    /// Returns `None` (and stores nothing) if `id` was never allocated here.
    pub fn replace(&mut self, id: NodeId, node: Node) -> Option<Node> {
        self.nodes
            .get_mut(id.index())
            .map(|slot| std::mem::replace(slot, node))
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId(i as u32), n))
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }
}
