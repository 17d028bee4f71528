//! Tree mutation events
//!
//! Every mutating tree operation produces one of these; the owning
//! document dispatches it synchronously before the operation returns.

use crate::NodeId;

/// A single tree edit
#[derive(Debug, Clone)]
pub enum Mutation {
    /// A child was inserted under `parent` at `index`
    ChildInserted {
        parent: NodeId,
        child: NodeId,
        index: usize,
    },
    /// A child was removed from `parent`; `index` is its former position
    ChildRemoved {
        parent: NodeId,
        child: NodeId,
        index: usize,
    },
    /// An attribute changed on `node`; removal carries `new: None`
    AttributeChanged {
        node: NodeId,
        name: String,
        old: Option<String>,
        new: Option<String>,
    },
}

impl Mutation {
    /// The node the mutation is anchored at: the parent for structural
    /// edits, the carrying node for attribute changes. Locality checks
    /// compare collection roots against this anchor.
    pub fn anchor(&self) -> NodeId {
        match self {
            Mutation::ChildInserted { parent, .. } => *parent,
            Mutation::ChildRemoved { parent, .. } => *parent,
            Mutation::AttributeChanged { node, .. } => *node,
        }
    }

    /// Whether this mutation changed tree structure
    #[inline]
    pub fn is_structural(&self) -> bool {
        !matches!(self, Mutation::AttributeChanged { .. })
    }
}
