//! Vellum DOM - mutable document tree
//!
//! Arena-based node storage with synchronous mutation events,
//! declarative query specs and cache-effect classification.

mod classify;
mod document;
mod mutation;
mod node;
mod profile;
mod query;
mod tree;

pub use classify::{Classifier, Effect};
pub use document::Document;
pub use mutation::Mutation;
pub use node::{Attribute, ElementData, Node, NodeData, TextData};
pub use profile::{Profile, TreeMode};
pub use query::{Predicate, QuerySpec, Scope};
pub use tree::{Descendants, Tree, TreeError, TreeResult};

/// Node identifier (index into the document arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Sentinel for "no node" (detached parent, unset references)
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check whether this id refers to a node
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}
