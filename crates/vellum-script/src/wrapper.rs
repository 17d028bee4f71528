//! Wrapper identity cache
//!
//! Exactly one script-visible wrapper per node for the node's
//! lifetime. The cache maps arena indices both ways and owns nothing,
//! so it can never be the reason a node survives.

use std::collections::HashMap;

use vellum_dom::NodeId;

/// Wrapper identifier (index into the wrapper arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WrapperId(u32);

impl WrapperId {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug)]
struct Wrapper {
    /// The wrapped node; NONE once the node left the document
    node: NodeId,
}

/// Per-document node-to-wrapper identity map
#[derive(Debug, Default)]
pub struct IdentityCache {
    by_node: HashMap<NodeId, WrapperId>,
    wrappers: Vec<Wrapper>,
}

impl IdentityCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the wrapper for a node, constructing it on first use.
    ///
    /// Referentially stable: the same node always yields the same
    /// wrapper id, across detachment, reinsertion and reparenting.
    pub fn resolve(&mut self, node: NodeId) -> WrapperId {
        if let Some(&id) = self.by_node.get(&node) {
            // two wrappers for one node is a core defect, not a
            // recoverable condition
            debug_assert_eq!(self.wrappers[id.index()].node, node);
            return id;
        }
        let id = WrapperId(self.wrappers.len() as u32);
        self.wrappers.push(Wrapper { node });
        self.by_node.insert(node, id);
        tracing::trace!(?node, ?id, "wrapper created");
        id
    }

    /// The wrapper for a node, if one was already materialized
    pub fn peek(&self, node: NodeId) -> Option<WrapperId> {
        self.by_node.get(&node).copied()
    }

    /// The node behind a wrapper, `None` once the node left the document
    pub fn node_of(&self, id: WrapperId) -> Option<NodeId> {
        let wrapper = self.wrappers.get(id.index())?;
        if wrapper.node.is_valid() {
            Some(wrapper.node)
        } else {
            None
        }
    }

    /// Drop the entry for a node leaving the document (adoption or
    /// teardown). The wrapper slot is retained so ids are never reused.
    pub fn discard(&mut self, node: NodeId) {
        if let Some(id) = self.by_node.remove(&node) {
            self.wrappers[id.index()].node = NodeId::NONE;
        }
    }

    /// Number of live node-to-wrapper entries
    pub fn len(&self) -> usize {
        self.by_node.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_node.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_dom::Tree;

    #[test]
    fn test_resolve_is_stable() {
        let mut tree = Tree::new();
        let mut cache = IdentityCache::new();
        let a = tree.create_element("div");

        let w1 = cache.resolve(a);
        let w2 = cache.resolve(a);
        assert_eq!(w1, w2);
        assert_eq!(cache.node_of(w1), Some(a));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_distinct_nodes_get_distinct_wrappers() {
        let mut tree = Tree::new();
        let mut cache = IdentityCache::new();
        let a = tree.create_element("div");
        let b = tree.create_element("div");

        assert_ne!(cache.resolve(a), cache.resolve(b));
    }

    #[test]
    fn test_discard_severs_both_directions() {
        let mut tree = Tree::new();
        let mut cache = IdentityCache::new();
        let a = tree.create_element("div");

        let w = cache.resolve(a);
        cache.discard(a);
        assert_eq!(cache.peek(a), None);
        assert_eq!(cache.node_of(w), None);
        assert!(cache.is_empty());

        // a later resolve builds a fresh wrapper; the old id stays dead
        let w2 = cache.resolve(a);
        assert_ne!(w, w2);
    }
}
