//! Document - tree plus its capability record
//!
//! Owns one arena tree and the profile resolved at construction.
//! Mutating methods thread the profile through the tree API and hand
//! the produced event back to the caller for dispatch.

use crate::{Mutation, NodeId, Profile, Tree, TreeResult};

/// One document: a tree and the profile it was constructed with
#[derive(Debug)]
pub struct Document {
    tree: Tree,
    profile: Profile,
}

impl Document {
    /// Create a document with the default markup profile
    pub fn new() -> Self {
        Self::with_profile(Profile::markup())
    }

    /// Create a document with an explicit profile
    pub fn with_profile(profile: Profile) -> Self {
        Self {
            tree: Tree::new(),
            profile,
        }
    }

    #[inline]
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    #[inline]
    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.tree.create_element(tag)
    }

    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.tree.create_text(content)
    }

    pub fn get_attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.tree.get_attribute(node, name, &self.profile)
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> TreeResult<Mutation> {
        self.tree.set_attribute(node, name, value, &self.profile)
    }

    pub fn remove_attribute(&mut self, node: NodeId, name: &str) -> TreeResult<Option<Mutation>> {
        self.tree.remove_attribute(node, name, &self.profile)
    }

    pub fn insert_child(&mut self, parent: NodeId, child: NodeId, index: usize) -> TreeResult<Mutation> {
        self.tree.insert_child(parent, child, index)
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> TreeResult<Mutation> {
        self.tree.append_child(parent, child)
    }

    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> TreeResult<Mutation> {
        self.tree.remove_child(parent, child)
    }

    pub fn remove_child_at(&mut self, parent: NodeId, index: usize) -> TreeResult<Mutation> {
        self.tree.remove_child_at(parent, index)
    }

    /// Deep-copy a subtree owned by another document into this one.
    /// The copy arrives detached; attaching it fires normally.
    pub fn adopt_subtree(&mut self, source: &Tree, root: NodeId) -> NodeId {
        tracing::debug!(?root, "adopting foreign subtree");
        self.tree.adopt_subtree(source, root)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_threads_profile() {
        let mut doc = Document::new();
        let input = doc.create_element("input");
        doc.append_child(doc.root(), input).unwrap();
        doc.set_attribute(input, "Name", "q").unwrap();

        // markup profile: attribute names compare case-insensitively
        assert_eq!(doc.get_attribute(input, "name"), Some("q"));
    }

    #[test]
    fn test_strict_document_keeps_case() {
        let mut doc = Document::with_profile(Profile::strict());
        let input = doc.create_element("input");
        doc.append_child(doc.root(), input).unwrap();
        doc.set_attribute(input, "Name", "q").unwrap();

        assert_eq!(doc.get_attribute(input, "name"), None);
        assert_eq!(doc.get_attribute(input, "Name"), Some("q"));
    }
}
