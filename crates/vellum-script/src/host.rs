//! Script host - per-document context object
//!
//! Owns the document, the wrapper identity cache and the collection
//! set, and is the single entry point the scripting bridge talks to.
//! Every mutating method performs the tree edit and dispatches the
//! resulting event to the materialized collections before returning,
//! so a structural edit can never leave a collection believing it is
//! clean while the tree changed beneath it.

use std::collections::HashSet;

use vellum_dom::{Document, Mutation, NodeId, Predicate, Profile, QuerySpec, Scope, Tree, TreeResult};

use crate::collections::{CollectionId, CollectionKind, CollectionSet, ScriptValue};
use crate::error::{CollectionError, CollectionResult};
use crate::wrapper::{IdentityCache, WrapperId};

/// One document plus everything the scripting bridge sees of it
#[derive(Debug, Default)]
pub struct ScriptHost {
    doc: Document,
    wrappers: IdentityCache,
    collections: CollectionSet,
}

impl ScriptHost {
    /// Host over a fresh markup-profile document
    pub fn new() -> Self {
        Self::default()
    }

    /// Host over a fresh document with an explicit profile
    pub fn with_profile(profile: Profile) -> Self {
        Self {
            doc: Document::with_profile(profile),
            wrappers: IdentityCache::new(),
            collections: CollectionSet::new(),
        }
    }

    #[inline]
    pub fn document(&self) -> &Document {
        &self.doc
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.doc.root()
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.doc.create_element(tag)
    }

    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.doc.create_text(content)
    }

    pub fn get_attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.doc.get_attribute(node, name)
    }

    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.doc.tree().tag_name(node)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.doc.tree().parent(node)
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.doc.tree().children(node)
    }

    // ---- mutation façade: edit, then dispatch synchronously ----

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> TreeResult<()> {
        let event = self.doc.set_attribute(node, name, value)?;
        self.dispatch(&event);
        Ok(())
    }

    pub fn remove_attribute(&mut self, node: NodeId, name: &str) -> TreeResult<()> {
        if let Some(event) = self.doc.remove_attribute(node, name)? {
            self.dispatch(&event);
        }
        Ok(())
    }

    pub fn insert_child(&mut self, parent: NodeId, child: NodeId, index: usize) -> TreeResult<()> {
        let event = self.doc.insert_child(parent, child, index)?;
        self.dispatch(&event);
        Ok(())
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> TreeResult<()> {
        let event = self.doc.append_child(parent, child)?;
        self.dispatch(&event);
        Ok(())
    }

    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> TreeResult<()> {
        let event = self.doc.remove_child(parent, child)?;
        self.dispatch(&event);
        Ok(())
    }

    fn dispatch(&mut self, event: &Mutation) {
        self.collections.dispatch(event, self.doc.tree(), self.doc.profile());
    }

    // ---- wrapper identity ----

    /// The script-visible wrapper for a node, constructed on first use
    pub fn resolve(&mut self, node: NodeId) -> WrapperId {
        self.wrappers.resolve(node)
    }

    /// The node behind a wrapper, `None` once it left the document
    pub fn wrapper_node(&self, wrapper: WrapperId) -> Option<NodeId> {
        self.wrappers.node_of(wrapper)
    }

    // ---- collection factory ----

    /// The collection for a spec+kind; repeated queries for the same
    /// declared collection share one cache.
    pub fn query(&mut self, root: NodeId, predicate: Predicate, scope: Scope, kind: CollectionKind) -> CollectionId {
        let spec = QuerySpec::new(root, predicate, scope);
        self.collections.get_or_create(spec, kind, self.doc.profile())
    }

    /// Subtree tag collection (e.g. the field elements of a form)
    pub fn tag_collection(&mut self, root: NodeId, tag: &str) -> CollectionId {
        let predicate = Predicate::tag(self.doc.profile(), tag);
        self.query(root, predicate, Scope::Subtree, CollectionKind::Elements)
    }

    /// Children-only tag collection (e.g. the cells of one row)
    pub fn child_tag_collection(&mut self, root: NodeId, tag: &str) -> CollectionId {
        let predicate = Predicate::tag(self.doc.profile(), tag);
        self.query(root, predicate, Scope::Children, CollectionKind::Elements)
    }

    /// Mutable option-style member list of a container
    pub fn options_collection(&mut self, container: NodeId, member_tag: &str) -> CollectionId {
        let predicate = Predicate::tag(self.doc.profile(), member_tag);
        self.query(container, predicate, Scope::Children, CollectionKind::Options)
    }

    // ---- collection reads ----

    /// Current member count; cleans the collection first
    pub fn length(&mut self, id: CollectionId) -> usize {
        let doc = &self.doc;
        match self.collections.get_mut(id) {
            Some(coll) => coll.ensure_clean(doc.tree(), doc.profile()).len(),
            None => 0,
        }
    }

    /// Indexed read. Out-of-bounds yields the kind's configured
    /// not-found value, never an error.
    pub fn item(&mut self, id: CollectionId, index: i64) -> ScriptValue {
        let doc = &self.doc;
        let Some(coll) = self.collections.get_mut(id) else {
            return ScriptValue::Absent;
        };
        let members = coll.ensure_clean(doc.tree(), doc.profile());
        let found = if index >= 0 {
            members.get(index as usize).copied()
        } else {
            None
        };
        match found {
            Some(node) => ScriptValue::Node(self.wrappers.resolve(node)),
            None => coll.config().not_found_value(),
        }
    }

    /// Name lookup over the identifying attributes: id first, then the
    /// kind's secondary name attribute. Zero matches is not-found, one
    /// match is that node's wrapper, several matches materialize a
    /// cached sub-collection scoped to exactly the matches.
    pub fn item_by_name(&mut self, id: CollectionId, name: &str) -> ScriptValue {
        let doc = &self.doc;
        let Some(coll) = self.collections.get_mut(id) else {
            return ScriptValue::Absent;
        };
        let secondary = coll.config().secondary_name_attr;
        let spec = coll.spec().clone();
        let members = coll.ensure_clean(doc.tree(), doc.profile()).to_vec();

        let tree = doc.tree();
        let profile = doc.profile();
        let matches: Vec<NodeId> = members
            .into_iter()
            .filter(|&m| {
                tree.get_attribute(m, "id", profile) == Some(name)
                    || secondary.is_some_and(|attr| tree.get_attribute(m, attr, profile) == Some(name))
            })
            .collect();

        match matches.as_slice() {
            [] => ScriptValue::Absent,
            [only] => ScriptValue::Node(self.wrappers.resolve(*only)),
            _ => {
                let sub_spec = spec.named_subquery(name, secondary);
                let sub = self
                    .collections
                    .get_or_create(sub_spec, CollectionKind::Elements, self.doc.profile());
                ScriptValue::Collection(sub)
            }
        }
    }

    /// Snapshot of the member list in document order
    pub fn members(&mut self, id: CollectionId) -> Vec<NodeId> {
        let doc = &self.doc;
        match self.collections.get_mut(id) {
            Some(coll) => coll.ensure_clean(doc.tree(), doc.profile()).to_vec(),
            None => Vec::new(),
        }
    }

    /// From-scratch walks this collection has performed so far
    pub fn recompute_count(&self, id: CollectionId) -> u64 {
        self.collections.get(id).map(|c| c.recomputes()).unwrap_or(0)
    }

    // ---- structural edits (mutable kinds only) ----

    /// Insert `node` so it becomes member `index`. `index == length`
    /// appends; anything past that is an error.
    pub fn insert_at(&mut self, id: CollectionId, index: usize, node: NodeId) -> CollectionResult<()> {
        let doc = &self.doc;
        let coll = self.collections.get_mut(id).ok_or(CollectionError::StaleHandle)?;
        if coll.config().edits.is_none() || coll.spec().scope != Scope::Children {
            return Err(CollectionError::UnsupportedEdit);
        }
        let root = coll.spec().root;
        let members = coll.ensure_clean(doc.tree(), doc.profile()).to_vec();
        if index > members.len() {
            return Err(CollectionError::OutOfRange {
                index: index as i64,
                length: members.len(),
            });
        }
        let tree_index = if index == members.len() {
            match members.last() {
                Some(&last) => child_position(doc.tree(), root, last) + 1,
                None => doc.tree().children(root).len(),
            }
        } else {
            child_position(doc.tree(), root, members[index])
        };
        let event = self.doc.insert_child(root, node, tree_index)?;
        self.dispatch(&event);
        Ok(())
    }

    /// Remove member `index`. Boundary behavior is the kind's:
    /// negative or past-the-end indices may be ignored or rejected
    /// depending on the resolved edit policy.
    pub fn remove_at(&mut self, id: CollectionId, index: i64) -> CollectionResult<()> {
        let doc = &self.doc;
        let coll = self.collections.get_mut(id).ok_or(CollectionError::StaleHandle)?;
        let policy = coll.config().edits.clone().ok_or(CollectionError::UnsupportedEdit)?;
        if coll.spec().scope != Scope::Children {
            return Err(CollectionError::UnsupportedEdit);
        }
        let root = coll.spec().root;
        let members = coll.ensure_clean(doc.tree(), doc.profile()).to_vec();
        if index < 0 {
            if policy.remove_ignores_negative {
                return Ok(());
            }
            return Err(CollectionError::OutOfRange {
                index,
                length: members.len(),
            });
        }
        let idx = index as usize;
        if idx >= members.len() {
            if policy.remove_ignores_out_of_range {
                return Ok(());
            }
            return Err(CollectionError::OutOfRange {
                index,
                length: members.len(),
            });
        }
        let event = self.doc.remove_child(root, members[idx])?;
        self.dispatch(&event);
        Ok(())
    }

    /// Grow or shrink to exactly `new_len` members. Shrinking removes
    /// trailing members in reverse document order; growing appends
    /// freshly created placeholder members of the kind's member tag.
    pub fn set_length(&mut self, id: CollectionId, new_len: usize) -> CollectionResult<()> {
        let doc = &self.doc;
        let coll = self.collections.get_mut(id).ok_or(CollectionError::StaleHandle)?;
        let policy = coll.config().edits.clone().ok_or(CollectionError::UnsupportedEdit)?;
        if coll.spec().scope != Scope::Children {
            return Err(CollectionError::UnsupportedEdit);
        }
        let root = coll.spec().root;
        let members = coll.ensure_clean(doc.tree(), doc.profile()).to_vec();

        if new_len < members.len() {
            for &member in members[new_len..].iter().rev() {
                let event = self.doc.remove_child(root, member)?;
                self.dispatch(&event);
            }
        } else if new_len > members.len() {
            let tag = policy.member_tag.ok_or(CollectionError::UnsupportedEdit)?;
            let mut tree_index = match members.last() {
                Some(&last) => child_position(self.doc.tree(), root, last) + 1,
                None => self.doc.tree().children(root).len(),
            };
            for _ in members.len()..new_len {
                let node = self.doc.create_element(&tag);
                let event = self.doc.insert_child(root, node, tree_index)?;
                self.dispatch(&event);
                tree_index += 1;
            }
        }
        Ok(())
    }

    /// Insert before member `before`, appending when `before` is
    /// omitted or out of range (unlike `insert_at`, which is strict)
    pub fn add(&mut self, id: CollectionId, node: NodeId, before: Option<i64>) -> CollectionResult<()> {
        let len = self.length(id);
        let index = match before {
            Some(i) if i >= 0 && (i as usize) < len => i as usize,
            _ => len,
        };
        self.insert_at(id, index, node)
    }

    // ---- cross-document moves ----

    /// Move a subtree out of `source` into this document.
    ///
    /// The removal fires in the source (invalidating its collections),
    /// the copy arrives detached here with fresh ids, and the
    /// source-side wrappers and collections of the moved nodes are
    /// reclaimed together with them. Attaching the returned node is an
    /// ordinary, dispatched insertion.
    pub fn adopt_from(&mut self, source: &mut ScriptHost, node: NodeId) -> TreeResult<NodeId> {
        if let Some(parent) = source.doc.tree().parent(node) {
            let event = source.doc.remove_child(parent, node)?;
            source.dispatch(&event);
        }
        let mut moved: HashSet<NodeId> = HashSet::new();
        moved.insert(node);
        moved.extend(source.doc.tree().descendants(node));

        let new_root = self.doc.adopt_subtree(source.doc.tree(), node);

        for &old in &moved {
            source.wrappers.discard(old);
        }
        source.collections.drop_rooted(|root| moved.contains(&root));
        tracing::debug!(moved = moved.len(), "subtree adopted between documents");
        Ok(new_root)
    }
}

/// Position of a member among its parent's children. Members of a
/// children-scope collection are children of the collection root.
fn child_position(tree: &Tree, parent: NodeId, child: NodeId) -> usize {
    tree.children(parent)
        .iter()
        .position(|&c| c == child)
        .unwrap_or_else(|| tree.children(parent).len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn select_fixture(count: usize) -> (ScriptHost, NodeId, CollectionId) {
        let mut host = ScriptHost::new();
        let select = host.create_element("select");
        let root = host.root();
        host.append_child(root, select).unwrap();
        for _ in 0..count {
            let option = host.create_element("option");
            host.append_child(select, option).unwrap();
        }
        let options = host.options_collection(select, "option");
        (host, select, options)
    }

    #[test]
    fn test_length_and_item() {
        let (mut host, _, options) = select_fixture(2);
        assert_eq!(host.length(options), 2);
        assert!(host.item(options, 0).as_node().is_some());
        assert!(host.item(options, 2).is_absent());
        assert!(host.item(options, -1).is_absent());
    }

    #[test]
    fn test_null_sentinel_profile() {
        let mut profile = Profile::markup();
        profile.item_null_when_outside = true;
        let mut host = ScriptHost::with_profile(profile);
        let select = host.create_element("select");
        let root = host.root();
        host.append_child(root, select).unwrap();
        let options = host.options_collection(select, "option");

        assert!(host.item(options, 5).is_null());
    }

    #[test]
    fn test_insert_at_appends_and_rejects_past_end() {
        let (mut host, select, options) = select_fixture(1);
        let extra = host.create_element("option");
        host.insert_at(options, 1, extra).unwrap();
        assert_eq!(host.length(options), 2);
        assert_eq!(host.children(select).last().copied(), Some(extra));

        let another = host.create_element("option");
        let err = host.insert_at(options, 4, another).unwrap_err();
        assert_eq!(err, CollectionError::OutOfRange { index: 4, length: 2 });
    }

    #[test]
    fn test_remove_at_boundaries_follow_policy() {
        let (mut host, _, options) = select_fixture(2);
        // default markup profile ignores both boundary cases
        host.remove_at(options, -1).unwrap();
        host.remove_at(options, 9).unwrap();
        assert_eq!(host.length(options), 2);

        host.remove_at(options, 0).unwrap();
        assert_eq!(host.length(options), 1);
    }

    #[test]
    fn test_strict_profile_rejects_negative_remove() {
        let mut host = ScriptHost::with_profile(Profile::strict());
        let select = host.create_element("select");
        let root = host.root();
        host.append_child(root, select).unwrap();
        let options = host.options_collection(select, "option");

        let err = host.remove_at(options, -1).unwrap_err();
        assert_eq!(err, CollectionError::OutOfRange { index: -1, length: 0 });
    }

    #[test]
    fn test_elements_kind_is_read_only() {
        let mut host = ScriptHost::new();
        let form = host.create_element("form");
        let root = host.root();
        host.append_child(root, form).unwrap();
        let fields = host.tag_collection(form, "input");

        let input = host.create_element("input");
        assert_eq!(
            host.insert_at(fields, 0, input).unwrap_err(),
            CollectionError::UnsupportedEdit
        );
        assert_eq!(host.remove_at(fields, 0).unwrap_err(), CollectionError::UnsupportedEdit);
        assert_eq!(host.set_length(fields, 0).unwrap_err(), CollectionError::UnsupportedEdit);
    }

    #[test]
    fn test_add_clamps_out_of_range_before() {
        let (mut host, select, options) = select_fixture(1);
        let extra = host.create_element("option");
        host.add(options, extra, Some(9)).unwrap();
        assert_eq!(host.children(select).last().copied(), Some(extra));

        let first = host.create_element("option");
        host.add(options, first, Some(0)).unwrap();
        assert_eq!(host.members(options)[0], first);
    }

    #[test]
    fn test_stale_handle_after_adoption() {
        let (mut host, select, options) = select_fixture(1);
        let mut other = ScriptHost::new();
        let adopted = other.adopt_from(&mut host, select).unwrap();
        let other_root = other.root();
        other.append_child(other_root, adopted).unwrap();

        assert_eq!(host.length(options), 0);
        assert!(host.item(options, 0).is_absent());
        let node = host.create_element("option");
        assert_eq!(
            host.insert_at(options, 0, node).unwrap_err(),
            CollectionError::StaleHandle
        );
    }
}
