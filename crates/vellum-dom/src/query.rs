//! Query specs
//!
//! A declarative `{root, predicate, scope}` triple describing what a
//! collection contains. Evaluation is a deterministic document-order
//! walk, recomputed from scratch on every invocation; caching is the
//! collection layer's concern.

use crate::{NodeId, Profile, Tree};

/// How far below the root a query looks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Direct children only, never past depth 1
    Children,
    /// The root and its whole subtree
    Subtree,
}

/// Node predicate, declarative so classifiers can reason about it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Predicate {
    /// Any element node
    AnyElement,
    /// Elements of one kind; the tag is stored normalized per profile
    Tag(String),
    /// Elements of one kind, excluding the query root itself
    TagExcludingRoot(String),
    /// Nodes matching `inner` whose identifying attribute equals `name`:
    /// id first, then the kind's secondary name attribute if defined
    Named {
        inner: Box<Predicate>,
        name: String,
        secondary_attr: Option<String>,
    },
}

impl Predicate {
    /// Tag predicate normalized under the document profile
    pub fn tag(profile: &Profile, tag: &str) -> Self {
        Predicate::Tag(profile.normalize_tag(tag))
    }

    /// Tag predicate that never matches the query root
    pub fn tag_excluding_root(profile: &Profile, tag: &str) -> Self {
        Predicate::TagExcludingRoot(profile.normalize_tag(tag))
    }

    /// Whether `node` satisfies this predicate
    pub fn matches(&self, tree: &Tree, profile: &Profile, root: NodeId, node: NodeId) -> bool {
        match self {
            Predicate::AnyElement => tree.get(node).is_some_and(|n| n.is_element()),
            Predicate::Tag(tag) => tree.tag_name(node).is_some_and(|t| profile.tag_eq(t, tag)),
            Predicate::TagExcludingRoot(tag) => {
                node != root && tree.tag_name(node).is_some_and(|t| profile.tag_eq(t, tag))
            }
            Predicate::Named {
                inner,
                name,
                secondary_attr,
            } => {
                if !inner.matches(tree, profile, root, node) {
                    return false;
                }
                // identifying attribute values compare exactly
                if tree.get_attribute(node, "id", profile) == Some(name.as_str()) {
                    return true;
                }
                secondary_attr
                    .as_deref()
                    .is_some_and(|attr| tree.get_attribute(node, attr, profile) == Some(name.as_str()))
            }
        }
    }

    /// Attribute names whose changes can alter membership.
    ///
    /// Tag predicates discriminate on no attribute at all; name-scoped
    /// predicates add the identifying attributes on top of whatever the
    /// inner predicate watches, which realizes the union classifier a
    /// multi-match sub-collection needs.
    pub fn discriminating_attrs(&self) -> Vec<&str> {
        match self {
            Predicate::AnyElement | Predicate::Tag(_) | Predicate::TagExcludingRoot(_) => Vec::new(),
            Predicate::Named {
                inner, secondary_attr, ..
            } => {
                let mut attrs = inner.discriminating_attrs();
                attrs.push("id");
                if let Some(attr) = secondary_attr.as_deref() {
                    attrs.push(attr);
                }
                attrs
            }
        }
    }
}

/// What a live collection contains
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QuerySpec {
    pub root: NodeId,
    pub predicate: Predicate,
    pub scope: Scope,
}

impl QuerySpec {
    pub fn new(root: NodeId, predicate: Predicate, scope: Scope) -> Self {
        Self {
            root,
            predicate,
            scope,
        }
    }

    /// Evaluate from scratch in document order
    pub fn evaluate(&self, tree: &Tree, profile: &Profile) -> Vec<NodeId> {
        let mut matched = Vec::new();
        match self.scope {
            Scope::Children => {
                for &child in tree.children(self.root) {
                    if self.predicate.matches(tree, profile, self.root, child) {
                        matched.push(child);
                    }
                }
            }
            Scope::Subtree => {
                if self.predicate.matches(tree, profile, self.root, self.root) {
                    matched.push(self.root);
                }
                for node in tree.descendants(self.root) {
                    if self.predicate.matches(tree, profile, self.root, node) {
                        matched.push(node);
                    }
                }
            }
        }
        matched
    }

    /// The spec of the sub-collection holding this spec's members whose
    /// identifying attribute equals `name`
    pub fn named_subquery(&self, name: &str, secondary_attr: Option<&str>) -> QuerySpec {
        QuerySpec {
            root: self.root,
            predicate: Predicate::Named {
                inner: Box::new(self.predicate.clone()),
                name: name.to_string(),
                secondary_attr: secondary_attr.map(str::to_string),
            },
            scope: self.scope,
        }
    }
}
