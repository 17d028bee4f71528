//! Live collections
//!
//! A live collection caches the materialized member list for one query
//! spec and tracks a dirty flag driven by classified mutation events.
//! The `CollectionSet` is both the collection arena and the mutation
//! event bus: dispatch walks the materialized collections in
//! subscription order and only ever flips dirty flags, it never
//! recomputes.

use std::collections::HashMap;

use vellum_dom::{Classifier, Effect, Mutation, NodeId, Predicate, Profile, QuerySpec, Tree};

use crate::wrapper::WrapperId;

/// Collection identifier (index into the collection arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollectionId(u32);

impl CollectionId {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// The concrete collection kinds this host reproduces.
///
/// The kinds disagree on boundary behavior on purpose; the differences
/// are configuration, not special cases at call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    /// Element collections (form fields, tag queries): read-only,
    /// absent-value sentinel, id-then-name lookup
    Elements,
    /// Option-style member lists: mutable, sentinel and remove
    /// boundaries resolved from the document profile
    Options,
}

/// Not-found sentinel configuration for indexed reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFound {
    /// No value at all
    Absent,
    /// An explicit null marker
    Null,
}

/// A value handed back to the scripting bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptValue {
    Absent,
    Null,
    Node(WrapperId),
    Collection(CollectionId),
}

impl ScriptValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, ScriptValue::Absent)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ScriptValue::Null)
    }

    pub fn as_node(&self) -> Option<WrapperId> {
        match self {
            ScriptValue::Node(w) => Some(*w),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<CollectionId> {
        match self {
            ScriptValue::Collection(c) => Some(*c),
            _ => None,
        }
    }
}

/// Boundary policy for the structural edits of a mutable kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditPolicy {
    /// Tag used for placeholder members grown by `set_length`; absent
    /// when the spec's predicate names no single tag
    pub member_tag: Option<String>,
    /// A negative remove index is silently ignored instead of rejected
    pub remove_ignores_negative: bool,
    /// A remove index past the end is silently ignored
    pub remove_ignores_out_of_range: bool,
}

/// Per-kind configuration resolved against the document profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindConfig {
    pub not_found: NotFound,
    /// Secondary identifying attribute for name lookup, after id
    pub secondary_name_attr: Option<&'static str>,
    pub classifier: Classifier,
    /// Present only for mutable kinds
    pub edits: Option<EditPolicy>,
}

impl KindConfig {
    /// Resolve a kind against the profile and the spec it will serve.
    /// Name-scoped specs always get the conservative classifier: their
    /// membership depends on identifying attributes even when the base
    /// kind ignores attribute changes.
    pub fn resolve(kind: CollectionKind, profile: &Profile, spec: &QuerySpec) -> Self {
        let classifier = if matches!(spec.predicate, Predicate::Named { .. }) {
            Classifier::Conservative
        } else {
            kind.default_classifier()
        };
        match kind {
            CollectionKind::Elements => Self {
                not_found: NotFound::Absent,
                secondary_name_attr: Some("name"),
                classifier,
                edits: None,
            },
            CollectionKind::Options => Self {
                not_found: if profile.item_null_when_outside {
                    NotFound::Null
                } else {
                    NotFound::Absent
                },
                secondary_name_attr: None,
                classifier,
                edits: Some(EditPolicy {
                    member_tag: match &spec.predicate {
                        Predicate::Tag(tag) | Predicate::TagExcludingRoot(tag) => Some(tag.clone()),
                        _ => None,
                    },
                    remove_ignores_negative: profile.remove_ignores_negative_index,
                    remove_ignores_out_of_range: profile.remove_ignores_out_of_range,
                }),
            },
        }
    }

    /// The not-found sentinel as a script value
    pub fn not_found_value(&self) -> ScriptValue {
        match self.not_found {
            NotFound::Absent => ScriptValue::Absent,
            NotFound::Null => ScriptValue::Null,
        }
    }
}

impl CollectionKind {
    fn default_classifier(self) -> Classifier {
        match self {
            // tag membership provably ignores attributes
            CollectionKind::Elements => Classifier::IgnoreAttributes,
            CollectionKind::Options => Classifier::IgnoreAttributes,
        }
    }
}

/// One cached, mutation-aware view over nodes matching a spec.
///
/// State machine: Clean(list) ⇄ Dirty, starting Dirty. Classified
/// `Invalidate` flips Clean→Dirty (idempotent); any read while Dirty
/// recomputes from scratch and lands back in Clean.
#[derive(Debug)]
pub struct LiveCollection {
    spec: QuerySpec,
    kind: CollectionKind,
    config: KindConfig,
    cached: Option<Vec<NodeId>>,
    dirty: bool,
    recomputes: u64,
}

impl LiveCollection {
    fn new(spec: QuerySpec, kind: CollectionKind, config: KindConfig) -> Self {
        Self {
            spec,
            kind,
            config,
            cached: None,
            dirty: true,
            recomputes: 0,
        }
    }

    #[inline]
    pub fn spec(&self) -> &QuerySpec {
        &self.spec
    }

    #[inline]
    pub fn kind(&self) -> CollectionKind {
        self.kind
    }

    #[inline]
    pub fn config(&self) -> &KindConfig {
        &self.config
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// How many from-scratch walks this collection has performed
    #[inline]
    pub fn recomputes(&self) -> u64 {
        self.recomputes
    }

    /// Recompute if dirty, then expose the member list
    pub fn ensure_clean(&mut self, tree: &Tree, profile: &Profile) -> &[NodeId] {
        if self.dirty || self.cached.is_none() {
            let members = self.spec.evaluate(tree, profile);
            tracing::trace!(members = members.len(), "live collection recomputed");
            self.cached = Some(members);
            self.dirty = false;
            self.recomputes += 1;
        }
        self.cached.as_deref().unwrap_or_default()
    }

    /// Classify one mutation and update the dirty flag
    fn apply(&mut self, event: &Mutation, tree: &Tree, profile: &Profile) {
        if self.config.classifier.classify(event, &self.spec, tree, profile) == Effect::Invalidate {
            self.dirty = true;
        }
    }
}

/// Collection arena and mutation event bus for one document
#[derive(Debug, Default)]
pub struct CollectionSet {
    slots: Vec<Option<LiveCollection>>,
    by_key: HashMap<(QuerySpec, CollectionKind), CollectionId>,
}

impl CollectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the collection for a spec+kind, materializing it on first
    /// request. One logical query site ⇒ one shared cache.
    pub fn get_or_create(&mut self, spec: QuerySpec, kind: CollectionKind, profile: &Profile) -> CollectionId {
        if let Some(&id) = self.by_key.get(&(spec.clone(), kind)) {
            return id;
        }
        let config = KindConfig::resolve(kind, profile, &spec);
        let id = CollectionId(self.slots.len() as u32);
        self.by_key.insert((spec.clone(), kind), id);
        self.slots.push(Some(LiveCollection::new(spec, kind, config)));
        id
    }

    pub fn get(&self, id: CollectionId) -> Option<&LiveCollection> {
        self.slots.get(id.index())?.as_ref()
    }

    pub fn get_mut(&mut self, id: CollectionId) -> Option<&mut LiveCollection> {
        self.slots.get_mut(id.index())?.as_mut()
    }

    /// Dispatch one mutation to every materialized collection, in
    /// subscription order. Only dirty flags change here.
    pub fn dispatch(&mut self, event: &Mutation, tree: &Tree, profile: &Profile) {
        for collection in self.slots.iter_mut().flatten() {
            collection.apply(event, tree, profile);
        }
    }

    /// Destroy collections whose root matches `condemned`; their call
    /// sites died with the nodes (document adoption, teardown).
    pub fn drop_rooted(&mut self, condemned: impl Fn(NodeId) -> bool) {
        for slot in &mut self.slots {
            if slot.as_ref().is_some_and(|c| condemned(c.spec.root)) {
                *slot = None;
            }
        }
        self.by_key.retain(|(spec, _), _| !condemned(spec.root));
    }

    /// Number of live collections
    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
