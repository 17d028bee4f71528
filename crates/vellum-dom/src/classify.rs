//! Effect classification
//!
//! Pure decision of whether a mutation can change a collection's
//! membership. A classifier must never panic; a spurious `Invalidate`
//! only costs one extra recompute, a missed one would be a correctness
//! bug, so every rule here errs toward invalidation.

use crate::{Mutation, Profile, QuerySpec, Tree};

/// Outcome of classifying one mutation against one spec
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    NoEffect,
    Invalidate,
}

/// Classifier variants used by the collection kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classifier {
    /// Structural mutations inside the root's subtree invalidate; an
    /// attribute change invalidates only when the predicate
    /// discriminates on it
    Conservative,
    /// Like `Conservative`, but attribute changes never invalidate.
    /// For kinds whose membership provably ignores attributes.
    IgnoreAttributes,
    /// Unconditional invalidation; the correct-but-slow fallback
    AlwaysInvalidate,
}

impl Classifier {
    /// Decide the effect of `event` on a collection described by `spec`
    pub fn classify(&self, event: &Mutation, spec: &QuerySpec, tree: &Tree, profile: &Profile) -> Effect {
        match self {
            Classifier::AlwaysInvalidate => Effect::Invalidate,
            Classifier::IgnoreAttributes => {
                if event.is_structural() {
                    structural_effect(event, spec, tree)
                } else {
                    Effect::NoEffect
                }
            }
            Classifier::Conservative => {
                if event.is_structural() {
                    structural_effect(event, spec, tree)
                } else {
                    attribute_effect(event, spec, tree, profile)
                }
            }
        }
    }
}

/// A collection rooted outside the mutated subtree is never affected:
/// its walk cannot observe nodes under a foreign anchor.
fn structural_effect(event: &Mutation, spec: &QuerySpec, tree: &Tree) -> Effect {
    if tree.is_inclusive_ancestor(spec.root, event.anchor()) {
        Effect::Invalidate
    } else {
        Effect::NoEffect
    }
}

fn attribute_effect(event: &Mutation, spec: &QuerySpec, tree: &Tree, profile: &Profile) -> Effect {
    let Mutation::AttributeChanged { node, name, .. } = event else {
        return Effect::Invalidate;
    };
    if !tree.is_inclusive_ancestor(spec.root, *node) {
        return Effect::NoEffect;
    }
    let watched = spec
        .predicate
        .discriminating_attrs()
        .iter()
        .any(|attr| profile.attr_name_eq(attr, name));
    if watched {
        Effect::Invalidate
    } else {
        Effect::NoEffect
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NodeId, Predicate, Scope};

    struct Fixture {
        tree: Tree,
        profile: Profile,
        container: NodeId,
        item: NodeId,
        outside: NodeId,
    }

    fn fixture() -> Fixture {
        let mut tree = Tree::new();
        let profile = Profile::markup();
        let container = tree.create_element("form");
        let item = tree.create_element("input");
        let outside = tree.create_element("div");
        tree.append_child(tree.root(), container).unwrap();
        tree.append_child(container, item).unwrap();
        tree.append_child(tree.root(), outside).unwrap();
        Fixture {
            tree,
            profile,
            container,
            item,
            outside,
        }
    }

    fn tag_spec(f: &Fixture) -> QuerySpec {
        QuerySpec::new(f.container, Predicate::tag(&f.profile, "input"), Scope::Subtree)
    }

    #[test]
    fn test_structural_inside_root_invalidates() {
        let mut f = fixture();
        let extra = f.tree.create_element("input");
        let event = f.tree.append_child(f.item, extra).unwrap();
        let spec = tag_spec(&f);
        assert_eq!(
            Classifier::Conservative.classify(&event, &spec, &f.tree, &f.profile),
            Effect::Invalidate
        );
    }

    #[test]
    fn test_structural_outside_root_is_local() {
        let mut f = fixture();
        let extra = f.tree.create_element("input");
        let event = f.tree.append_child(f.outside, extra).unwrap();
        let spec = tag_spec(&f);
        assert_eq!(
            Classifier::Conservative.classify(&event, &spec, &f.tree, &f.profile),
            Effect::NoEffect
        );
    }

    #[test]
    fn test_unrelated_attribute_change_has_no_effect() {
        let mut f = fixture();
        let event = f.tree.set_attribute(f.item, "class", "wide", &f.profile).unwrap();
        let spec = tag_spec(&f);
        assert_eq!(
            Classifier::Conservative.classify(&event, &spec, &f.tree, &f.profile),
            Effect::NoEffect
        );
    }

    #[test]
    fn test_identifying_attribute_change_invalidates_named_spec() {
        let mut f = fixture();
        let spec = tag_spec(&f).named_subquery("x", Some("name"));
        let event = f.tree.set_attribute(f.item, "id", "x", &f.profile).unwrap();
        assert_eq!(
            Classifier::Conservative.classify(&event, &spec, &f.tree, &f.profile),
            Effect::Invalidate
        );

        let event = f.tree.set_attribute(f.item, "name", "x", &f.profile).unwrap();
        assert_eq!(
            Classifier::Conservative.classify(&event, &spec, &f.tree, &f.profile),
            Effect::Invalidate
        );
    }

    #[test]
    fn test_ignore_attributes_variant() {
        let mut f = fixture();
        let spec = tag_spec(&f).named_subquery("x", Some("name"));
        let event = f.tree.set_attribute(f.item, "id", "x", &f.profile).unwrap();
        assert_eq!(
            Classifier::IgnoreAttributes.classify(&event, &spec, &f.tree, &f.profile),
            Effect::NoEffect
        );

        let extra = f.tree.create_element("input");
        let event = f.tree.append_child(f.container, extra).unwrap();
        assert_eq!(
            Classifier::IgnoreAttributes.classify(&event, &spec, &f.tree, &f.profile),
            Effect::Invalidate
        );
    }

    #[test]
    fn test_always_invalidate() {
        let mut f = fixture();
        let event = f.tree.set_attribute(f.outside, "class", "x", &f.profile).unwrap();
        let spec = tag_spec(&f);
        assert_eq!(
            Classifier::AlwaysInvalidate.classify(&event, &spec, &f.tree, &f.profile),
            Effect::Invalidate
        );
    }
}
