//! Proptest strategies for randomly shaped type hierarchies.

use content_store::types::{TypeDescriptor, TypeKey, TypeKind};
use proptest::prelude::*;
use std::sync::Arc;

pub const MAX_DEPTH: usize = 8;
pub const FACET_COUNT: usize = 8;

pub struct Node<const N: usize>;
pub trait Facet<const N: usize> {}

macro_rules! class_keys {
    ($($n:literal),*) => { vec![$(TypeKey::of::<Node<$n>>()),*] };
}

macro_rules! facet_keys {
    ($($n:literal),*) => { vec![$(TypeKey::of::<dyn Facet<$n>>()),*] };
}

/// Distinct class keys, index 0 is the most derived
pub fn class_keys() -> Vec<TypeKey> {
    class_keys!(0, 1, 2, 3, 4, 5, 6, 7)
}

pub fn facet_keys() -> Vec<TypeKey> {
    facet_keys!(0, 1, 2, 3, 4, 5, 6, 7)
}

/// A superclass chain with the facets each level declares, plus which of
/// those classes and facets carry a registration
#[derive(Debug, Clone)]
pub struct Hierarchy {
    /// `levels[0]` is the concrete type; each entry lists declared facet indices
    pub levels: Vec<Vec<usize>>,
    pub mapped_classes: Vec<usize>,
    pub mapped_facets: Vec<usize>,
}

/// What a correct resolver must return for the concrete type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    Class(usize),
    Facet(usize),
    Nothing,
}

impl Hierarchy {
    /// Descriptor for the concrete type, built root first
    pub fn concrete_descriptor(&self) -> Arc<TypeDescriptor> {
        let classes = class_keys();
        let facets = facet_keys();
        let mut parent: Option<Arc<TypeDescriptor>> = None;

        for (index, declared) in self.levels.iter().enumerate().rev() {
            let mut builder = TypeDescriptor::with_key(classes[index], TypeKind::Class);
            if let Some(parent) = parent.take() {
                builder = builder.extends(parent);
            }
            for facet in declared {
                builder = builder.implements(facets[*facet]);
            }
            parent = Some(builder.build().expect("generated hierarchy is valid"));
        }

        parent.expect("hierarchy has at least one level")
    }

    pub fn expected(&self) -> Expected {
        if let Some(class) = (0..self.levels.len()).find(|i| self.mapped_classes.contains(i)) {
            return Expected::Class(class);
        }

        for declared in &self.levels {
            // Repeated declarations keep their first position
            let mut seen = Vec::new();
            for facet in declared {
                if seen.contains(facet) {
                    continue;
                }
                seen.push(*facet);
                if self.mapped_facets.contains(facet) {
                    return Expected::Facet(*facet);
                }
            }
        }

        Expected::Nothing
    }
}

pub fn hierarchy_strategy() -> impl Strategy<Value = Hierarchy> {
    (1..=MAX_DEPTH)
        .prop_flat_map(|depth| {
            (
                prop::collection::vec(prop::collection::vec(0..FACET_COUNT, 0..4), depth),
                prop::collection::vec(0..depth, 0..3),
                prop::collection::vec(0..FACET_COUNT, 0..4),
            )
        })
        .prop_map(|(levels, mut mapped_classes, mut mapped_facets)| {
            // A type may be registered only once
            mapped_classes.sort_unstable();
            mapped_classes.dedup();
            mapped_facets.sort_unstable();
            mapped_facets.dedup();
            Hierarchy {
                levels,
                mapped_classes,
                mapped_facets,
            }
        })
}
