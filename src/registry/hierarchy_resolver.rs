//! # Hierarchy Resolver
//!
//! Finds the mapping for a type that has no direct registration by walking
//! its precomputed lineage.
//!
//! ## Precedence
//!
//! 1. Superclass chain, nearest ancestor first. The first registered
//!    ancestor wins, so any class match beats any interface match and a
//!    parent beats a grandparent.
//! 2. Interfaces, level by level in the same order (concrete type first).
//!    Within one level, the interface declared first wins.
//! 3. Otherwise [`CacheEntry::NoMapping`], a normal cacheable outcome.
//!
//! The walk reads only the immutable [`MappingRegistry`] and the descriptor,
//! so it is a pure function and safe to run on any thread.

use super::mapping_registry::MappingRegistry;
use super::resolution_cache::CacheEntry;
use crate::types::TypeDescriptor;
use tracing::trace;

/// Strategy for indirect (ancestry based) resolution
pub trait HierarchyResolver: Send + Sync {
    /// Resolve `descriptor` through its ancestry. Never fails; absence is
    /// reported as [`CacheEntry::NoMapping`].
    fn resolve_indirect(
        &self,
        registry: &MappingRegistry,
        descriptor: &TypeDescriptor,
    ) -> CacheEntry;
}

/// Default [`HierarchyResolver`]: superclasses first, then interfaces
#[derive(Debug, Clone, Copy, Default)]
pub struct AncestryWalker;

impl AncestryWalker {
    pub fn new() -> Self {
        Self
    }
}

impl HierarchyResolver for AncestryWalker {
    fn resolve_indirect(
        &self,
        registry: &MappingRegistry,
        descriptor: &TypeDescriptor,
    ) -> CacheEntry {
        for ancestor in descriptor.ancestors() {
            if let Some(bundle) = registry.lookup_direct(ancestor) {
                trace!(
                    type_name = descriptor.name(),
                    matched = ancestor.name(),
                    "Resolved through superclass"
                );
                return CacheEntry::Found(bundle.clone());
            }
        }

        for level in descriptor.lineage() {
            for interface in &level.interfaces {
                if let Some(bundle) = registry.lookup_direct(*interface) {
                    trace!(
                        type_name = descriptor.name(),
                        declared_by = level.class.name(),
                        matched = interface.name(),
                        "Resolved through interface"
                    );
                    return CacheEntry::Found(bundle.clone());
                }
            }
        }

        trace!(type_name = descriptor.name(), "No indirect mapping");
        CacheEntry::NoMapping
    }
}
