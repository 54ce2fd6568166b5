//! # Type Mapping Facade
//!
//! Single entry point for resolving the [`ResolverBundle`] of a runtime type.
//!
//! ## Lookup tiers
//!
//! ```text
//! resolve(descriptor)
//!   ├─ MappingRegistry::lookup_direct   hit → return (cache untouched)
//!   ├─ ResolutionCache::lookup          hit → return cached Found / NoMapping
//!   └─ HierarchyResolver                walk once, cache outcome, return
//! ```
//!
//! A cached key is only reused for a descriptor with the same lineage. A
//! descriptor that redeclares a resolved type with a different ancestry is
//! logged, counted in [`ResolutionStats::lineage_conflicts`] and walked
//! without touching the cache.
//!
//! The registry is frozen when the facade is built, so the only shared
//! mutable state afterwards is the resolution cache.
//!
//! ## Usage
//!
//! ```rust
//! use content_store::registry::TypeMappingFacade;
//! use content_store::types::TypeDescriptor;
//!
//! struct Unmapped;
//!
//! # fn main() -> content_store::Result<()> {
//! let facade = TypeMappingFacade::builder().build()?;
//! let descriptor = TypeDescriptor::class::<Unmapped>().build()?;
//!
//! assert!(facade.resolve(&descriptor).is_none());
//! # Ok(())
//! # }
//! ```

use super::hierarchy_resolver::{AncestryWalker, HierarchyResolver};
use super::mapping_registry::MappingRegistry;
use super::resolution_cache::{CacheEntry, CacheLookup, ResolutionCache};
use super::resolver_bundle::ResolverBundle;
use crate::config::StoreConfig;
use crate::error::Result;
use crate::logging::log_registry_operation;
use crate::types::{TypeDescriptor, TypeKey};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Resolution counters and cache occupancy
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionStats {
    pub registered_types: usize,
    pub cached_entries: usize,
    pub cached_negative_entries: usize,
    pub direct_hits: u64,
    pub cache_hits: u64,
    pub hierarchy_walks: u64,
    pub lineage_conflicts: u64,
}

#[derive(Debug, Default)]
struct ResolutionCounters {
    direct_hits: AtomicU64,
    cache_hits: AtomicU64,
    hierarchy_walks: AtomicU64,
    lineage_conflicts: AtomicU64,
}

pub struct TypeMappingFacade {
    registry: MappingRegistry,
    cache: ResolutionCache,
    hierarchy_resolver: Arc<dyn HierarchyResolver>,
    config: StoreConfig,
    counters: ResolutionCounters,
    size_warning_logged: AtomicBool,
}

impl TypeMappingFacade {
    pub fn builder() -> TypeMappingFacadeBuilder {
        TypeMappingFacadeBuilder::default()
    }

    /// Resolve the bundle for the concrete type described by `descriptor`.
    ///
    /// `None` means neither the type nor anything in its ancestry is mapped.
    pub fn resolve(&self, descriptor: &TypeDescriptor) -> Option<Arc<ResolverBundle>> {
        let key = descriptor.key();

        if let Some(bundle) = self.registry.lookup_direct(key) {
            self.counters.direct_hits.fetch_add(1, Ordering::Relaxed);
            return Some(Arc::clone(bundle));
        }

        if !self.config.resolution_cache.enabled {
            return self.walk(descriptor).into_bundle();
        }

        match self.cache.lookup(descriptor) {
            Some(CacheLookup::Hit(entry)) => {
                self.counters.cache_hits.fetch_add(1, Ordering::Relaxed);
                return entry.into_bundle();
            }
            Some(CacheLookup::LineageMismatch) => return self.resolve_conflicting(descriptor),
            None => {}
        }

        match self.cache.get_or_compute(descriptor, || self.walk(descriptor)) {
            CacheLookup::Hit(entry) => {
                self.check_cache_size();
                entry.into_bundle()
            }
            CacheLookup::LineageMismatch => self.resolve_conflicting(descriptor),
        }
    }

    /// Resolve by key alone: direct registrations and already cached
    /// outcomes. Without a descriptor there is no ancestry to walk, so a type
    /// that was never resolved through [`resolve`](Self::resolve) is `None`.
    pub fn resolve_key(&self, key: TypeKey) -> Option<Arc<ResolverBundle>> {
        self.registry
            .lookup_direct(key)
            .cloned()
            .or_else(|| self.cache.get(key).and_then(CacheEntry::into_bundle))
    }

    /// True if `key` was registered directly
    pub fn is_registered(&self, key: TypeKey) -> bool {
        self.registry.contains(key)
    }

    pub fn registry(&self) -> &MappingRegistry {
        &self.registry
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn stats(&self) -> ResolutionStats {
        ResolutionStats {
            registered_types: self.registry.len(),
            cached_entries: self.cache.len(),
            cached_negative_entries: self.cache.negative_len(),
            direct_hits: self.counters.direct_hits.load(Ordering::Relaxed),
            cache_hits: self.counters.cache_hits.load(Ordering::Relaxed),
            hierarchy_walks: self.counters.hierarchy_walks.load(Ordering::Relaxed),
            lineage_conflicts: self.counters.lineage_conflicts.load(Ordering::Relaxed),
        }
    }

    /// The key is cached from another lineage; answer for this descriptor
    /// without replacing the cached outcome
    fn resolve_conflicting(&self, descriptor: &TypeDescriptor) -> Option<Arc<ResolverBundle>> {
        self.counters.lineage_conflicts.fetch_add(1, Ordering::Relaxed);
        warn!(
            type_name = descriptor.name(),
            lineage_depth = descriptor.lineage().len(),
            "Type resolved earlier with a different ancestry; walking uncached"
        );
        self.walk(descriptor).into_bundle()
    }

    fn walk(&self, descriptor: &TypeDescriptor) -> CacheEntry {
        self.counters.hierarchy_walks.fetch_add(1, Ordering::Relaxed);
        let entry = self
            .hierarchy_resolver
            .resolve_indirect(&self.registry, descriptor);

        if self.config.log_resolutions {
            debug!(
                type_name = descriptor.name(),
                found = !entry.is_no_mapping(),
                "Indirect type mapping resolved"
            );
        }
        entry
    }

    fn check_cache_size(&self) {
        let threshold = self.config.resolution_cache.warn_threshold;
        if self.size_warning_logged.load(Ordering::Relaxed) {
            return;
        }
        let size = self.cache.len();
        if size >= threshold && !self.size_warning_logged.swap(true, Ordering::Relaxed) {
            warn!(
                cached_types = size,
                threshold, "Resolution cache reached its warning threshold"
            );
        }
    }
}

impl fmt::Debug for TypeMappingFacade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeMappingFacade")
            .field("registry", &self.registry)
            .field("cache", &self.cache)
            .field("hierarchy_resolver", &"<Arc<dyn HierarchyResolver>>")
            .field("config", &self.config)
            .finish()
    }
}

/// Collects registrations; every configuration error surfaces from
/// [`build`](Self::build)
#[derive(Default)]
pub struct TypeMappingFacadeBuilder {
    mappings: Vec<(TypeKey, Arc<ResolverBundle>)>,
    hierarchy_resolver: Option<Arc<dyn HierarchyResolver>>,
    config: Option<StoreConfig>,
}

impl TypeMappingFacadeBuilder {
    pub fn add_type_mapping(
        mut self,
        key: TypeKey,
        bundle: impl Into<Arc<ResolverBundle>>,
    ) -> Self {
        self.mappings.push((key, bundle.into()));
        self
    }

    /// Replace the default [`AncestryWalker`]
    pub fn hierarchy_resolver(mut self, resolver: Arc<dyn HierarchyResolver>) -> Self {
        self.hierarchy_resolver = Some(resolver);
        self
    }

    pub fn config(mut self, config: StoreConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Register everything and freeze the registry. Fails on the first
    /// duplicate registration or invalid configuration.
    pub fn build(self) -> Result<TypeMappingFacade> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let mut registry = MappingRegistry::new();
        for (key, bundle) in self.mappings {
            registry.register(key, bundle)?;
        }

        log_registry_operation(
            "build",
            None,
            "ready",
            Some(&format!("{} type mappings", registry.len())),
        );

        Ok(TypeMappingFacade {
            registry,
            cache: ResolutionCache::new(),
            hierarchy_resolver: self
                .hierarchy_resolver
                .unwrap_or_else(|| Arc::new(AncestryWalker::new())),
            config,
            counters: ResolutionCounters::default(),
            size_warning_logged: AtomicBool::new(false),
        })
    }
}
