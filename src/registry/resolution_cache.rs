//! # Resolution Cache
//!
//! Memoized outcomes of indirect resolution, keyed by concrete type.
//!
//! Each key owns an `Arc<OnceLock<..>>`. The `DashMap` shard lock is held
//! only long enough to fetch or insert that cell; the hierarchy walk itself
//! runs inside `OnceLock::get_or_init`, which makes concurrent callers for the
//! same key wait for the first computation instead of repeating it. Callers
//! for different keys never wait on each other's walk.
//!
//! Every entry remembers the lineage it was resolved from. A descriptor that
//! reuses a cached key with a different ancestry gets
//! [`CacheLookup::LineageMismatch`] instead of the other lineage's outcome.
//!
//! Entries are never evicted: resolution is a pure function of the immutable
//! registry and the lineage, so a cached outcome stays correct for the
//! cache's lifetime.

use super::resolver_bundle::ResolverBundle;
use crate::types::{LineageLevel, TypeDescriptor, TypeKey};
use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Memoized outcome of resolving one concrete type
#[derive(Debug, Clone)]
pub enum CacheEntry {
    /// A mapping was found through the type's ancestry
    Found(Arc<ResolverBundle>),
    /// The type is known to have no mapping
    NoMapping,
}

impl CacheEntry {
    pub fn bundle(&self) -> Option<&Arc<ResolverBundle>> {
        match self {
            Self::Found(bundle) => Some(bundle),
            Self::NoMapping => None,
        }
    }

    pub fn into_bundle(self) -> Option<Arc<ResolverBundle>> {
        match self {
            Self::Found(bundle) => Some(bundle),
            Self::NoMapping => None,
        }
    }

    pub fn is_no_mapping(&self) -> bool {
        matches!(self, Self::NoMapping)
    }

    /// Same outcome, comparing bundles by identity
    pub fn same_outcome(&self, other: &CacheEntry) -> bool {
        match (self, other) {
            (Self::Found(a), Self::Found(b)) => Arc::ptr_eq(a, b),
            (Self::NoMapping, Self::NoMapping) => true,
            _ => false,
        }
    }
}

impl From<Option<Arc<ResolverBundle>>> for CacheEntry {
    fn from(bundle: Option<Arc<ResolverBundle>>) -> Self {
        bundle.map_or(Self::NoMapping, Self::Found)
    }
}

/// Result of consulting the cache with a descriptor
#[derive(Debug, Clone)]
pub enum CacheLookup {
    /// Outcome cached for this exact lineage
    Hit(CacheEntry),
    /// The key was cached from a descriptor with a different lineage
    LineageMismatch,
}

impl CacheLookup {
    pub fn entry(self) -> Option<CacheEntry> {
        match self {
            Self::Hit(entry) => Some(entry),
            Self::LineageMismatch => None,
        }
    }
}

#[derive(Debug)]
struct Resolved {
    lineage: Vec<LineageLevel>,
    entry: CacheEntry,
}

impl Resolved {
    fn lookup(&self, descriptor: &TypeDescriptor) -> CacheLookup {
        if self.lineage.as_slice() == descriptor.lineage() {
            CacheLookup::Hit(self.entry.clone())
        } else {
            CacheLookup::LineageMismatch
        }
    }
}

#[derive(Debug, Default)]
pub struct ResolutionCache {
    entries: DashMap<TypeKey, Arc<OnceLock<Resolved>>>,
    completed: AtomicUsize,
    negative: AtomicUsize,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached outcome for `key`, if resolution has completed, whatever
    /// lineage it was resolved from
    pub fn get(&self, key: TypeKey) -> Option<CacheEntry> {
        self.entries
            .get(&key)
            .and_then(|cell| cell.value().get().map(|resolved| resolved.entry.clone()))
    }

    /// Cached outcome for the descriptor's key, checked against its lineage
    pub fn lookup(&self, descriptor: &TypeDescriptor) -> Option<CacheLookup> {
        self.entries
            .get(&descriptor.key())
            .and_then(|cell| cell.value().get().map(|resolved| resolved.lookup(descriptor)))
    }

    /// Publish an outcome for `descriptor`. The first write wins; a later
    /// write for the same lineage must describe the same outcome.
    pub fn put(&self, descriptor: &TypeDescriptor, entry: CacheEntry) {
        let key = descriptor.key();
        let cell = self.cell(key);
        match cell.set(Resolved {
            lineage: descriptor.lineage().to_vec(),
            entry,
        }) {
            Ok(()) => {
                if let Some(resolved) = cell.get() {
                    self.record(&resolved.entry);
                }
            }
            Err(rejected) => {
                debug_assert!(
                    cell.get().is_some_and(|stored| stored.lineage != rejected.lineage
                        || stored.entry.same_outcome(&rejected.entry)),
                    "conflicting resolution outcomes cached for {key}"
                );
                debug!(type_name = key.name(), "Resolution already cached");
            }
        }
    }

    /// Return the cached outcome for the descriptor, computing it at most
    /// once per key.
    ///
    /// Concurrent callers for the same key block until the first caller's
    /// `compute` finishes, then share its result if their lineage matches.
    pub fn get_or_compute<F>(&self, descriptor: &TypeDescriptor, compute: F) -> CacheLookup
    where
        F: FnOnce() -> CacheEntry,
    {
        let cell = self.cell(descriptor.key());
        let mut computed = false;
        let resolved = cell.get_or_init(|| {
            computed = true;
            Resolved {
                lineage: descriptor.lineage().to_vec(),
                entry: compute(),
            }
        });
        if computed {
            self.record(&resolved.entry);
        }
        resolved.lookup(descriptor)
    }

    /// Number of completed entries
    pub fn len(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of completed entries recording that no mapping exists
    pub fn negative_len(&self) -> usize {
        self.negative.load(Ordering::Relaxed)
    }

    fn record(&self, entry: &CacheEntry) {
        self.completed.fetch_add(1, Ordering::Relaxed);
        if entry.is_no_mapping() {
            self.negative.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn cell(&self, key: TypeKey) -> Arc<OnceLock<Resolved>> {
        if let Some(cell) = self.entries.get(&key) {
            return Arc::clone(cell.value());
        }
        let cell = self
            .entries
            .entry(key)
            .or_insert_with(|| Arc::new(OnceLock::new()));
        Arc::clone(cell.value())
    }
}
