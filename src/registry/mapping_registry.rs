//! # Mapping Registry
//!
//! Authoritative set of direct type → [`ResolverBundle`] registrations.
//!
//! Registration needs `&mut self`, so it can only happen while the registry is
//! owned by a builder. Once the owning [`TypeMappingFacade`] is built the
//! registry is never mutated again and is read without any locking.
//!
//! [`TypeMappingFacade`]: super::TypeMappingFacade

use super::resolver_bundle::ResolverBundle;
use crate::error::{Result, StoreError};
use crate::types::TypeKey;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Default)]
pub struct MappingRegistry {
    mappings: HashMap<TypeKey, Arc<ResolverBundle>>,
}

impl MappingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `bundle` for exactly `key`.
    ///
    /// Registering the same key twice is a configuration error; the first
    /// registration is kept.
    pub fn register(&mut self, key: TypeKey, bundle: Arc<ResolverBundle>) -> Result<()> {
        match self.mappings.entry(key) {
            Entry::Occupied(_) => Err(StoreError::invalid_argument(format!(
                "Type mapping for {key} is already registered"
            ))),
            Entry::Vacant(vacant) => {
                vacant.insert(bundle);
                info!(type_name = key.name(), "Registered type mapping");
                Ok(())
            }
        }
    }

    /// Exact-match lookup; never consults ancestry
    pub fn lookup_direct(&self, key: TypeKey) -> Option<&Arc<ResolverBundle>> {
        self.mappings.get(&key)
    }

    pub fn contains(&self, key: TypeKey) -> bool {
        self.mappings.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Registered keys, in no particular order
    pub fn registered_types(&self) -> impl Iterator<Item = TypeKey> + '_ {
        self.mappings.keys().copied()
    }
}
