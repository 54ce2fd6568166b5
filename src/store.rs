//! # Content Store
//!
//! Storage client that ties a [`ContentResolver`] to the type mapping
//! registry and exposes typed Put/Get/Delete operations.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use content_store::storage::InMemoryContentResolver;
//! use content_store::registry::ResolverBundle;
//! use content_store::types::TypeKey;
//! use content_store::ContentStore;
//! use std::sync::Arc;
//!
//! struct User;
//!
//! # fn example(user_bundle: ResolverBundle) -> content_store::Result<()> {
//! let store = ContentStore::builder()
//!     .content_resolver(Arc::new(InMemoryContentResolver::new()))
//!     .add_type_mapping(TypeKey::of::<User>(), user_bundle)
//!     .build()?;
//!
//! let stats = store.low_level().type_mappings().stats();
//! assert_eq!(stats.registered_types, 1);
//! # Ok(())
//! # }
//! ```

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::operations::{DeleteOperation, GetOperation, PutOperation};
use crate::registry::{HierarchyResolver, ResolverBundle, TypeMappingFacade, TypeMappingFacadeBuilder};
use crate::storage::{ContentResolver, ContentValues, Query, Selection, Uri};
use crate::types::{TypeDescriptor, TypeKey};
use std::fmt;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::debug;

/// Cheaply cloneable handle to a built store
#[derive(Clone)]
pub struct ContentStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    content_resolver: Arc<dyn ContentResolver>,
    type_mappings: TypeMappingFacade,
    default_runtime: Option<Handle>,
}

impl ContentStore {
    pub fn builder() -> ContentStoreBuilder {
        ContentStoreBuilder::default()
    }

    pub fn put(&self) -> PutOperation {
        PutOperation::new(self.clone())
    }

    pub fn get(&self) -> GetOperation {
        GetOperation::new(self.clone())
    }

    pub fn delete(&self) -> DeleteOperation {
        DeleteOperation::new(self.clone())
    }

    /// Direct access to mappings and the transport
    pub fn low_level(&self) -> LowLevel<'_> {
        LowLevel { store: self }
    }

    /// Runtime used by `execute().await`; `None` means the caller's runtime
    pub fn default_runtime(&self) -> Option<&Handle> {
        self.inner.default_runtime.as_ref()
    }

    pub(crate) fn content_resolver(&self) -> &Arc<dyn ContentResolver> {
        &self.inner.content_resolver
    }

    /// Resolve the mapping of `descriptor` or fail with `NoMapping`
    pub(crate) fn require_type_mapping(
        &self,
        descriptor: &TypeDescriptor,
    ) -> Result<Arc<ResolverBundle>> {
        self.inner
            .type_mappings
            .resolve(descriptor)
            .ok_or_else(|| StoreError::no_mapping(descriptor.name()))
    }

    /// Run blocking work on the configured runtime's blocking pool
    pub(crate) async fn run_blocking<T, F>(&self, work: F) -> Result<T>
    where
        F: FnOnce() -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let handle = match &self.inner.default_runtime {
            Some(handle) => handle.clone(),
            None => Handle::try_current()
                .map_err(|e| StoreError::execution(format!("No tokio runtime available: {e}")))?,
        };

        handle
            .spawn_blocking(work)
            .await
            .map_err(|e| StoreError::execution(format!("Blocking operation failed: {e}")))?
    }
}

impl fmt::Debug for ContentStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentStore")
            .field("content_resolver", &"<Arc<dyn ContentResolver>>")
            .field("type_mappings", &self.inner.type_mappings)
            .field("default_runtime", &self.inner.default_runtime.is_some())
            .finish()
    }
}

/// Low-level API: mapping lookup and raw transport calls
pub struct LowLevel<'a> {
    store: &'a ContentStore,
}

impl LowLevel<'_> {
    /// Mapping for the concrete type, direct or inherited
    pub fn type_mapping(&self, descriptor: &TypeDescriptor) -> Option<Arc<ResolverBundle>> {
        self.store.inner.type_mappings.resolve(descriptor)
    }

    /// Mapping registered or already resolved for `key`
    pub fn type_mapping_for_key(&self, key: TypeKey) -> Option<Arc<ResolverBundle>> {
        self.store.inner.type_mappings.resolve_key(key)
    }

    pub fn type_mappings(&self) -> &TypeMappingFacade {
        &self.store.inner.type_mappings
    }

    pub fn content_resolver(&self) -> &Arc<dyn ContentResolver> {
        self.store.content_resolver()
    }

    pub fn query(&self, query: &Query) -> Result<Vec<ContentValues>> {
        let rows = self
            .content_resolver()
            .query(query)?
            .ok_or(StoreError::NullCursor)?;
        debug!(uri = %query.uri, rows = rows.len(), "Low-level query");
        Ok(rows)
    }

    pub fn insert(&self, uri: &Uri, values: ContentValues) -> Result<Option<Uri>> {
        self.content_resolver().insert(uri, values)
    }

    pub fn update(&self, uri: &Uri, values: ContentValues, selection: &Selection) -> Result<u64> {
        self.content_resolver().update(uri, values, selection)
    }

    pub fn delete(&self, uri: &Uri, selection: &Selection) -> Result<u64> {
        self.content_resolver().delete(uri, selection)
    }
}

/// Builder for [`ContentStore`]; a content resolver is required
#[derive(Default)]
pub struct ContentStoreBuilder {
    content_resolver: Option<Arc<dyn ContentResolver>>,
    type_mappings: TypeMappingFacadeBuilder,
    default_runtime: Option<Handle>,
}

impl ContentStoreBuilder {
    pub fn content_resolver(mut self, resolver: Arc<dyn ContentResolver>) -> Self {
        self.content_resolver = Some(resolver);
        self
    }

    pub fn add_type_mapping(mut self, key: TypeKey, bundle: impl Into<Arc<ResolverBundle>>) -> Self {
        self.type_mappings = self.type_mappings.add_type_mapping(key, bundle);
        self
    }

    pub fn hierarchy_resolver(mut self, resolver: Arc<dyn HierarchyResolver>) -> Self {
        self.type_mappings = self.type_mappings.hierarchy_resolver(resolver);
        self
    }

    pub fn config(mut self, config: StoreConfig) -> Self {
        self.type_mappings = self.type_mappings.config(config);
        self
    }

    /// Runtime whose blocking pool serves `execute().await`
    pub fn default_runtime(mut self, handle: Handle) -> Self {
        self.default_runtime = Some(handle);
        self
    }

    pub fn build(self) -> Result<ContentStore> {
        let content_resolver = self.content_resolver.ok_or_else(|| {
            StoreError::invalid_argument("Please specify a content resolver")
        })?;
        let type_mappings = self.type_mappings.build()?;

        Ok(ContentStore {
            inner: Arc::new(StoreInner {
                content_resolver,
                type_mappings,
                default_runtime: self.default_runtime,
            }),
        })
    }
}
