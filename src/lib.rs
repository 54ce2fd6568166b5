#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Content Store
//!
//! Typed Put/Get/Delete operations over a content-provider style transport,
//! driven by a registry that maps runtime types to their storage handlers.
//!
//! ## Overview
//!
//! Each storable type is registered with a [`ResolverBundle`]: the Put, Get
//! and Delete handlers that know how to convert it to and from rows. A type
//! with no registration of its own inherits the mapping of its nearest
//! ancestor: superclasses first, then implemented interfaces level by level.
//! Indirect outcomes, including "no mapping", are memoized so each type walks
//! its ancestry at most once.
//!
//! ## Module Organization
//!
//! - [`types`] - Runtime type identity and declared ancestry
//! - [`registry`] - Mapping registry, hierarchy walk, resolution cache and facade
//! - [`storage`] - Content resolver transport, queries and storable objects
//! - [`operations`] - Put/Get/Delete pipelines
//! - [`store`] - The [`ContentStore`] client tying it all together
//! - [`config`] - Configuration management
//! - [`error`] - Structured error handling
//! - [`logging`] - Structured logging setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use content_store::storage::InMemoryContentResolver;
//! use content_store::{ContentStore, ResolverBundle, StoreConfig, TypeDescriptor, TypeKey};
//! use std::sync::Arc;
//!
//! struct Document;
//! struct Invoice;
//!
//! # fn example(document_bundle: ResolverBundle) -> content_store::Result<()> {
//! content_store::logging::init_structured_logging();
//!
//! let store = ContentStore::builder()
//!     .content_resolver(Arc::new(InMemoryContentResolver::new()))
//!     .add_type_mapping(TypeKey::of::<Document>(), document_bundle)
//!     .config(StoreConfig::from_environment())
//!     .build()?;
//!
//! let document = TypeDescriptor::class::<Document>().build()?;
//! let invoice = TypeDescriptor::class::<Invoice>().extends(document).build()?;
//!
//! // Invoice inherits the Document mapping
//! assert!(store.low_level().type_mapping(&invoice).is_some());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod operations;
pub mod registry;
pub mod storage;
pub mod store;
pub mod types;

#[cfg(test)]
mod test_support;

pub use config::{ResolutionCacheConfig, StoreConfig};
pub use error::{Result, StoreError};
pub use operations::{DeleteResolver, DeleteResult, GetResolver, PutResolver, PutResult};
pub use registry::{
    AncestryWalker, CacheEntry, CacheLookup, HierarchyResolver, MappingRegistry, ResolutionCache,
    ResolutionStats, ResolverBundle, TypeMappingFacade,
};
pub use storage::{ContentResolver, ContentValues, InMemoryContentResolver, StorageObject, Uri};
pub use store::{ContentStore, ContentStoreBuilder, LowLevel};
pub use types::{TypeDescriptor, TypeKey, TypeKind};
