//! # Type Mapping Registry
//!
//! Resolution of a runtime type to the Put/Get/Delete handlers registered for
//! it, directly or through its ancestry.
//!
//! ## Architecture
//!
//! ```text
//! Registry
//! ├── ResolverBundle      (Put/Get/Delete handler triple)
//! ├── MappingRegistry     (direct registrations, frozen after build)
//! ├── HierarchyResolver   (superclass-then-interface walk)
//! ├── ResolutionCache     (compute-once memo of indirect outcomes)
//! └── TypeMappingFacade   (direct → cache → walk)
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use content_store::registry::{ResolverBundle, TypeMappingFacade};
//! use content_store::types::{TypeDescriptor, TypeKey};
//!
//! trait Flagged {}
//! struct Parent;
//! struct Child;
//!
//! # fn example(parent_bundle: ResolverBundle, flagged_bundle: ResolverBundle) -> content_store::Result<()> {
//! let facade = TypeMappingFacade::builder()
//!     .add_type_mapping(TypeKey::of::<Parent>(), parent_bundle)
//!     .add_type_mapping(TypeKey::of::<dyn Flagged>(), flagged_bundle)
//!     .build()?;
//!
//! let parent = TypeDescriptor::class::<Parent>().build()?;
//! let child = TypeDescriptor::class::<Child>()
//!     .extends(parent)
//!     .implements(TypeKey::of::<dyn Flagged>())
//!     .build()?;
//!
//! // The class mapping beats the interface mapping
//! let bundle = facade.resolve(&child);
//! # Ok(())
//! # }
//! ```

pub mod hierarchy_resolver;
pub mod mapping_registry;
pub mod resolution_cache;
pub mod resolver_bundle;
pub mod type_mapping_facade;

pub use hierarchy_resolver::{AncestryWalker, HierarchyResolver};
pub use mapping_registry::MappingRegistry;
pub use resolution_cache::{CacheEntry, CacheLookup, ResolutionCache};
pub use resolver_bundle::{ResolverBundle, ResolverBundleBuilder};
pub use type_mapping_facade::{ResolutionStats, TypeMappingFacade, TypeMappingFacadeBuilder};
