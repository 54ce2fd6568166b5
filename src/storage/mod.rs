//! # Storage Transport
//!
//! The content-provider style transport that type mappings read from and
//! write to.
//!
//! ## Overview
//!
//! - [`ContentResolver`]: the transport seam (query/insert/update/delete by URI)
//! - [`InMemoryContentResolver`]: thread-safe in-memory transport
//! - [`Query`] / [`DeleteQuery`]: validated query descriptions
//! - [`StorageObject`]: anything that can be persisted through a type mapping
//! - [`ContentValues`] / [`Uri`]: row and address types shared by all of the above

pub mod content_resolver;
pub mod query;

pub use content_resolver::{ContentResolver, InMemoryContentResolver};
pub use query::{DeleteQuery, DeleteQueryBuilder, Query, QueryBuilder, Selection};

use crate::types::TypeDescriptor;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A single row, keyed by column name
pub type ContentValues = BTreeMap<String, serde_json::Value>;

/// Address of a collection or item inside a content provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Uri(String);

impl Uri {
    pub fn parse(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Append a path segment, e.g. the id of an inserted row
    pub fn with_appended_id(&self, id: u64) -> Self {
        Self(format!("{}/{id}", self.0.trim_end_matches('/')))
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Uri {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

/// Type-erasure helpers, implemented for every `Send + Sync + 'static` type
pub trait AsAny: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync>;
}

impl<T: Any + Send + Sync> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync> {
        self
    }
}

/// A value that can be written to and read back from a content provider.
///
/// The descriptor is the object's concrete runtime type; the registry uses it
/// to pick the Put/Get/Delete resolvers.
pub trait StorageObject: AsAny {
    fn type_descriptor(&self) -> Arc<TypeDescriptor>;
}

impl dyn StorageObject {
    /// Downcast to the concrete type, if it matches
    pub fn downcast_ref<T: StorageObject>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Take ownership of the concrete value, handing the box back on mismatch
    pub fn downcast<T: StorageObject>(
        self: Box<Self>,
    ) -> std::result::Result<Box<T>, Box<dyn StorageObject>> {
        // Deref first: `Box<dyn StorageObject>` is itself `AsAny`.
        if (*self).as_any().is::<T>() {
            Ok(self
                .into_any()
                .downcast::<T>()
                .unwrap_or_else(|_| unreachable!("type checked above")))
        } else {
            Err(self)
        }
    }
}

impl fmt::Debug for dyn StorageObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StorageObject({})", self.type_descriptor().name())
    }
}
