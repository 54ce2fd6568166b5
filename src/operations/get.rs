//! Get operation: query rows and map them back to objects.

use super::handler_failure;
use crate::error::{Result, StoreError};
use crate::logging::log_storage_operation;
use crate::storage::{ContentResolver, ContentValues, Query, StorageObject};
use crate::store::ContentStore;
use crate::types::TypeDescriptor;
use std::sync::Arc;

/// Reads rows for a mapped type and converts them to objects
pub trait GetResolver: Send + Sync {
    fn map_from_row(&self, row: &ContentValues) -> anyhow::Result<Box<dyn StorageObject>>;

    /// Fetch raw rows. The default runs the query as-is and treats a missing
    /// cursor as an error.
    fn perform_get(
        &self,
        resolver: &dyn ContentResolver,
        query: &Query,
    ) -> anyhow::Result<Vec<ContentValues>> {
        resolver
            .query(query)?
            .ok_or_else(|| StoreError::NullCursor.into())
    }
}

/// Entry point returned by [`ContentStore::get`]
pub struct GetOperation {
    store: ContentStore,
}

impl GetOperation {
    pub(crate) fn new(store: ContentStore) -> Self {
        Self { store }
    }

    /// Read objects whose mapping is resolved from `descriptor`
    pub fn list_of_objects(self, descriptor: Arc<TypeDescriptor>) -> GetListOfObjects {
        GetListOfObjects {
            store: self.store,
            descriptor,
        }
    }
}

pub struct GetListOfObjects {
    store: ContentStore,
    descriptor: Arc<TypeDescriptor>,
}

impl GetListOfObjects {
    pub fn with_query(self, query: Query) -> GetListOfObjectsWithQuery {
        GetListOfObjectsWithQuery {
            store: self.store,
            descriptor: self.descriptor,
            query,
        }
    }
}

pub struct GetListOfObjectsWithQuery {
    store: ContentStore,
    descriptor: Arc<TypeDescriptor>,
    query: Query,
}

impl GetListOfObjectsWithQuery {
    pub fn prepare(self) -> PreparedGetListOfObjects {
        PreparedGetListOfObjects {
            store: self.store,
            descriptor: self.descriptor,
            query: self.query,
        }
    }
}

pub struct PreparedGetListOfObjects {
    store: ContentStore,
    descriptor: Arc<TypeDescriptor>,
    query: Query,
}

impl PreparedGetListOfObjects {
    pub fn execute_as_blocking(&self) -> Result<Vec<Box<dyn StorageObject>>> {
        let type_name = self.descriptor.name();
        let bundle = self.store.require_type_mapping(&self.descriptor)?;
        let get_resolver = bundle.get_resolver();

        let rows = get_resolver
            .perform_get(self.store.content_resolver().as_ref(), &self.query)
            .map_err(|e| handler_failure("get", type_name, e))?;

        let objects = rows
            .iter()
            .map(|row| {
                get_resolver
                    .map_from_row(row)
                    .map_err(|e| handler_failure("get", type_name, e))
            })
            .collect::<Result<Vec<_>>>()?;

        log_storage_operation(
            "get",
            Some(type_name),
            Some(self.query.uri.as_str()),
            "ok",
            Some(objects.len() as u64),
        );
        Ok(objects)
    }

    /// Like [`execute_as_blocking`](Self::execute_as_blocking), downcasting
    /// every object to `T`
    pub fn execute_as_blocking_typed<T: StorageObject>(&self) -> Result<Vec<T>> {
        self.execute_as_blocking()?
            .into_iter()
            .map(|object| {
                object.downcast::<T>().map(|boxed| *boxed).map_err(|other| {
                    StoreError::invalid_argument(format!(
                        "Get resolver produced {} where {} was expected",
                        other.type_descriptor().name(),
                        std::any::type_name::<T>()
                    ))
                })
            })
            .collect()
    }

    pub async fn execute(self) -> Result<Vec<Box<dyn StorageObject>>> {
        let store = self.store.clone();
        store.run_blocking(move || self.execute_as_blocking()).await
    }
}
