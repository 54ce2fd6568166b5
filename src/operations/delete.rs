//! Delete operation: remove objects through their type mapping, or rows by
//! query.

use super::handler_failure;
use crate::error::Result;
use crate::logging::log_storage_operation;
use crate::storage::{ContentResolver, DeleteQuery, StorageObject};
use crate::store::ContentStore;
use std::sync::Arc;

/// Deletes one object of a mapped type
pub trait DeleteResolver: Send + Sync {
    fn perform_delete(
        &self,
        resolver: &dyn ContentResolver,
        object: &dyn StorageObject,
    ) -> anyhow::Result<DeleteResult>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteResult {
    pub deleted_rows: u64,
}

impl DeleteResult {
    pub fn new(deleted_rows: u64) -> Self {
        Self { deleted_rows }
    }
}

/// Outcomes of deleting objects, in input order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteResults {
    pub results: Vec<DeleteResult>,
}

impl DeleteResults {
    pub fn total_deleted_rows(&self) -> u64 {
        self.results.iter().map(|r| r.deleted_rows).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteByQueryResult {
    pub query: DeleteQuery,
    pub deleted_rows: u64,
}

/// Entry point returned by [`ContentStore::delete`]
pub struct DeleteOperation {
    store: ContentStore,
}

impl DeleteOperation {
    pub(crate) fn new(store: ContentStore) -> Self {
        Self { store }
    }

    pub fn object<T: StorageObject>(self, object: T) -> DeleteObjects {
        DeleteObjects {
            store: self.store,
            objects: vec![Arc::new(object) as Arc<dyn StorageObject>],
        }
    }

    pub fn objects<T, I>(self, objects: I) -> DeleteObjects
    where
        T: StorageObject,
        I: IntoIterator<Item = T>,
    {
        DeleteObjects {
            store: self.store,
            objects: objects
                .into_iter()
                .map(|object| Arc::new(object) as Arc<dyn StorageObject>)
                .collect(),
        }
    }

    pub fn dyn_objects(self, objects: Vec<Arc<dyn StorageObject>>) -> DeleteObjects {
        DeleteObjects {
            store: self.store,
            objects,
        }
    }

    /// Delete rows directly; no type mapping is involved
    pub fn by_query(self, query: DeleteQuery) -> DeleteByQuery {
        DeleteByQuery {
            store: self.store,
            query,
        }
    }
}

pub struct DeleteObjects {
    store: ContentStore,
    objects: Vec<Arc<dyn StorageObject>>,
}

impl DeleteObjects {
    pub fn prepare(self) -> PreparedDeleteObjects {
        PreparedDeleteObjects {
            store: self.store,
            objects: self.objects,
        }
    }
}

pub struct PreparedDeleteObjects {
    store: ContentStore,
    objects: Vec<Arc<dyn StorageObject>>,
}

impl PreparedDeleteObjects {
    /// Delete every object on the calling thread. Stops at the first failure.
    pub fn execute_as_blocking(&self) -> Result<DeleteResults> {
        let mut results = Vec::with_capacity(self.objects.len());

        for object in &self.objects {
            let descriptor = object.type_descriptor();
            let bundle = self.store.require_type_mapping(&descriptor)?;

            let result = bundle
                .delete_resolver()
                .perform_delete(self.store.content_resolver().as_ref(), object.as_ref())
                .map_err(|e| handler_failure("delete", descriptor.name(), e))?;

            log_storage_operation(
                "delete",
                Some(descriptor.name()),
                None,
                "ok",
                Some(result.deleted_rows),
            );
            results.push(result);
        }

        Ok(DeleteResults { results })
    }

    pub async fn execute(self) -> Result<DeleteResults> {
        let store = self.store.clone();
        store.run_blocking(move || self.execute_as_blocking()).await
    }
}

pub struct DeleteByQuery {
    store: ContentStore,
    query: DeleteQuery,
}

impl DeleteByQuery {
    pub fn prepare(self) -> PreparedDeleteByQuery {
        PreparedDeleteByQuery {
            store: self.store,
            query: self.query,
        }
    }
}

pub struct PreparedDeleteByQuery {
    store: ContentStore,
    query: DeleteQuery,
}

impl PreparedDeleteByQuery {
    pub fn execute_as_blocking(&self) -> Result<DeleteByQueryResult> {
        let deleted_rows = self
            .store
            .content_resolver()
            .delete(&self.query.uri, &self.query.selection)?;

        log_storage_operation(
            "delete_by_query",
            None,
            Some(self.query.uri.as_str()),
            "ok",
            Some(deleted_rows),
        );
        Ok(DeleteByQueryResult {
            query: self.query.clone(),
            deleted_rows,
        })
    }

    pub async fn execute(self) -> Result<DeleteByQueryResult> {
        let store = self.store.clone();
        store.run_blocking(move || self.execute_as_blocking()).await
    }
}
