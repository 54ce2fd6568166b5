//! Put operation: insert or update objects through their type mapping.

use super::handler_failure;
use crate::error::Result;
use crate::logging::log_storage_operation;
use crate::storage::{ContentResolver, StorageObject, Uri};
use crate::store::ContentStore;
use std::sync::Arc;

/// Writes one object of a mapped type
pub trait PutResolver: Send + Sync {
    fn perform_put(
        &self,
        resolver: &dyn ContentResolver,
        object: &dyn StorageObject,
    ) -> anyhow::Result<PutResult>;
}

/// Outcome of writing a single object
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutResult {
    pub inserted_uri: Option<Uri>,
    pub updated_rows: u64,
}

impl PutResult {
    pub fn inserted(uri: Uri) -> Self {
        Self {
            inserted_uri: Some(uri),
            updated_rows: 0,
        }
    }

    pub fn updated(rows: u64) -> Self {
        Self {
            inserted_uri: None,
            updated_rows: rows,
        }
    }

    pub fn was_inserted(&self) -> bool {
        self.inserted_uri.is_some()
    }

    pub fn was_updated(&self) -> bool {
        self.updated_rows > 0
    }
}

/// Outcomes of a put, in input order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutResults {
    pub results: Vec<PutResult>,
}

impl PutResults {
    pub fn number_of_inserts(&self) -> usize {
        self.results.iter().filter(|r| r.was_inserted()).count()
    }

    pub fn number_of_updates(&self) -> u64 {
        self.results.iter().map(|r| r.updated_rows).sum()
    }

    pub fn first(&self) -> Option<&PutResult> {
        self.results.first()
    }
}

/// Entry point returned by [`ContentStore::put`]
pub struct PutOperation {
    store: ContentStore,
}

impl PutOperation {
    pub(crate) fn new(store: ContentStore) -> Self {
        Self { store }
    }

    pub fn object<T: StorageObject>(self, object: T) -> PutObjects {
        PutObjects {
            store: self.store,
            objects: vec![Arc::new(object) as Arc<dyn StorageObject>],
        }
    }

    pub fn objects<T, I>(self, objects: I) -> PutObjects
    where
        T: StorageObject,
        I: IntoIterator<Item = T>,
    {
        PutObjects {
            store: self.store,
            objects: objects
                .into_iter()
                .map(|object| Arc::new(object) as Arc<dyn StorageObject>)
                .collect(),
        }
    }

    /// Put already type-erased objects
    pub fn dyn_objects(self, objects: Vec<Arc<dyn StorageObject>>) -> PutObjects {
        PutObjects {
            store: self.store,
            objects,
        }
    }
}

pub struct PutObjects {
    store: ContentStore,
    objects: Vec<Arc<dyn StorageObject>>,
}

impl PutObjects {
    pub fn prepare(self) -> PreparedPut {
        PreparedPut {
            store: self.store,
            objects: self.objects,
        }
    }
}

pub struct PreparedPut {
    store: ContentStore,
    objects: Vec<Arc<dyn StorageObject>>,
}

impl PreparedPut {
    /// Write every object on the calling thread. Stops at the first failure.
    pub fn execute_as_blocking(&self) -> Result<PutResults> {
        let mut results = Vec::with_capacity(self.objects.len());

        for object in &self.objects {
            let descriptor = object.type_descriptor();
            let bundle = self.store.require_type_mapping(&descriptor)?;

            let result = bundle
                .put_resolver()
                .perform_put(self.store.content_resolver().as_ref(), object.as_ref())
                .map_err(|e| handler_failure("put", descriptor.name(), e))?;

            log_storage_operation(
                "put",
                Some(descriptor.name()),
                result.inserted_uri.as_ref().map(Uri::as_str),
                "ok",
                Some(result.updated_rows),
            );
            results.push(result);
        }

        Ok(PutResults { results })
    }

    /// Run [`execute_as_blocking`](Self::execute_as_blocking) on the store's
    /// blocking thread pool
    pub async fn execute(self) -> Result<PutResults> {
        let store = self.store.clone();
        store.run_blocking(move || self.execute_as_blocking()).await
    }
}
