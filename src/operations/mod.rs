//! # Typed Operations
//!
//! Put/Get/Delete pipelines built on top of the type mapping registry.
//!
//! Each operation resolves the [`ResolverBundle`](crate::registry::ResolverBundle)
//! of an object's concrete type, picks the handler it needs and runs it
//! against the store's [`ContentResolver`](crate::storage::ContentResolver).
//! A type with no direct or inherited mapping fails with
//! [`StoreError::NoMapping`](crate::StoreError::NoMapping).
//!
//! Every prepared operation offers `execute_as_blocking()` for the calling
//! thread and `execute().await`, which moves the work onto tokio's blocking
//! pool.

pub mod delete;
pub mod get;
pub mod put;

pub use delete::{
    DeleteByQuery, DeleteByQueryResult, DeleteObjects, DeleteOperation, DeleteResolver,
    DeleteResult, DeleteResults, PreparedDeleteByQuery, PreparedDeleteObjects,
};
pub use get::{
    GetListOfObjects, GetListOfObjectsWithQuery, GetOperation, GetResolver,
    PreparedGetListOfObjects,
};
pub use put::{PreparedPut, PutObjects, PutOperation, PutResolver, PutResult, PutResults};

use crate::error::StoreError;
use crate::logging::log_error;

/// Convert a handler failure into a [`StoreError`] and log it
pub(crate) fn handler_failure(operation: &str, type_name: &str, err: anyhow::Error) -> StoreError {
    let err = StoreError::from_handler(type_name, err);
    log_error("operations", operation, &err.to_string(), Some(type_name));
    err
}
