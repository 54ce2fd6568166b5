//! Shared fixtures for unit tests.

use crate::operations::{DeleteResolver, DeleteResult, GetResolver, PutResolver, PutResult};
use crate::registry::ResolverBundle;
use crate::storage::{ContentResolver, ContentValues, StorageObject};
use std::sync::Arc;

pub struct NoopPutResolver;

impl PutResolver for NoopPutResolver {
    fn perform_put(
        &self,
        _resolver: &dyn ContentResolver,
        _object: &dyn StorageObject,
    ) -> anyhow::Result<PutResult> {
        Ok(PutResult::default())
    }
}

pub struct NoopGetResolver;

impl GetResolver for NoopGetResolver {
    fn map_from_row(&self, _row: &ContentValues) -> anyhow::Result<Box<dyn StorageObject>> {
        anyhow::bail!("NoopGetResolver does not map rows")
    }
}

pub struct NoopDeleteResolver;

impl DeleteResolver for NoopDeleteResolver {
    fn perform_delete(
        &self,
        _resolver: &dyn ContentResolver,
        _object: &dyn StorageObject,
    ) -> anyhow::Result<DeleteResult> {
        Ok(DeleteResult::default())
    }
}

/// A fresh bundle; each call returns a distinct `Arc`
pub fn noop_bundle() -> Arc<ResolverBundle> {
    Arc::new(ResolverBundle::new(
        Arc::new(NoopPutResolver),
        Arc::new(NoopGetResolver),
        Arc::new(NoopDeleteResolver),
    ))
}
