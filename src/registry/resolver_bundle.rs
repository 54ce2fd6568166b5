//! # Resolver Bundle
//!
//! The Put/Get/Delete handler triple registered for one type.
//!
//! A bundle is immutable once built and is shared as `Arc<ResolverBundle>`;
//! every lookup for the same type hands out the same `Arc`.

use crate::error::{Result, StoreError};
use crate::operations::{DeleteResolver, GetResolver, PutResolver};
use std::fmt;
use std::sync::Arc;

/// Operation handlers that convert one registered type to and from storage
#[derive(Clone)]
pub struct ResolverBundle {
    put_resolver: Arc<dyn PutResolver>,
    get_resolver: Arc<dyn GetResolver>,
    delete_resolver: Arc<dyn DeleteResolver>,
}

impl ResolverBundle {
    pub fn new(
        put_resolver: Arc<dyn PutResolver>,
        get_resolver: Arc<dyn GetResolver>,
        delete_resolver: Arc<dyn DeleteResolver>,
    ) -> Self {
        Self {
            put_resolver,
            get_resolver,
            delete_resolver,
        }
    }

    pub fn builder() -> ResolverBundleBuilder {
        ResolverBundleBuilder::default()
    }

    pub fn put_resolver(&self) -> &Arc<dyn PutResolver> {
        &self.put_resolver
    }

    pub fn get_resolver(&self) -> &Arc<dyn GetResolver> {
        &self.get_resolver
    }

    pub fn delete_resolver(&self) -> &Arc<dyn DeleteResolver> {
        &self.delete_resolver
    }
}

impl fmt::Debug for ResolverBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverBundle")
            .field("put_resolver", &"<Arc<dyn PutResolver>>")
            .field("get_resolver", &"<Arc<dyn GetResolver>>")
            .field("delete_resolver", &"<Arc<dyn DeleteResolver>>")
            .finish()
    }
}

/// Builder that refuses to produce a partial bundle
#[derive(Default)]
pub struct ResolverBundleBuilder {
    put_resolver: Option<Arc<dyn PutResolver>>,
    get_resolver: Option<Arc<dyn GetResolver>>,
    delete_resolver: Option<Arc<dyn DeleteResolver>>,
}

impl ResolverBundleBuilder {
    pub fn put_resolver(mut self, resolver: Arc<dyn PutResolver>) -> Self {
        self.put_resolver = Some(resolver);
        self
    }

    pub fn get_resolver(mut self, resolver: Arc<dyn GetResolver>) -> Self {
        self.get_resolver = Some(resolver);
        self
    }

    pub fn delete_resolver(mut self, resolver: Arc<dyn DeleteResolver>) -> Self {
        self.delete_resolver = Some(resolver);
        self
    }

    /// Fails with `InvalidArgument` naming every missing handler
    pub fn build(self) -> Result<ResolverBundle> {
        match (self.put_resolver, self.get_resolver, self.delete_resolver) {
            (Some(put), Some(get), Some(delete)) => Ok(ResolverBundle::new(put, get, delete)),
            (put, get, delete) => {
                let missing: Vec<&str> = [
                    ("put_resolver", put.is_none()),
                    ("get_resolver", get.is_none()),
                    ("delete_resolver", delete.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, absent)| absent.then_some(name))
                .collect();

                Err(StoreError::invalid_argument(format!(
                    "Resolver bundle is missing {}",
                    missing.join(", ")
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{NoopDeleteResolver, NoopGetResolver, NoopPutResolver};

    #[test]
    fn test_complete_bundle_builds() {
        let bundle = ResolverBundle::builder()
            .put_resolver(Arc::new(NoopPutResolver))
            .get_resolver(Arc::new(NoopGetResolver))
            .delete_resolver(Arc::new(NoopDeleteResolver))
            .build();
        assert!(bundle.is_ok());
    }

    #[test]
    fn test_partial_bundle_is_rejected() {
        let result = ResolverBundle::builder()
            .put_resolver(Arc::new(NoopPutResolver))
            .build();

        match result {
            Err(StoreError::InvalidArgument { message }) => {
                assert!(message.contains("get_resolver"));
                assert!(message.contains("delete_resolver"));
                assert!(!message.contains("put_resolver"));
            }
            other => panic!("expected InvalidArgument, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_bundle_is_rejected() {
        let result = ResolverBundle::builder().build();
        assert!(matches!(result, Err(StoreError::InvalidArgument { .. })));
    }
}
