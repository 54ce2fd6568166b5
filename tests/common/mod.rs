//! Shared fixtures for integration tests: a `User` type family with real
//! Put/Get/Delete resolvers over the in-memory content resolver.

#![allow(dead_code)]

pub mod strategies;

use anyhow::{anyhow, Context};
use content_store::operations::{
    DeleteResolver, DeleteResult, GetResolver, PutResolver, PutResult,
};
use content_store::storage::content_resolver::ID_COLUMN;
use content_store::storage::{
    ContentResolver, ContentValues, InMemoryContentResolver, Selection, StorageObject, Uri,
};
use content_store::{ContentStore, ResolverBundle, TypeDescriptor, TypeKey};
use serde_json::json;
use std::sync::{Arc, OnceLock};

pub const USERS_URI: &str = "content://test/users";

/// Marker interface for objects whose writes are audited
pub trait Auditable {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Option<u64>,
    pub email: String,
}

/// Subtype of [`User`]: inherits the `User` mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminUser {
    pub user: User,
    pub level: u32,
}

impl User {
    pub fn new(email: &str) -> Self {
        Self {
            id: None,
            email: email.to_string(),
        }
    }

    pub fn with_id(id: u64, email: &str) -> Self {
        Self {
            id: Some(id),
            email: email.to_string(),
        }
    }
}

pub fn user_descriptor() -> Arc<TypeDescriptor> {
    static DESCRIPTOR: OnceLock<Arc<TypeDescriptor>> = OnceLock::new();
    DESCRIPTOR
        .get_or_init(|| {
            TypeDescriptor::class::<User>()
                .implements(TypeKey::of::<dyn Auditable>())
                .build()
                .expect("user descriptor")
        })
        .clone()
}

pub fn admin_user_descriptor() -> Arc<TypeDescriptor> {
    static DESCRIPTOR: OnceLock<Arc<TypeDescriptor>> = OnceLock::new();
    DESCRIPTOR
        .get_or_init(|| {
            TypeDescriptor::class::<AdminUser>()
                .extends(user_descriptor())
                .build()
                .expect("admin user descriptor")
        })
        .clone()
}

impl StorageObject for User {
    fn type_descriptor(&self) -> Arc<TypeDescriptor> {
        user_descriptor()
    }
}

impl StorageObject for AdminUser {
    fn type_descriptor(&self) -> Arc<TypeDescriptor> {
        admin_user_descriptor()
    }
}

/// The `User` part of any object in the `User` family
fn as_user(object: &dyn StorageObject) -> anyhow::Result<&User> {
    if let Some(user) = object.downcast_ref::<User>() {
        return Ok(user);
    }
    if let Some(admin) = object.downcast_ref::<AdminUser>() {
        return Ok(&admin.user);
    }
    Err(anyhow!(
        "{} is not a User",
        object.type_descriptor().name()
    ))
}

fn id_selection(id: u64) -> Selection {
    Selection {
        where_clause: Some(format!("{ID_COLUMN} = ?")),
        where_args: vec![id.to_string()],
    }
}

pub struct UserPutResolver;

impl PutResolver for UserPutResolver {
    fn perform_put(
        &self,
        resolver: &dyn ContentResolver,
        object: &dyn StorageObject,
    ) -> anyhow::Result<PutResult> {
        let user = as_user(object)?;
        let uri = Uri::parse(USERS_URI);

        let mut values = ContentValues::new();
        values.insert("email".to_string(), json!(user.email));

        if let Some(id) = user.id {
            let updated = resolver.update(&uri, values.clone(), &id_selection(id))?;
            if updated > 0 {
                return Ok(PutResult::updated(updated));
            }
            values.insert(ID_COLUMN.to_string(), json!(id));
        }

        let inserted = resolver
            .insert(&uri, values)?
            .context("content provider returned no uri for insert")?;
        Ok(PutResult::inserted(inserted))
    }
}

pub struct UserGetResolver;

impl GetResolver for UserGetResolver {
    fn map_from_row(&self, row: &ContentValues) -> anyhow::Result<Box<dyn StorageObject>> {
        let id = row.get(ID_COLUMN).and_then(|value| value.as_u64());
        let email = row
            .get("email")
            .and_then(|value| value.as_str())
            .context("row has no email column")?;

        Ok(Box::new(User {
            id,
            email: email.to_string(),
        }))
    }
}

pub struct UserDeleteResolver;

impl DeleteResolver for UserDeleteResolver {
    fn perform_delete(
        &self,
        resolver: &dyn ContentResolver,
        object: &dyn StorageObject,
    ) -> anyhow::Result<DeleteResult> {
        let user = as_user(object)?;
        let id = user.id.context("cannot delete a user without id")?;
        let deleted = resolver.delete(&Uri::parse(USERS_URI), &id_selection(id))?;
        Ok(DeleteResult::new(deleted))
    }
}

pub fn user_bundle() -> Arc<ResolverBundle> {
    Arc::new(ResolverBundle::new(
        Arc::new(UserPutResolver),
        Arc::new(UserGetResolver),
        Arc::new(UserDeleteResolver),
    ))
}

/// Store with the `User` mapping over a fresh in-memory provider
pub fn user_store() -> (ContentStore, Arc<InMemoryContentResolver>) {
    let provider = Arc::new(InMemoryContentResolver::new());
    let store = ContentStore::builder()
        .content_resolver(provider.clone())
        .add_type_mapping(TypeKey::of::<User>(), user_bundle())
        .build()
        .expect("store builds");
    (store, provider)
}
