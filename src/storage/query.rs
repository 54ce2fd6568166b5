//! Query descriptions for reads and deletes.
//!
//! Both builders require a URI; everything else is optional.

use super::Uri;
use crate::error::{Result, StoreError};
use serde::{Deserialize, Serialize};

/// `where` clause plus positional arguments.
///
/// The clause uses `?` placeholders, e.g. `"email = ? AND active = ?"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub where_clause: Option<String>,
    pub where_args: Vec<String>,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.where_clause.is_none()
    }
}

/// Read query against a content provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub uri: Uri,
    pub columns: Vec<String>,
    pub selection: Selection,
    pub sort_order: Option<String>,
}

impl Query {
    pub fn builder() -> QueryBuilder {
        QueryBuilder::default()
    }
}

#[derive(Debug, Default)]
pub struct QueryBuilder {
    uri: Option<Uri>,
    columns: Vec<String>,
    selection: Selection,
    sort_order: Option<String>,
}

impl QueryBuilder {
    pub fn uri(mut self, uri: impl Into<Uri>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn where_clause(mut self, clause: impl Into<String>) -> Self {
        self.selection.where_clause = Some(clause.into());
        self
    }

    pub fn where_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selection.where_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn sort_order(mut self, sort_order: impl Into<String>) -> Self {
        self.sort_order = Some(sort_order.into());
        self
    }

    pub fn build(self) -> Result<Query> {
        let uri = self
            .uri
            .ok_or_else(|| StoreError::invalid_argument("Query requires a uri"))?;
        validate_selection(&self.selection)?;
        Ok(Query {
            uri,
            columns: self.columns,
            selection: self.selection,
            sort_order: self.sort_order,
        })
    }
}

/// Delete-by-query description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteQuery {
    pub uri: Uri,
    pub selection: Selection,
}

impl DeleteQuery {
    pub fn builder() -> DeleteQueryBuilder {
        DeleteQueryBuilder::default()
    }
}

#[derive(Debug, Default)]
pub struct DeleteQueryBuilder {
    uri: Option<Uri>,
    selection: Selection,
}

impl DeleteQueryBuilder {
    pub fn uri(mut self, uri: impl Into<Uri>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    pub fn where_clause(mut self, clause: impl Into<String>) -> Self {
        self.selection.where_clause = Some(clause.into());
        self
    }

    pub fn where_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selection.where_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn build(self) -> Result<DeleteQuery> {
        let uri = self
            .uri
            .ok_or_else(|| StoreError::invalid_argument("Delete query requires a uri"))?;
        validate_selection(&self.selection)?;
        Ok(DeleteQuery {
            uri,
            selection: self.selection,
        })
    }
}

fn validate_selection(selection: &Selection) -> Result<()> {
    let placeholders = selection
        .where_clause
        .as_deref()
        .map_or(0, |clause| clause.matches('?').count());

    if placeholders != selection.where_args.len() {
        return Err(StoreError::invalid_argument(format!(
            "Selection has {placeholders} placeholders but {} arguments",
            selection.where_args.len()
        )));
    }
    Ok(())
}
