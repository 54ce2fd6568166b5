//! # Content Resolver
//!
//! Transport seam between type mappings and the underlying content provider.
//!
//! Put/Get/Delete resolvers talk to the provider only through
//! [`ContentResolver`]. [`InMemoryContentResolver`] keeps tables in memory
//! behind a `parking_lot::RwLock` and understands selections made of
//! `column = ?` terms joined with `AND`.

use super::query::{Query, Selection};
use super::{ContentValues, Uri};
use crate::error::{Result, StoreError};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, trace};

/// Name of the row id column maintained by [`InMemoryContentResolver`]
pub const ID_COLUMN: &str = "_id";

/// Content-provider style transport
pub trait ContentResolver: Send + Sync {
    /// Run a query. `Ok(None)` means the provider returned no cursor at all.
    fn query(&self, query: &Query) -> Result<Option<Vec<ContentValues>>>;

    /// Insert a row, returning the URI of the new row if the provider has one
    fn insert(&self, uri: &Uri, values: ContentValues) -> Result<Option<Uri>>;

    /// Update matching rows, returning how many were changed
    fn update(&self, uri: &Uri, values: ContentValues, selection: &Selection) -> Result<u64>;

    /// Delete matching rows, returning how many were removed
    fn delete(&self, uri: &Uri, selection: &Selection) -> Result<u64>;
}

#[derive(Debug, Default)]
struct Table {
    next_id: u64,
    rows: BTreeMap<u64, ContentValues>,
}

/// Thread-safe in-memory content provider
#[derive(Debug, Default)]
pub struct InMemoryContentResolver {
    tables: RwLock<HashMap<Uri, Table>>,
}

impl InMemoryContentResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows stored under `uri`
    pub fn row_count(&self, uri: &Uri) -> usize {
        self.tables
            .read()
            .get(uri)
            .map_or(0, |table| table.rows.len())
    }
}

impl ContentResolver for InMemoryContentResolver {
    fn query(&self, query: &Query) -> Result<Option<Vec<ContentValues>>> {
        let predicate = Predicate::parse(&query.selection)?;
        let tables = self.tables.read();

        let Some(table) = tables.get(&query.uri) else {
            return Ok(Some(Vec::new()));
        };

        let mut rows: Vec<ContentValues> = table
            .rows
            .values()
            .filter(|row| predicate.matches(row))
            .cloned()
            .collect();

        if let Some(sort_order) = &query.sort_order {
            sort_rows(&mut rows, sort_order);
        }

        if !query.columns.is_empty() {
            for row in &mut rows {
                row.retain(|column, _| query.columns.iter().any(|c| c == column));
            }
        }

        trace!(uri = %query.uri, rows = rows.len(), "In-memory query");
        Ok(Some(rows))
    }

    fn insert(&self, uri: &Uri, mut values: ContentValues) -> Result<Option<Uri>> {
        let mut tables = self.tables.write();
        let table = tables.entry(uri.clone()).or_default();

        let id = match values.get(ID_COLUMN) {
            Some(Value::Number(n)) => n.as_u64().ok_or_else(|| {
                StoreError::transport("insert", format!("{ID_COLUMN} must be a positive integer"))
            })?,
            Some(other) => {
                return Err(StoreError::transport(
                    "insert",
                    format!("{ID_COLUMN} must be a positive integer, got {other}"),
                ))
            }
            None => table
                .next_id
                .checked_add(1)
                .ok_or_else(|| StoreError::transport("insert", "row id space exhausted"))?,
        };

        if table.rows.contains_key(&id) {
            return Err(StoreError::transport(
                "insert",
                format!("Row {id} already exists in {uri}"),
            ));
        }

        values.insert(ID_COLUMN.to_string(), Value::from(id));
        table.rows.insert(id, values);
        table.next_id = table.next_id.max(id);

        debug!(uri = %uri, id, "In-memory insert");
        Ok(Some(uri.with_appended_id(id)))
    }

    fn update(&self, uri: &Uri, values: ContentValues, selection: &Selection) -> Result<u64> {
        let predicate = Predicate::parse(selection)?;
        let mut tables = self.tables.write();
        let Some(table) = tables.get_mut(uri) else {
            return Ok(0);
        };

        let mut updated = 0;
        for row in table.rows.values_mut().filter(|row| predicate.matches(row)) {
            for (column, value) in &values {
                if column != ID_COLUMN {
                    row.insert(column.clone(), value.clone());
                }
            }
            updated += 1;
        }

        debug!(uri = %uri, updated, "In-memory update");
        Ok(updated)
    }

    fn delete(&self, uri: &Uri, selection: &Selection) -> Result<u64> {
        let predicate = Predicate::parse(selection)?;
        let mut tables = self.tables.write();
        let Some(table) = tables.get_mut(uri) else {
            return Ok(0);
        };

        let before = table.rows.len();
        table.rows.retain(|_, row| !predicate.matches(row));
        let deleted = (before - table.rows.len()) as u64;

        debug!(uri = %uri, deleted, "In-memory delete");
        Ok(deleted)
    }
}

/// Conjunction of `column = value` terms
#[derive(Debug)]
struct Predicate {
    terms: Vec<(String, String)>,
}

impl Predicate {
    fn parse(selection: &Selection) -> Result<Self> {
        let Some(clause) = selection.where_clause.as_deref() else {
            return Ok(Self { terms: Vec::new() });
        };

        let mut args = selection.where_args.iter();
        let mut terms = Vec::new();
        for term in clause.split(" AND ") {
            let (column, placeholder) = term.split_once('=').ok_or_else(|| {
                StoreError::transport("selection", format!("Unsupported term: {term}"))
            })?;
            if placeholder.trim() != "?" {
                return Err(StoreError::transport(
                    "selection",
                    format!("Expected placeholder in term: {term}"),
                ));
            }
            let arg = args.next().ok_or_else(|| {
                StoreError::transport("selection", "Not enough selection arguments")
            })?;
            terms.push((column.trim().to_string(), arg.clone()));
        }

        Ok(Self { terms })
    }

    fn matches(&self, row: &ContentValues) -> bool {
        self.terms.iter().all(|(column, expected)| {
            row.get(column)
                .is_some_and(|value| render(value) == *expected)
        })
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn sort_rows(rows: &mut [ContentValues], sort_order: &str) {
    let mut parts = sort_order.split_whitespace();
    let Some(column) = parts.next() else {
        return;
    };
    let descending = parts.next().is_some_and(|dir| dir.eq_ignore_ascii_case("desc"));

    rows.sort_by(|a, b| {
        let ordering = compare_values(a.get(column), b.get(column));
        if descending {
            ordering.reverse()
        } else {
            ordering
        }
    });
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(x), Some(y)) => render(x).cmp(&render(y)),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn users() -> Uri {
        Uri::parse("content://app/users")
    }

    fn row(email: &str, active: bool) -> ContentValues {
        let mut values = ContentValues::new();
        values.insert("email".to_string(), json!(email));
        values.insert("active".to_string(), json!(active));
        values
    }

    #[test]
    fn test_insert_assigns_ids() {
        let resolver = InMemoryContentResolver::new();

        let first = resolver.insert(&users(), row("a@example.com", true)).unwrap();
        let second = resolver.insert(&users(), row("b@example.com", false)).unwrap();

        assert_eq!(first.unwrap().as_str(), "content://app/users/1");
        assert_eq!(second.unwrap().as_str(), "content://app/users/2");
        assert_eq!(resolver.row_count(&users()), 2);
    }

    #[test]
    fn test_insert_rejects_existing_id() {
        let resolver = InMemoryContentResolver::new();
        let mut values = row("a@example.com", true);
        values.insert(ID_COLUMN.to_string(), json!(7));

        resolver.insert(&users(), values.clone()).unwrap();
        let result = resolver.insert(&users(), values);
        assert!(matches!(result, Err(StoreError::Transport { .. })));
    }

    #[test]
    fn test_insert_after_largest_id_fails_cleanly() {
        let resolver = InMemoryContentResolver::new();
        let mut values = row("last@example.com", true);
        values.insert(ID_COLUMN.to_string(), json!(u64::MAX));
        resolver.insert(&users(), values).unwrap();

        let err = resolver
            .insert(&users(), row("next@example.com", true))
            .unwrap_err();
        match err {
            StoreError::Transport { operation, message } => {
                assert_eq!(operation, "insert");
                assert!(message.contains("exhausted"));
            }
            other => panic!("expected Transport, got {other:?}"),
        }
        assert_eq!(resolver.row_count(&users()), 1);
    }

    #[test]
    fn test_query_with_selection_and_projection() {
        let resolver = InMemoryContentResolver::new();
        resolver.insert(&users(), row("a@example.com", true)).unwrap();
        resolver.insert(&users(), row("b@example.com", false)).unwrap();
        resolver.insert(&users(), row("c@example.com", true)).unwrap();

        let query = Query::builder()
            .uri(users())
            .columns(["email"])
            .where_clause("active = ?")
            .where_args(["true"])
            .sort_order("email DESC")
            .build()
            .unwrap();

        let rows = resolver.query(&query).unwrap().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("email"), Some(&json!("c@example.com")));
        assert_eq!(rows[1].get("email"), Some(&json!("a@example.com")));
        assert!(rows[0].get("active").is_none());
    }

    #[test]
    fn test_query_unknown_table_is_empty() {
        let resolver = InMemoryContentResolver::new();
        let query = Query::builder().uri("content://app/none").build().unwrap();
        assert_eq!(resolver.query(&query).unwrap(), Some(Vec::new()));
    }

    #[test]
    fn test_update_and_delete() {
        let resolver = InMemoryContentResolver::new();
        resolver.insert(&users(), row("a@example.com", true)).unwrap();
        resolver.insert(&users(), row("b@example.com", true)).unwrap();

        let selection = Selection {
            where_clause: Some("email = ?".to_string()),
            where_args: vec!["a@example.com".to_string()],
        };
        let mut changes = ContentValues::new();
        changes.insert("active".to_string(), json!(false));

        assert_eq!(resolver.update(&users(), changes, &selection).unwrap(), 1);
        assert_eq!(resolver.delete(&users(), &selection).unwrap(), 1);
        assert_eq!(resolver.row_count(&users()), 1);

        assert_eq!(resolver.delete(&users(), &Selection::default()).unwrap(), 1);
        assert_eq!(resolver.row_count(&users()), 0);
    }

    #[test]
    fn test_unsupported_selection() {
        let resolver = InMemoryContentResolver::new();
        let selection = Selection {
            where_clause: Some("email LIKE 'a%'".to_string()),
            where_args: Vec::new(),
        };
        let result = resolver.delete(&users(), &selection);
        assert!(matches!(result, Err(StoreError::Transport { .. })));
    }
}
