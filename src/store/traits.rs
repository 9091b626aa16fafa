//! Document Store Traits
//!
//! Defines the narrow seam every document store backend implements.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A schema-flexible record as exchanged with a backend.
pub type Document = Map<String, Value>;

/// Field holding the store-assigned identity of a record.
pub const ID_FIELD: &str = "_id";

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Error types for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No connection to the document store has been established
    #[error("Database not available")]
    Unavailable,

    /// Connection error (for remote backends)
    #[error("Connection error: {0}")]
    Connection(String),

    /// A record could not be converted to or from the backend format
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic backend error
    #[error("Backend error: {0}")]
    Backend(String),
}

/// A single field constraint in a [`Filter`].
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Field equals the value. Against an array field, the array contains it.
    Eq(Value),
    /// Field (or any element of an array field) is a member of the set.
    In(Vec<Value>),
}

impl Condition {
    /// Check whether a stored field value satisfies this condition.
    ///
    /// A missing field never matches.
    pub fn matches(&self, field: Option<&Value>) -> bool {
        let Some(field) = field else {
            return false;
        };
        match self {
            Condition::Eq(expected) => value_matches(field, expected),
            Condition::In(set) => set.iter().any(|expected| value_matches(field, expected)),
        }
    }
}

fn value_matches(field: &Value, expected: &Value) -> bool {
    if field == expected {
        return true;
    }
    match field {
        Value::Array(items) => items.iter().any(|item| item == expected),
        _ => false,
    }
}

/// Equality/membership filter, keyed by field name. All conditions must hold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: BTreeMap<String, Condition>,
}

impl Filter {
    /// An empty filter matching every record
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field` to equal `value`
    pub fn equals(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.conditions
            .insert(field.to_string(), Condition::Eq(value.into()));
        self
    }

    /// Require `field` to be a member of `values`
    pub fn is_in<I, V>(mut self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.conditions.insert(
            field.to_string(),
            Condition::In(values.into_iter().map(Into::into).collect()),
        );
        self
    }

    /// Whether the filter has no conditions
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Iterate the conditions in field-name order
    pub fn conditions(&self) -> impl Iterator<Item = (&str, &Condition)> {
        self.conditions.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Evaluate the filter against a record
    pub fn matches(&self, document: &Document) -> bool {
        self.conditions
            .iter()
            .all(|(field, condition)| condition.matches(document.get(field)))
    }
}

/// Core trait for document store backends
///
/// Backends only ever create and read records; nothing is updated or deleted.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Get the backend type name (e.g., "documentdb", "memory")
    fn backend_type(&self) -> &'static str;

    /// Name of the database this backend writes to
    fn database_name(&self) -> &str;

    /// Check if the backend is reachable
    async fn is_available(&self) -> bool;

    /// Insert a record and return its newly generated identifier.
    ///
    /// The record must not carry an identity field.
    async fn insert(&self, collection: &str, document: Document) -> StoreResult<String>;

    /// Return up to `limit` records matching `filter`.
    ///
    /// Every returned record carries its identifier under [`ID_FIELD`] as a string.
    async fn query(
        &self,
        collection: &str,
        filter: &Filter,
        limit: usize,
    ) -> StoreResult<Vec<Document>>;

    /// Names of the collections in the database
    async fn list_collections(&self) -> StoreResult<Vec<String>>;
}
