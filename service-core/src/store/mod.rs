//! Record store abstraction.
//!
//! The production persistence layer is an external collaborator; services
//! only depend on this trait. Records are JSON objects carrying an `id`
//! field, grouped into named collections.

mod memory;

pub use memory::MemoryStore;

use crate::error::AppError;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

/// A stored record: always a JSON object with a UUID `id` field.
pub type Record = Value;

/// Message prefix used by stores to signal a referential-integrity
/// violation. The audit gateway recognizes it and rewrites the error
/// into a domain message naming the blocking relationship.
pub const FOREIGN_KEY_VIOLATION: &str = "foreign_key_violation";

/// Conjunction of field-equality conditions.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    fields: Vec<(String, Value)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.fields.push((field.into(), value));
        self
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.fields
            .iter()
            .all(|(field, value)| record.get(field) == Some(value))
    }
}

/// Select / insert / update / delete primitives over named collections.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Select all records matching the filter, in insertion order.
    async fn select(&self, collection: &str, filter: &Filter) -> Result<Vec<Record>, AppError>;

    /// Fetch a single record by id.
    async fn get(&self, collection: &str, id: Uuid) -> Result<Option<Record>, AppError>;

    /// Insert a record, assigning an `id` when absent. Uniqueness
    /// violations surface as `AppError::Conflict`.
    async fn insert(&self, collection: &str, record: Record) -> Result<Record, AppError>;

    /// Shallow-merge the patch object into an existing record.
    async fn update(
        &self,
        collection: &str,
        id: Uuid,
        patch: Record,
    ) -> Result<Option<Record>, AppError>;

    /// Delete a record. Returns false when it does not exist.
    /// Referential-integrity violations surface as `AppError::StoreError`
    /// with a [`FOREIGN_KEY_VIOLATION`] message.
    async fn delete(&self, collection: &str, id: Uuid) -> Result<bool, AppError>;
}

/// Extract the `id` field of a record.
pub fn record_id(record: &Record) -> Option<Uuid> {
    record
        .get("id")
        .and_then(|v| v.as_str())
        .and_then(|s| Uuid::parse_str(s).ok())
}
