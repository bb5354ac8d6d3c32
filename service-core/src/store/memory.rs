//! In-memory [`RecordStore`] implementation.
//!
//! Backs the domain services in tests and local runs. Collections keep
//! insertion order; composite unique constraints and child-reference
//! constraints mirror what the production store enforces.

use super::{Filter, Record, RecordStore, FOREIGN_KEY_VIOLATION};
use crate::error::AppError;
use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct UniqueConstraint {
    collection: String,
    fields: Vec<String>,
}

#[derive(Debug, Clone)]
struct ReferenceConstraint {
    child_collection: String,
    field: String,
    parent_collection: String,
}

#[derive(Default)]
pub struct MemoryStore {
    collections: DashMap<String, Vec<Record>>,
    uniques: Vec<UniqueConstraint>,
    references: Vec<ReferenceConstraint>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enforce a composite unique constraint over the given fields.
    pub fn with_unique(mut self, collection: &str, fields: &[&str]) -> Self {
        self.uniques.push(UniqueConstraint {
            collection: collection.to_string(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
        });
        self
    }

    /// Reject deletion of a parent record while child records reference it.
    pub fn with_reference(
        mut self,
        child_collection: &str,
        field: &str,
        parent_collection: &str,
    ) -> Self {
        self.references.push(ReferenceConstraint {
            child_collection: child_collection.to_string(),
            field: field.to_string(),
            parent_collection: parent_collection.to_string(),
        });
        self
    }

    fn check_uniques(&self, collection: &str, record: &Record, rows: &[Record]) -> Result<(), AppError> {
        for constraint in self.uniques.iter().filter(|c| c.collection == collection) {
            let values: Vec<Option<&Value>> =
                constraint.fields.iter().map(|f| record.get(f)).collect();
            if values.iter().any(|v| v.is_none() || v == &Some(&Value::Null)) {
                continue;
            }
            let collides = rows.iter().any(|row| {
                constraint
                    .fields
                    .iter()
                    .zip(&values)
                    .all(|(field, value)| row.get(field) == *value)
            });
            if collides {
                return Err(AppError::Conflict(anyhow::anyhow!(
                    "unique constraint violated on {} ({})",
                    collection,
                    constraint.fields.join(", ")
                )));
            }
        }
        Ok(())
    }

    fn referencing_child(&self, collection: &str, id: Uuid) -> Option<String> {
        let id_value = Value::String(id.to_string());
        for constraint in self
            .references
            .iter()
            .filter(|c| c.parent_collection == collection)
        {
            let referenced = self
                .collections
                .get(&constraint.child_collection)
                .map(|rows| rows.iter().any(|row| row.get(&constraint.field) == Some(&id_value)))
                .unwrap_or(false);
            if referenced {
                return Some(constraint.child_collection.clone());
            }
        }
        None
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn select(&self, collection: &str, filter: &Filter) -> Result<Vec<Record>, AppError> {
        let rows = self
            .collections
            .get(collection)
            .map(|rows| rows.iter().filter(|r| filter.matches(r)).cloned().collect())
            .unwrap_or_default();
        Ok(rows)
    }

    async fn get(&self, collection: &str, id: Uuid) -> Result<Option<Record>, AppError> {
        let id_value = Value::String(id.to_string());
        let row = self
            .collections
            .get(collection)
            .and_then(|rows| rows.iter().find(|r| r.get("id") == Some(&id_value)).cloned());
        Ok(row)
    }

    async fn insert(&self, collection: &str, mut record: Record) -> Result<Record, AppError> {
        let object = record.as_object_mut().ok_or_else(|| {
            AppError::StoreError(anyhow::anyhow!(
                "record inserted into {} is not a JSON object",
                collection
            ))
        })?;
        let has_id = object
            .get("id")
            .map(|v| !v.is_null())
            .unwrap_or(false);
        if !has_id {
            object.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
        }

        let mut rows = self.collections.entry(collection.to_string()).or_default();
        self.check_uniques(collection, &record, &rows)?;
        rows.push(record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        collection: &str,
        id: Uuid,
        patch: Record,
    ) -> Result<Option<Record>, AppError> {
        let patch = match patch {
            Value::Object(map) => map,
            _ => {
                return Err(AppError::StoreError(anyhow::anyhow!(
                    "update patch for {} is not a JSON object",
                    collection
                )))
            }
        };

        let id_value = Value::String(id.to_string());
        let mut rows = match self.collections.get_mut(collection) {
            Some(rows) => rows,
            None => return Ok(None),
        };
        let row = rows.iter_mut().find(|r| r.get("id") == Some(&id_value));
        let Some(row) = row else { return Ok(None) };

        if let Some(object) = row.as_object_mut() {
            for (field, value) in patch {
                object.insert(field, value);
            }
        }
        Ok(Some(row.clone()))
    }

    async fn delete(&self, collection: &str, id: Uuid) -> Result<bool, AppError> {
        if let Some(child) = self.referencing_child(collection, id) {
            return Err(AppError::StoreError(anyhow::anyhow!(
                "{}: {} rows reference {} {}",
                FOREIGN_KEY_VIOLATION,
                child,
                collection,
                id
            )));
        }

        let id_value = Value::String(id.to_string());
        let mut rows = match self.collections.get_mut(collection) {
            Some(rows) => rows,
            None => return Ok(false),
        };
        let before = rows.len();
        rows.retain(|r| r.get("id") != Some(&id_value));
        Ok(rows.len() < before)
    }
}
