//! Test helper module for service-core integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use service_core::context::{Actor, Scope};
use service_core::error::AppError;
use service_core::store::{Filter, Record, RecordStore};
use std::sync::Arc;
use uuid::Uuid;

pub const TEST_COMPANY_ID: &str = "11111111-1111-1111-1111-111111111111";
pub const TEST_ACTOR_ID: &str = "22222222-2222-2222-2222-222222222222";

pub fn test_scope() -> Scope {
    Scope::new(
        Uuid::parse_str(TEST_COMPANY_ID).unwrap(),
        Actor {
            id: Uuid::parse_str(TEST_ACTOR_ID).unwrap(),
            name: "Test Actor".to_string(),
            email: "actor@example.com".to_string(),
        },
    )
    .with_user_agent("service-core-tests/1.0")
}

/// Store wrapper that fails inserts into one collection, for exercising
/// non-fatal failure paths.
pub struct FailingInsertStore {
    inner: Arc<dyn RecordStore>,
    fail_collection: String,
}

impl FailingInsertStore {
    pub fn new(inner: Arc<dyn RecordStore>, fail_collection: &str) -> Self {
        Self {
            inner,
            fail_collection: fail_collection.to_string(),
        }
    }
}

#[async_trait]
impl RecordStore for FailingInsertStore {
    async fn select(&self, collection: &str, filter: &Filter) -> Result<Vec<Record>, AppError> {
        self.inner.select(collection, filter).await
    }

    async fn get(&self, collection: &str, id: Uuid) -> Result<Option<Record>, AppError> {
        self.inner.get(collection, id).await
    }

    async fn insert(&self, collection: &str, record: Record) -> Result<Record, AppError> {
        if collection == self.fail_collection {
            return Err(AppError::StoreError(anyhow::anyhow!(
                "simulated insert failure into {}",
                collection
            )));
        }
        self.inner.insert(collection, record).await
    }

    async fn update(
        &self,
        collection: &str,
        id: Uuid,
        patch: Record,
    ) -> Result<Option<Record>, AppError> {
        self.inner.update(collection, id, patch).await
    }

    async fn delete(&self, collection: &str, id: Uuid) -> Result<bool, AppError> {
        self.inner.delete(collection, id).await
    }
}
