//! Test helper module for boq-service integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use boq_service::collections;
use boq_service::models::{ClientInfo, CreateDocument, ItemInput, SectionInput, SubsectionInput};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use service_core::context::{Actor, Scope};
use service_core::error::AppError;
use service_core::store::{Filter, MemoryStore, Record, RecordStore};
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
    .with_user_agent("boq-service-tests/1.0")
}

/// Memory store wired with the constraints the production store carries.
pub fn test_store() -> Arc<dyn RecordStore> {
    Arc::new(
        MemoryStore::new()
            .with_unique(collections::DOCUMENTS, &["company_id", "number"])
            .with_unique(collections::CUSTOMERS, &["company_id", "name"])
            .with_reference(collections::INVOICES, "customer_id", collections::CUSTOMERS)
            .with_reference(
                collections::INVOICE_ITEMS,
                "invoice_id",
                collections::INVOICES,
            ),
    )
}

pub fn dec(value: &str) -> Decimal {
    value.parse().expect("invalid decimal literal")
}

pub fn item(description: &str, quantity: &str, rate: &str) -> ItemInput {
    ItemInput {
        description: description.to_string(),
        quantity: dec(quantity),
        unit_id: None,
        unit_name: None,
        rate: dec(rate),
    }
}

/// The worked example: one "General" section with subsection A
/// "Materials" (Cement, 10 × 50) and subsection B "Labor"
/// (Mason, 5 × 100). Subtotal 1000.
pub fn sample_payload() -> CreateDocument {
    CreateDocument {
        date: NaiveDate::from_ymd_opt(2026, 8, 29).unwrap(),
        currency: "USD".to_string(),
        client: ClientInfo {
            name: "Acme Builders".to_string(),
            email: Some("billing@acme.example".to_string()),
            phone: None,
            address: Some("1 Site Road".to_string()),
        },
        sections: vec![SectionInput {
            title: Some("General".to_string()),
            subsections: vec![
                SubsectionInput {
                    name: "A".to_string(),
                    label: "Materials".to_string(),
                    items: vec![item("Cement", "10", "50")],
                },
                SubsectionInput {
                    name: "B".to_string(),
                    label: "Labor".to_string(),
                    items: vec![item("Mason", "5", "100")],
                },
            ],
        }],
    }
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
