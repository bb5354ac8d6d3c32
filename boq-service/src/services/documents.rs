//! Document service: creation, listing, percentage copies, updates, and
//! the audit configuration governing deletes.

use crate::collections;
use crate::models::{CreateDocument, Document};
use crate::services::metrics::{DOCUMENTS_TOTAL, STORE_OP_DURATION};
use crate::services::{numbering, percentage_copy::percentage_copy};
use rust_decimal::Decimal;
use service_core::audit::{EntityAudit, GuardFn};
use service_core::context::Scope;
use service_core::error::AppError;
use service_core::store::{Filter, RecordStore};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

/// Entity type label for documents in the audit gateway.
pub const DOCUMENT_ENTITY: &str = "document";
/// Entity type label for customers in the audit gateway.
pub const CUSTOMER_ENTITY: &str = "customer";

pub struct DocumentService {
    store: Arc<dyn RecordStore>,
}

impl DocumentService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Create a document from a validated payload, assigning the next
    /// sequential number for the company.
    ///
    /// Empty items are dropped silently; partially filled items abort
    /// with a validation error before anything is persisted. A number
    /// collision raced in by a concurrent caller surfaces as the store's
    /// conflict error.
    #[instrument(skip(self, scope, payload), fields(company_id = %scope.company_id))]
    pub async fn create_document(
        &self,
        scope: &Scope,
        payload: CreateDocument,
    ) -> Result<Document, AppError> {
        payload.validate()?;

        let number = self.next_number(scope).await?;
        let mut document = payload.into_document(scope, number);
        document.prune_empty_items();
        document.validate_items()?;

        let timer = STORE_OP_DURATION
            .with_label_values(&["insert_document"])
            .start_timer();
        let result = self
            .store
            .insert(collections::DOCUMENTS, serde_json::to_value(&document)?)
            .await;
        timer.observe_duration();
        result?;

        DOCUMENTS_TOTAL.with_label_values(&["created"]).inc();
        info!(document_id = %document.id, number = %document.number, "Document created");

        Ok(document)
    }

    /// Fetch a document within the company scope.
    #[instrument(skip(self, scope), fields(company_id = %scope.company_id, document_id = %document_id))]
    pub async fn get_document(
        &self,
        scope: &Scope,
        document_id: Uuid,
    ) -> Result<Option<Document>, AppError> {
        let record = self.store.get(collections::DOCUMENTS, document_id).await?;
        let Some(record) = record else {
            return Ok(None);
        };
        let document: Document = serde_json::from_value(record)
            .map_err(|e| AppError::StoreError(anyhow::anyhow!("malformed document record: {}", e)))?;
        if document.company_id != scope.company_id {
            return Ok(None);
        }
        Ok(Some(document))
    }

    /// List the company's documents in insertion order.
    #[instrument(skip(self, scope), fields(company_id = %scope.company_id))]
    pub async fn list_documents(&self, scope: &Scope) -> Result<Vec<Document>, AppError> {
        let filter = Filter::new().eq("company_id", scope.company_id);
        let records = self.store.select(collections::DOCUMENTS, &filter).await?;
        records
            .into_iter()
            .map(|record| {
                serde_json::from_value(record).map_err(|e| {
                    AppError::StoreError(anyhow::anyhow!("malformed document record: {}", e))
                })
            })
            .collect()
    }

    /// Replace a document's content. Converted documents are read-mostly
    /// and reject edits.
    #[instrument(skip(self, scope, payload), fields(company_id = %scope.company_id, document_id = %document_id))]
    pub async fn update_document(
        &self,
        scope: &Scope,
        document_id: Uuid,
        payload: CreateDocument,
    ) -> Result<Document, AppError> {
        let existing = self
            .get_document(scope, document_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(anyhow::anyhow!("document {} not found", document_id))
            })?;
        if existing.is_converted() {
            return Err(AppError::Guard(anyhow::anyhow!(
                "document {} has been converted to an invoice and cannot be edited",
                existing.number
            )));
        }

        payload.validate()?;
        let mut updated = payload.into_document(scope, existing.number.clone());
        updated.id = existing.id;
        updated.created_utc = existing.created_utc;
        updated.prune_empty_items();
        updated.validate_items()?;

        let patched = self
            .store
            .update(
                collections::DOCUMENTS,
                document_id,
                serde_json::to_value(&updated)?,
            )
            .await?;
        if patched.is_none() {
            return Err(AppError::NotFound(anyhow::anyhow!(
                "document {} not found",
                document_id
            )));
        }

        DOCUMENTS_TOTAL.with_label_values(&["updated"]).inc();
        info!(document_id = %updated.id, "Document updated");

        Ok(updated)
    }

    /// Derive and persist a percentage copy of an existing document.
    #[instrument(skip(self, scope), fields(company_id = %scope.company_id, document_id = %document_id, percentage = %percentage))]
    pub async fn create_percentage_copy(
        &self,
        scope: &Scope,
        document_id: Uuid,
        percentage: Decimal,
    ) -> Result<Document, AppError> {
        let original = self
            .get_document(scope, document_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(anyhow::anyhow!("document {} not found", document_id))
            })?;

        let number = self.next_number(scope).await?;
        let copy = percentage_copy(&original, percentage, number)?;

        self.store
            .insert(collections::DOCUMENTS, serde_json::to_value(&copy)?)
            .await?;

        DOCUMENTS_TOTAL.with_label_values(&["copied"]).inc();
        info!(
            source = %original.number,
            copy = %copy.number,
            "Percentage copy created"
        );

        Ok(copy)
    }

    async fn next_number(&self, scope: &Scope) -> Result<String, AppError> {
        let filter = Filter::new().eq("company_id", scope.company_id);
        let records = self.store.select(collections::DOCUMENTS, &filter).await?;
        let existing: Vec<String> = records
            .iter()
            .filter_map(|record| record.get("number").and_then(|v| v.as_str()))
            .map(String::from)
            .collect();
        Ok(numbering::next_number(&existing))
    }
}

/// Audit configuration for documents: a converted document may never be
/// deleted, and the guard re-fetches current state rather than trusting
/// the caller's copy.
pub fn document_audit_spec() -> EntityAudit {
    let guard: GuardFn = Arc::new(|store, id| {
        Box::pin(async move {
            let record = store.get(collections::DOCUMENTS, id).await?;
            let converted = record
                .as_ref()
                .and_then(|r| r.get("converted_invoice_id"))
                .map(|v| !v.is_null())
                .unwrap_or(false);
            if converted {
                return Err(AppError::Guard(anyhow::anyhow!(
                    "document has been converted to an invoice and cannot be deleted"
                )));
            }
            Ok(())
        })
    });

    EntityAudit {
        collection: collections::DOCUMENTS,
        entity_type: DOCUMENT_ENTITY,
        label_field: "number",
        guard: Some(guard),
        references: vec![(collections::INVOICES, "an invoice derived from it")],
    }
}

/// Audit configuration for customers: no business guard, but deletes are
/// blocked by the store while invoices still reference the customer.
pub fn customer_audit_spec() -> EntityAudit {
    EntityAudit {
        collection: collections::CUSTOMERS,
        entity_type: CUSTOMER_ENTITY,
        label_field: "name",
        guard: None,
        references: vec![(collections::INVOICES, "one or more invoices")],
    }
}
