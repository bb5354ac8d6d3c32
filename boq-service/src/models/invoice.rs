//! Invoice models produced by the conversion engine.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use service_core::error::Warning;
use uuid::Uuid;

/// One flattened row: either a header row (quantity 1, zero amounts) or
/// a priced line derived from a complete item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceLine {
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    /// Always quantity × unit_price, never read from stored data.
    pub line_total: Decimal,
    pub unit: String,
}

/// Output of the pure flattening step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenedInvoice {
    pub lines: Vec<InvoiceLine>,
    pub subtotal: Decimal,
}

/// Persisted invoice created by a conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: Uuid,
    pub company_id: Uuid,
    /// Absent when customer resolution failed non-fatally.
    pub customer_id: Option<Uuid>,
    pub source_document_id: Uuid,
    pub currency: String,
    pub subtotal: Decimal,
    pub status: String,
    pub created_utc: DateTime<Utc>,
}

/// Persisted invoice line item, ordered by `sort_order`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceItem {
    pub id: Uuid,
    pub company_id: Uuid,
    pub invoice_id: Uuid,
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub line_total: Decimal,
    pub unit: String,
    pub sort_order: i32,
    pub created_utc: DateTime<Utc>,
}

/// Result of a full conversion, including non-fatal warnings.
#[derive(Debug, Clone)]
pub struct ConversionOutcome {
    pub invoice_id: Uuid,
    pub customer_id: Option<Uuid>,
    pub line_count: usize,
    pub subtotal: Decimal,
    pub warnings: Vec<Warning>,
}
