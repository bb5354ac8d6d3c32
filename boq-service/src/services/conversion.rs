//! Conversion engine: flattens a hierarchical document into invoice
//! line items and drives the full document-to-invoice operation.

use crate::collections;
use crate::models::{
    ConversionOutcome, Customer, Document, FlattenedInvoice, Invoice, InvoiceItem, InvoiceLine,
    ItemState,
};
use crate::services::metrics::{CONVERSIONS_TOTAL, STORE_OP_DURATION};
use chrono::Utc;
use rust_decimal::Decimal;
use service_core::context::Scope;
use service_core::error::{AppError, Warning};
use service_core::store::{record_id, Filter, RecordStore};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Marker embedded in section header rows; the post-filter strips rows
/// containing it.
pub const SECTION_MARKER: &str = "SECTION:";

/// Unit of measure used when an item resolves to nothing.
pub const DEFAULT_UNIT: &str = "Item";

fn header_line(description: String) -> InvoiceLine {
    InvoiceLine {
        description,
        quantity: Decimal::ONE,
        unit_price: Decimal::ZERO,
        line_total: Decimal::ZERO,
        unit: DEFAULT_UNIT.to_string(),
    }
}

/// Flatten a document into an ordered list of invoice lines plus a
/// subtotal. Pure: calling it twice on the same document yields
/// identical output.
///
/// Sections with a non-empty title emit a zero-amount `SECTION:` header
/// row; every subsection emits a `{name}: {label}` header row; every
/// complete item emits a priced line with its total recomputed from
/// quantity and rate. The post-filter then removes only the zero-amount
/// rows carrying the `SECTION:` marker — subsection headers survive into
/// the invoice. The subtotal sums the rows that remain.
pub fn flatten_to_invoice_lines(document: &Document) -> FlattenedInvoice {
    let mut lines = Vec::new();

    for section in &document.sections {
        if let Some(title) = section.title.as_deref().filter(|t| !t.is_empty()) {
            lines.push(header_line(format!("{} {}", SECTION_MARKER, title)));
        }
        for subsection in &section.subsections {
            lines.push(header_line(format!(
                "{}: {}",
                subsection.name, subsection.label
            )));
            for item in &subsection.items {
                if item.state() != ItemState::Complete {
                    continue;
                }
                let unit = item
                    .unit_name
                    .clone()
                    .filter(|name| !name.is_empty())
                    .or_else(|| item.unit_id.map(|id| id.to_string()))
                    .unwrap_or_else(|| DEFAULT_UNIT.to_string());
                lines.push(InvoiceLine {
                    description: item.description.clone(),
                    quantity: item.quantity,
                    unit_price: item.rate,
                    line_total: item.quantity * item.rate,
                    unit,
                });
            }
        }
    }

    // Narrow filter: only section-level placeholders are stripped.
    lines.retain(|line| {
        !(line.line_total == Decimal::ZERO
            && line.unit_price == Decimal::ZERO
            && line.description.contains(SECTION_MARKER))
    });

    let subtotal = lines.iter().map(|line| line.line_total).sum();
    FlattenedInvoice { lines, subtotal }
}

/// Drives the full conversion: customer resolution, invoice creation,
/// line insertion, and stamping the source document.
///
/// Not atomic: each step is an independent store round trip. A failure
/// after the invoice insert surfaces as `AppError::PartiallyApplied` so
/// recovery tooling can tell a half-applied conversion from one that
/// never started.
pub struct ConversionService {
    store: Arc<dyn RecordStore>,
}

impl ConversionService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Convert a persisted document into a draft invoice.
    ///
    /// Rejects documents that are already converted before any side
    /// effect runs. Customer resolution failure is non-fatal: the
    /// invoice is created without a customer link and the outcome
    /// carries a warning.
    #[instrument(skip(self, scope), fields(company_id = %scope.company_id, document_id = %document_id))]
    pub async fn convert_to_invoice(
        &self,
        scope: &Scope,
        document_id: Uuid,
    ) -> Result<ConversionOutcome, AppError> {
        let record = self
            .store
            .get(collections::DOCUMENTS, document_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(anyhow::anyhow!("document {} not found", document_id))
            })?;
        let mut document: Document = serde_json::from_value(record)
            .map_err(|e| AppError::StoreError(anyhow::anyhow!("malformed document record: {}", e)))?;
        if document.company_id != scope.company_id {
            return Err(AppError::NotFound(anyhow::anyhow!(
                "document {} not found",
                document_id
            )));
        }

        if document.is_converted() {
            CONVERSIONS_TOTAL.with_label_values(&["rejected"]).inc();
            return Err(AppError::Guard(anyhow::anyhow!(
                "document {} has already been converted to an invoice",
                document.number
            )));
        }

        document.prune_empty_items();
        document.validate_items()?;

        let flattened = flatten_to_invoice_lines(&document);

        let mut warnings = Vec::new();
        let customer_id = self.resolve_customer(scope, &document, &mut warnings).await;

        let invoice = Invoice {
            id: Uuid::new_v4(),
            company_id: scope.company_id,
            customer_id,
            source_document_id: document.id,
            currency: document.currency.clone(),
            subtotal: flattened.subtotal,
            status: "draft".to_string(),
            created_utc: Utc::now(),
        };
        let invoice_id = invoice.id;

        let timer = STORE_OP_DURATION
            .with_label_values(&["insert_invoice"])
            .start_timer();
        let result = self
            .store
            .insert(collections::INVOICES, serde_json::to_value(&invoice)?)
            .await;
        timer.observe_duration();
        result?;

        for (index, line) in flattened.lines.iter().enumerate() {
            let item = InvoiceItem {
                id: Uuid::new_v4(),
                company_id: scope.company_id,
                invoice_id,
                description: line.description.clone(),
                quantity: line.quantity,
                unit_price: line.unit_price,
                line_total: line.line_total,
                unit: line.unit.clone(),
                sort_order: index as i32,
                created_utc: Utc::now(),
            };
            let inserted = self
                .store
                .insert(collections::INVOICE_ITEMS, serde_json::to_value(&item)?)
                .await;
            if let Err(e) = inserted {
                CONVERSIONS_TOTAL.with_label_values(&["partial"]).inc();
                return Err(AppError::PartiallyApplied(anyhow::anyhow!(
                    "invoice {} was created but inserting line {} failed: {}",
                    invoice_id,
                    index + 1,
                    e
                )));
            }
        }

        let stamp = serde_json::json!({
            "converted_invoice_id": invoice_id,
            "converted_utc": Utc::now(),
        });
        let stamped = self
            .store
            .update(collections::DOCUMENTS, document.id, stamp)
            .await;
        if let Err(e) = stamped {
            CONVERSIONS_TOTAL.with_label_values(&["partial"]).inc();
            return Err(AppError::PartiallyApplied(anyhow::anyhow!(
                "invoice {} and its lines were created but stamping document {} failed: {}",
                invoice_id,
                document.number,
                e
            )));
        }

        CONVERSIONS_TOTAL.with_label_values(&["success"]).inc();
        info!(
            invoice_id = %invoice_id,
            line_count = flattened.lines.len(),
            subtotal = %flattened.subtotal,
            "Document converted to invoice"
        );

        Ok(ConversionOutcome {
            invoice_id,
            customer_id,
            line_count: flattened.lines.len(),
            subtotal: flattened.subtotal,
            warnings,
        })
    }

    /// Look up an existing customer by exact name within the company
    /// scope, creating one from the document's client fields otherwise.
    /// Creation failure is logged and reported as a warning.
    async fn resolve_customer(
        &self,
        scope: &Scope,
        document: &Document,
        warnings: &mut Vec<Warning>,
    ) -> Option<Uuid> {
        let filter = Filter::new()
            .eq("company_id", scope.company_id)
            .eq("name", &document.client.name);
        let existing = match self.store.select(collections::CUSTOMERS, &filter).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(error = %e, "Customer lookup failed; continuing without customer link");
                warnings.push(Warning::CustomerCreateFailed(e.to_string()));
                return None;
            }
        };
        if let Some(found) = existing.first().and_then(record_id) {
            return Some(found);
        }

        let customer = Customer::from_client(scope, &document.client);
        let value = match serde_json::to_value(&customer) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "Customer serialization failed; continuing without customer link");
                warnings.push(Warning::CustomerCreateFailed(e.to_string()));
                return None;
            }
        };
        match self.store.insert(collections::CUSTOMERS, value).await {
            Ok(_) => Some(customer.id),
            Err(e) => {
                warn!(error = %e, "Customer creation failed; continuing without customer link");
                warnings.push(Warning::CustomerCreateFailed(e.to_string()));
                None
            }
        }
    }
}
