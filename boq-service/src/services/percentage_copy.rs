//! Percentage copy generator.
//!
//! Derives a new document whose subtotal is a fixed percentage of an
//! original's. Exactly one numeric field is scaled per item — the rate —
//! so the subtotal scales by the percentage without touching quantities.
//! Every derived total is recomputed from scratch by the model; nothing
//! pre-existing is copied or scaled.

use crate::models::{Document, Item, Section, Subsection};
use chrono::Utc;
use rust_decimal::Decimal;
use service_core::error::AppError;
use uuid::Uuid;

/// Create a scaled copy of `original`.
///
/// The copy is an entirely new document: fresh identities at every
/// level, conversion markers cleared, and only the top-level number
/// caller-supplied. Non-numeric fields are copied verbatim.
pub fn percentage_copy(
    original: &Document,
    percentage: Decimal,
    new_number: String,
) -> Result<Document, AppError> {
    if percentage <= Decimal::ZERO || percentage > Decimal::from(100) {
        return Err(AppError::Validation(anyhow::anyhow!(
            "percentage must be greater than 0 and at most 100, got {}",
            percentage
        )));
    }
    let factor = percentage / Decimal::from(100);

    let sections = original
        .sections
        .iter()
        .map(|section| Section {
            id: Uuid::new_v4(),
            title: section.title.clone(),
            subsections: section
                .subsections
                .iter()
                .map(|subsection| Subsection {
                    id: Uuid::new_v4(),
                    name: subsection.name.clone(),
                    label: subsection.label.clone(),
                    items: subsection
                        .items
                        .iter()
                        .map(|item| Item {
                            id: Uuid::new_v4(),
                            description: item.description.clone(),
                            quantity: item.quantity,
                            unit_id: item.unit_id,
                            unit_name: item.unit_name.clone(),
                            rate: item.rate * factor,
                        })
                        .collect(),
                })
                .collect(),
        })
        .collect();

    Ok(Document {
        id: Uuid::new_v4(),
        company_id: original.company_id,
        number: new_number,
        date: original.date,
        currency: original.currency.clone(),
        client: original.client.clone(),
        sections,
        converted_invoice_id: None,
        converted_utc: None,
        created_utc: Utc::now(),
    })
}
