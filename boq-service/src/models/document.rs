//! Bill-of-quantities document model.
//!
//! A document is an ordered hierarchy: sections hold subsections, which
//! hold priced items. Every monetary total is derived bottom-up from
//! item quantity and rate; nothing stored is trusted as a total.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use service_core::context::Scope;
use service_core::error::AppError;
use uuid::Uuid;
use validator::Validate;

/// Client details carried on a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ClientInfo {
    #[validate(length(min = 1, message = "client name is required"))]
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Completeness of a single item.
///
/// The three conditions are: non-empty description, quantity > 0,
/// rate > 0. All three ⇒ complete. None ⇒ empty (UI scaffolding noise,
/// silently dropped). Anything in between ⇒ partially filled, which
/// blocks persistence and conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemState {
    Complete,
    PartiallyFilled,
    Empty,
}

/// One priced work item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: Uuid,
    pub description: String,
    pub quantity: Decimal,
    pub unit_id: Option<Uuid>,
    pub unit_name: Option<String>,
    pub rate: Decimal,
}

impl Item {
    /// Derived, never stored.
    pub fn line_total(&self) -> Decimal {
        self.quantity * self.rate
    }

    pub fn state(&self) -> ItemState {
        let conditions = [
            !self.description.trim().is_empty(),
            self.quantity > Decimal::ZERO,
            self.rate > Decimal::ZERO,
        ];
        let satisfied = conditions.iter().filter(|c| **c).count();
        match satisfied {
            3 => ItemState::Complete,
            0 => ItemState::Empty,
            _ => ItemState::PartiallyFilled,
        }
    }
}

/// A lettered grouping of items (A, B, C, ...) with a free-text label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subsection {
    pub id: Uuid,
    pub name: String,
    pub label: String,
    pub items: Vec<Item>,
}

impl Subsection {
    pub fn total(&self) -> Decimal {
        self.items.iter().map(Item::line_total).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: Uuid,
    pub title: Option<String>,
    pub subsections: Vec<Subsection>,
}

impl Section {
    pub fn total(&self) -> Decimal {
        self.subsections.iter().map(Subsection::total).sum()
    }
}

/// Persisted BOQ document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub company_id: Uuid,
    /// Pattern BOQ-YYYYMMDD-NNNN, unique per company.
    pub number: String,
    pub date: NaiveDate,
    pub currency: String,
    pub client: ClientInfo,
    pub sections: Vec<Section>,
    /// Set once the document has been converted to an invoice; a
    /// converted document rejects deletion and further edits.
    pub converted_invoice_id: Option<Uuid>,
    pub converted_utc: Option<DateTime<Utc>>,
    pub created_utc: DateTime<Utc>,
}

impl Document {
    /// Recomputed bottom-up on every call, never cached.
    pub fn subtotal(&self) -> Decimal {
        self.sections.iter().map(Section::total).sum()
    }

    pub fn is_converted(&self) -> bool {
        self.converted_invoice_id.is_some()
    }

    /// Drop empty items in place, preserving order. Empty items are not
    /// an error, only noise left behind by form scaffolding.
    pub fn prune_empty_items(&mut self) {
        for section in &mut self.sections {
            for subsection in &mut section.subsections {
                subsection
                    .items
                    .retain(|item| item.state() != ItemState::Empty);
            }
        }
    }

    /// Reject partially filled items. Call after [`prune_empty_items`];
    /// a pruned document either passes or names the offending item.
    ///
    /// [`prune_empty_items`]: Document::prune_empty_items
    pub fn validate_items(&self) -> Result<(), AppError> {
        for section in &self.sections {
            for subsection in &section.subsections {
                for (index, item) in subsection.items.iter().enumerate() {
                    if item.state() == ItemState::PartiallyFilled {
                        return Err(AppError::Validation(anyhow::anyhow!(
                            "item {} in subsection {} is partially filled: description, quantity and rate are all required",
                            index + 1,
                            subsection.name
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Input item for document creation; ids are assigned on materialization.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemInput {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub quantity: Decimal,
    pub unit_id: Option<Uuid>,
    pub unit_name: Option<String>,
    #[serde(default)]
    pub rate: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubsectionInput {
    pub name: String,
    pub label: String,
    #[serde(default)]
    pub items: Vec<ItemInput>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SectionInput {
    pub title: Option<String>,
    #[serde(default)]
    pub subsections: Vec<SubsectionInput>,
}

/// Payload for creating a document. The number is never caller-supplied;
/// the numbering service assigns it.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateDocument {
    pub date: NaiveDate,
    #[validate(length(equal = 3, message = "currency must be a 3-letter code"))]
    pub currency: String,
    #[validate(nested)]
    pub client: ClientInfo,
    #[serde(default)]
    pub sections: Vec<SectionInput>,
}

impl CreateDocument {
    /// Materialize a document with fresh identities everywhere.
    pub fn into_document(self, scope: &Scope, number: String) -> Document {
        let sections = self
            .sections
            .into_iter()
            .map(|section| Section {
                id: Uuid::new_v4(),
                title: section.title,
                subsections: section
                    .subsections
                    .into_iter()
                    .map(|subsection| Subsection {
                        id: Uuid::new_v4(),
                        name: subsection.name,
                        label: subsection.label,
                        items: subsection
                            .items
                            .into_iter()
                            .map(|item| Item {
                                id: Uuid::new_v4(),
                                description: item.description,
                                quantity: item.quantity,
                                unit_id: item.unit_id,
                                unit_name: item.unit_name,
                                rate: item.rate,
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect();

        Document {
            id: Uuid::new_v4(),
            company_id: scope.company_id,
            number,
            date: self.date,
            currency: self.currency,
            client: self.client,
            sections,
            converted_invoice_id: None,
            converted_utc: None,
            created_utc: Utc::now(),
        }
    }
}
