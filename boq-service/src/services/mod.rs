//! Services for boq-service.

mod conversion;
mod documents;
mod metrics;
mod numbering;
mod percentage_copy;

pub use conversion::{flatten_to_invoice_lines, ConversionService, DEFAULT_UNIT, SECTION_MARKER};
pub use documents::{
    customer_audit_spec, document_audit_spec, DocumentService, CUSTOMER_ENTITY, DOCUMENT_ENTITY,
};
pub use metrics::{get_metrics, init_metrics};
pub use numbering::{next_number, next_number_at, NUMBER_PREFIX};
pub use percentage_copy::percentage_copy;
