//! Domain models for boq-service.

mod customer;
mod document;
mod invoice;

pub use customer::Customer;
pub use document::{
    ClientInfo, CreateDocument, Document, Item, ItemInput, ItemState, Section, SectionInput,
    Subsection, SubsectionInput,
};
pub use invoice::{ConversionOutcome, FlattenedInvoice, Invoice, InvoiceItem, InvoiceLine};
