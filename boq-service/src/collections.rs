//! Store collection names used by boq-service.

pub const DOCUMENTS: &str = "documents";
pub const CUSTOMERS: &str = "customers";
pub const INVOICES: &str = "invoices";
pub const INVOICE_ITEMS: &str = "invoice_items";
