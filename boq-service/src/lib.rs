//! boq-service: hierarchical bill-of-quantities documents, derived
//! percentage copies, and conversion into flat invoice line items.

pub mod collections;
pub mod models;
pub mod services;
