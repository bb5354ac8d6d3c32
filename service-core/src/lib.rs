//! service-core: Shared infrastructure for the BOQ service workspace.
pub mod audit;
pub mod config;
pub mod context;
pub mod error;
pub mod net;
pub mod observability;
pub mod store;

pub use async_trait;
pub use serde;
pub use serde_json;
pub use tokio;
pub use tracing;
pub use validator;
