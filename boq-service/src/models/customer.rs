//! Customer model for boq-service.

use super::ClientInfo;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use service_core::context::Scope;
use uuid::Uuid;

/// Customer record, resolved or created during invoice conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_utc: DateTime<Utc>,
}

impl Customer {
    /// Build a customer from the client fields of a source document.
    pub fn from_client(scope: &Scope, client: &ClientInfo) -> Self {
        Self {
            id: Uuid::new_v4(),
            company_id: scope.company_id,
            name: client.name.clone(),
            email: client.email.clone(),
            phone: client.phone.clone(),
            address: client.address.clone(),
            created_utc: Utc::now(),
        }
    }
}
