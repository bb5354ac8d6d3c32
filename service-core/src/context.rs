//! Explicit call scope: company and actor identity threaded through
//! every service call instead of ambient session state.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The authenticated user performing an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// Per-call scope. Constructed at the boundary from the identity/session
/// collaborator and passed by reference everywhere below it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    pub company_id: Uuid,
    pub actor: Actor,
    /// Client signature, when the caller supplied one.
    pub user_agent: Option<String>,
}

impl Scope {
    pub fn new(company_id: Uuid, actor: Actor) -> Self {
        Self {
            company_id,
            actor,
            user_agent: None,
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}
