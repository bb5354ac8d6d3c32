//! Audited mutation gateway.
//!
//! Wraps destructive operations so that every governed delete produces
//! exactly one audit entry carrying the record's before-image, and runs
//! entity-specific guards before any mutation is attempted. One gateway
//! serves all entity types; behavior is keyed by registered
//! [`EntityAudit`] configuration instead of per-type delete functions.
//!
//! The gateway is not atomic across its steps: each step is an
//! independent round trip to the store. A failed audit write after a
//! successful delete leaves the delete standing and is reported as a
//! warning on the outcome, because the store offers no cross-operation
//! transactions to roll back with.

use crate::config::IpLookupConfig;
use crate::context::{Actor, Scope};
use crate::error::{AppError, Warning};
use crate::net;
use crate::store::{Record, RecordStore, FOREIGN_KEY_VIOLATION};
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Collection holding audit entries.
pub const AUDIT_LOG_COLLECTION: &str = "audit_log";

/// Kind of mutation recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Restore,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "create",
            AuditAction::Update => "update",
            AuditAction::Delete => "delete",
            AuditAction::Restore => "restore",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "create" => AuditAction::Create,
            "update" => AuditAction::Update,
            "restore" => AuditAction::Restore,
            _ => AuditAction::Delete,
        }
    }
}

/// One audit log record.
///
/// `deleted_data` is the full pre-mutation snapshot and is present only
/// for delete actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: Uuid,
    pub company_id: Uuid,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Uuid,
    pub entity_name: Option<String>,
    pub details: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_data: Option<Record>,
    pub actor: Actor,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Entity-specific pre-delete guard. Receives the store and performs its
/// own fetch so the check runs against current state, not a stale copy.
pub type GuardFn =
    Arc<dyn Fn(Arc<dyn RecordStore>, Uuid) -> BoxFuture<'static, Result<(), AppError>> + Send + Sync>;

/// Per-entity-type audit configuration.
pub struct EntityAudit {
    /// Store collection the entity lives in.
    pub collection: &'static str,
    /// Type label written into audit entries and error messages.
    pub entity_type: &'static str,
    /// Record field used as the human-readable entity name.
    pub label_field: &'static str,
    /// Pre-delete business-rule guard.
    pub guard: Option<GuardFn>,
    /// Known child relationships, as (child collection, relationship
    /// description) pairs used to translate referential-integrity errors.
    pub references: Vec<(&'static str, &'static str)>,
}

/// Result of a governed delete.
#[derive(Debug)]
pub struct DeleteOutcome {
    /// Id of the written audit entry; None when the audit write failed.
    pub audit_entry_id: Option<Uuid>,
    pub warnings: Vec<Warning>,
}

pub struct AuditGateway {
    store: Arc<dyn RecordStore>,
    specs: HashMap<&'static str, EntityAudit>,
    http: reqwest::Client,
    ip_lookup: IpLookupConfig,
}

impl AuditGateway {
    pub fn new(store: Arc<dyn RecordStore>, ip_lookup: IpLookupConfig) -> Self {
        Self {
            store,
            specs: HashMap::new(),
            http: reqwest::Client::new(),
            ip_lookup,
        }
    }

    /// Register the audit configuration for one entity type.
    pub fn register(mut self, spec: EntityAudit) -> Self {
        self.specs.insert(spec.entity_type, spec);
        self
    }

    pub fn store(&self) -> Arc<dyn RecordStore> {
        self.store.clone()
    }

    /// Delete an entity under audit.
    ///
    /// Strict sequence: guard (own re-fetch) → snapshot fetch → store
    /// delete → audit write. Guard and not-found failures abort before
    /// any mutation; an audit-write failure after a successful delete
    /// degrades to a warning on a successful outcome.
    #[instrument(skip(self, scope), fields(entity_type = entity_type, entity_id = %id, actor_id = %scope.actor.id))]
    pub async fn audited_delete(
        &self,
        entity_type: &str,
        id: Uuid,
        scope: &Scope,
    ) -> Result<DeleteOutcome, AppError> {
        let spec = self.specs.get(entity_type).ok_or_else(|| {
            AppError::InternalError(anyhow::anyhow!(
                "no audit configuration registered for entity type '{}'",
                entity_type
            ))
        })?;

        if let Some(guard) = &spec.guard {
            guard(self.store.clone(), id).await?;
        }

        let snapshot = self
            .store
            .get(spec.collection, id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(anyhow::anyhow!("{} {} not found", spec.entity_type, id))
            })?;

        let mut warnings = Vec::new();
        let ip_address = net::public_ip(&self.http, &self.ip_lookup).await;
        if self.ip_lookup.enabled && ip_address.is_none() {
            warnings.push(Warning::IpLookupFailed(
                "could not resolve caller IP address".to_string(),
            ));
        }

        match self.store.delete(spec.collection, id).await {
            Ok(true) => {}
            // Raced with another delete of the same id.
            Ok(false) => {
                return Err(AppError::NotFound(anyhow::anyhow!(
                    "{} {} not found",
                    spec.entity_type,
                    id
                )))
            }
            Err(e) => return Err(translate_store_error(spec, e)),
        }

        info!(collection = spec.collection, "Record deleted");

        let entry = AuditLogEntry {
            id: Uuid::new_v4(),
            company_id: scope.company_id,
            action: AuditAction::Delete.as_str().to_string(),
            entity_type: spec.entity_type.to_string(),
            entity_id: id,
            entity_name: snapshot
                .get(spec.label_field)
                .and_then(|v| v.as_str())
                .map(String::from),
            details: serde_json::json!({ "collection": spec.collection }),
            deleted_data: Some(snapshot),
            actor: scope.actor.clone(),
            ip_address,
            user_agent: scope.user_agent.clone(),
            timestamp: Utc::now(),
        };
        let entry_id = entry.id;

        let audit_entry_id = match serde_json::to_value(&entry) {
            Ok(value) => match self.store.insert(AUDIT_LOG_COLLECTION, value).await {
                Ok(_) => Some(entry_id),
                Err(e) => {
                    warn!(error = %e, "Audit write failed after delete; delete stands");
                    warnings.push(Warning::AuditWriteFailed(e.to_string()));
                    None
                }
            },
            Err(e) => {
                warn!(error = %e, "Audit entry serialization failed; delete stands");
                warnings.push(Warning::AuditWriteFailed(e.to_string()));
                None
            }
        };

        Ok(DeleteOutcome {
            audit_entry_id,
            warnings,
        })
    }
}

/// Rewrite a recognized referential-integrity failure into a domain
/// message naming the blocking relationship; pass anything else through.
fn translate_store_error(spec: &EntityAudit, err: AppError) -> AppError {
    if let AppError::StoreError(cause) = &err {
        let message = cause.to_string();
        if message.starts_with(FOREIGN_KEY_VIOLATION) {
            for (child, relationship) in &spec.references {
                if message.contains(child) {
                    return AppError::Conflict(anyhow::anyhow!(
                        "Cannot delete {}: it is still referenced by {}",
                        spec.entity_type,
                        relationship
                    ));
                }
            }
            return AppError::Conflict(anyhow::anyhow!(
                "Cannot delete {}: dependent records exist",
                spec.entity_type
            ));
        }
    }
    err
}
