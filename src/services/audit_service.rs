//! Audit logging service.
//!
//! Append-only trail of mutating actions, keyed to an entity. Appends on the
//! mutation path are best-effort: the mutation has already committed by the
//! time the entry is written, and a failed append must never undo or fail it.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::audit_log::AuditLog;
use crate::models::trip::TripOwner;

/// Audit action types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    Create,
    Update,
    SoftDelete,
    HardDelete,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "create",
            AuditAction::Update => "update",
            AuditAction::SoftDelete => "soft_delete",
            AuditAction::HardDelete => "hard_delete",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "create" => Some(AuditAction::Create),
            "update" => Some(AuditAction::Update),
            "soft_delete" => Some(AuditAction::SoftDelete),
            "hard_delete" => Some(AuditAction::HardDelete),
            _ => None,
        }
    }
}

/// Entity types for audit logging. Only trips exist today; the discriminator
/// is persisted so other entities can share the table later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityType {
    Trip,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Trip => "trip",
        }
    }
}

/// Request provenance attached to audit entries
#[derive(Debug, Clone, Default)]
pub struct RequestMeta {
    pub source_ip: Option<String>,
    pub source_agent: Option<String>,
}

/// Audit entry builder
#[derive(Debug)]
pub struct AuditEntry {
    entity_type: EntityType,
    entity_id: Uuid,
    action: AuditAction,
    actor_id: Option<Uuid>,
    before: Option<serde_json::Value>,
    after: Option<serde_json::Value>,
    source_ip: Option<String>,
    source_agent: Option<String>,
}

impl AuditEntry {
    pub fn new(action: AuditAction, entity_type: EntityType, entity_id: Uuid) -> Self {
        Self {
            entity_type,
            entity_id,
            action,
            actor_id: None,
            before: None,
            after: None,
            source_ip: None,
            source_agent: None,
        }
    }

    /// Record who performed the action; anonymous callers stay NULL.
    pub fn actor(mut self, actor: TripOwner) -> Self {
        self.actor_id = actor.as_column();
        self
    }

    pub fn before(mut self, snapshot: serde_json::Value) -> Self {
        self.before = Some(snapshot);
        self
    }

    pub fn after(mut self, snapshot: serde_json::Value) -> Self {
        self.after = Some(snapshot);
        self
    }

    pub fn source(mut self, meta: &RequestMeta) -> Self {
        self.source_ip = meta.source_ip.clone();
        self.source_agent = meta.source_agent.clone();
        self
    }
}

/// Filters for querying the audit trail
#[derive(Debug, Clone, Default)]
pub struct AuditQuery {
    pub entity_id: Option<Uuid>,
    pub action: Option<AuditAction>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: i64,
    pub offset: i64,
}

/// Audit service
pub struct AuditService {
    db: PgPool,
}

impl AuditService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Append an audit entry, returning the stored row.
    pub async fn append(&self, entry: AuditEntry) -> Result<AuditLog> {
        let log = sqlx::query_as::<_, AuditLog>(
            r#"
            INSERT INTO audit_logs
                (id, entity_type, entity_id, action, actor_id, before, after,
                 source_ip, source_agent)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, entity_type, entity_id, action, actor_id, before,
                      after, source_ip, source_agent, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(entry.entity_type.as_str())
        .bind(entry.entity_id)
        .bind(entry.action.as_str())
        .bind(entry.actor_id)
        .bind(entry.before)
        .bind(entry.after)
        .bind(entry.source_ip)
        .bind(entry.source_agent)
        .fetch_one(&self.db)
        .await?;

        Ok(log)
    }

    /// Best-effort append for the mutation path. The mutation already
    /// committed; a failed append is reported to telemetry only.
    pub async fn record(&self, entry: AuditEntry) -> Option<AuditLog> {
        let entity_id = entry.entity_id;
        let action = entry.action;
        match self.append(entry).await {
            Ok(log) => Some(log),
            Err(e) => {
                tracing::warn!(
                    entity_id = %entity_id,
                    action = action.as_str(),
                    error = %e,
                    "Audit append failed; mutation response is unaffected"
                );
                None
            }
        }
    }

    /// Query audit entries, newest first.
    pub async fn query(&self, q: &AuditQuery) -> Result<Vec<AuditLog>> {
        let entries = sqlx::query_as::<_, AuditLog>(
            r#"
            SELECT id, entity_type, entity_id, action, actor_id, before,
                   after, source_ip, source_agent, created_at
            FROM audit_logs
            WHERE ($1::uuid IS NULL OR entity_id = $1)
              AND ($2::text IS NULL OR action = $2)
              AND ($3::timestamptz IS NULL OR created_at >= $3)
              AND ($4::timestamptz IS NULL OR created_at <= $4)
            ORDER BY created_at DESC
            OFFSET $5
            LIMIT $6
            "#,
        )
        .bind(q.entity_id)
        .bind(q.action.map(|a| a.as_str()))
        .bind(q.from)
        .bind(q.to)
        .bind(q.offset)
        .bind(q.limit)
        .fetch_all(&self.db)
        .await?;

        Ok(entries)
    }
}
