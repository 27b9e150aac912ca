//! Audit trail handlers (operator surface).
//!
//! Read-only view over the audit log. Gated by the admin middleware; trips
//! themselves are never mutated from here.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::api::SharedState;
use crate::error::{AppError, Result};
use crate::models::audit_log::AuditLog;
use crate::services::audit_service::{AuditAction, AuditQuery, AuditService};
use crate::services::trip_store::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, MIN_PAGE_SIZE};

/// Create audit routes
pub fn router() -> Router<SharedState> {
    Router::new().route("/", get(list_audit_logs))
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListAuditQuery {
    pub entity_id: Option<Uuid>,
    pub action: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogResponse {
    pub id: Uuid,
    pub entity_type: String,
    pub entity_id: Uuid,
    pub action: String,
    pub actor_id: Option<Uuid>,
    #[schema(value_type = Option<Object>)]
    pub before: Option<Value>,
    #[schema(value_type = Option<Object>)]
    pub after: Option<Value>,
    pub source_ip: Option<String>,
    pub source_agent: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuditListResponse {
    pub entries: Vec<AuditLogResponse>,
}

impl From<AuditLog> for AuditLogResponse {
    fn from(log: AuditLog) -> Self {
        Self {
            id: log.id,
            entity_type: log.entity_type,
            entity_id: log.entity_id,
            action: log.action,
            actor_id: log.actor_id,
            before: log.before,
            after: log.after,
            source_ip: log.source_ip,
            source_agent: log.source_agent,
            timestamp: log.created_at,
        }
    }
}

fn parse_action(s: &str) -> Result<AuditAction> {
    AuditAction::parse(s).ok_or_else(|| AppError::Validation(format!("Invalid action: {}", s)))
}

/// Query the audit trail, newest entries first
#[utoipa::path(
    get,
    path = "",
    context_path = "/api/v1/audit",
    tag = "audit",
    params(ListAuditQuery),
    responses(
        (status = 200, description = "Matching audit entries", body = AuditListResponse),
        (status = 400, description = "Invalid query parameters"),
        (status = 401, description = "Missing or invalid credential"),
        (status = 403, description = "Caller is not an operator"),
    )
)]
pub async fn list_audit_logs(
    State(state): State<SharedState>,
    Query(query): Query<ListAuditQuery>,
) -> Result<Json<AuditListResponse>> {
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE);
    let offset = query.offset.unwrap_or(0);
    if !(MIN_PAGE_SIZE..=MAX_PAGE_SIZE).contains(&limit) {
        return Err(AppError::Validation(format!(
            "limit must be between {MIN_PAGE_SIZE} and {MAX_PAGE_SIZE}"
        )));
    }
    if offset < 0 {
        return Err(AppError::Validation(
            "offset must be non-negative".to_string(),
        ));
    }

    let action = query.action.as_deref().map(parse_action).transpose()?;

    let service = AuditService::new(state.db.clone());
    let entries = service
        .query(&AuditQuery {
            entity_id: query.entity_id,
            action,
            from: query.from,
            to: query.to,
            limit,
            offset,
        })
        .await?;

    Ok(Json(AuditListResponse {
        entries: entries.into_iter().map(AuditLogResponse::from).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_action_known_values() {
        assert_eq!(parse_action("create").unwrap(), AuditAction::Create);
        assert_eq!(parse_action("soft_delete").unwrap(), AuditAction::SoftDelete);
    }

    #[test]
    fn test_parse_action_rejects_unknown() {
        assert!(matches!(
            parse_action("purge"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_response_from_log_maps_created_at_to_timestamp() {
        let now = Utc::now();
        let log = AuditLog {
            id: Uuid::new_v4(),
            entity_type: "trip".into(),
            entity_id: Uuid::new_v4(),
            action: "soft_delete".into(),
            actor_id: None,
            before: Some(serde_json::json!({"title": "Old"})),
            after: None,
            source_ip: Some("203.0.113.9".into()),
            source_agent: None,
            created_at: now,
        };
        let resp = AuditLogResponse::from(log);
        assert_eq!(resp.timestamp, now);
        assert_eq!(resp.action, "soft_delete");
    }
}
