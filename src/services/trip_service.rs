//! Trip orchestration service.
//!
//! The only component aware of caller identity. Each request runs the same
//! linear sequence: validate parameters, execute against the store, apply the
//! access policy, append to the audit log on mutation, and shape the result.
//! No lock spans the authorize-then-mutate steps — ownership is immutable
//! after creation, and the store's atomic live-to-deleted transition is what
//! resolves concurrent deletes.

use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::audit_log::AuditLog;
use crate::models::trip::{PlanDocument, Trip, TripOwner};
use crate::services::access_policy::{self, Access};
use crate::services::audit_service::{
    AuditAction, AuditEntry, AuditService, EntityType, RequestMeta,
};
use crate::services::trip_store::{
    ListFilter, NewTrip, SortDirection, SortField, TripStore, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
    MIN_PAGE_SIZE,
};

/// Validated listing parameters
#[derive(Debug, Clone)]
pub struct ListParams {
    pub search: Option<String>,
    pub sort_field: SortField,
    pub sort_direction: SortDirection,
    pub limit: i64,
    pub offset: i64,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            search: None,
            sort_field: SortField::LastUpdated,
            sort_direction: SortDirection::Desc,
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}

impl ListParams {
    /// Reject out-of-range pagination before touching the store.
    pub fn validate(&self) -> Result<()> {
        if self.limit < MIN_PAGE_SIZE || self.limit > MAX_PAGE_SIZE {
            return Err(AppError::Validation(format!(
                "limit must be between {MIN_PAGE_SIZE} and {MAX_PAGE_SIZE}"
            )));
        }
        if self.offset < 0 {
            return Err(AppError::Validation(
                "offset must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

fn snapshot(trip: &Trip) -> Value {
    serde_json::to_value(trip).unwrap_or(Value::Null)
}

/// Trip service
pub struct TripService {
    store: TripStore,
    audit: AuditService,
}

impl TripService {
    /// Build the service over an injected pool handle.
    pub fn new(db: PgPool) -> Self {
        Self {
            store: TripStore::new(db.clone()),
            audit: AuditService::new(db),
        }
    }

    /// List the requester's trips. Scoping happens in the store query itself,
    /// so non-owned records never enter the result set.
    pub async fn list(
        &self,
        requester: TripOwner,
        params: ListParams,
    ) -> Result<(Vec<Trip>, i64)> {
        params.validate()?;

        let filter = ListFilter {
            owner: requester,
            search: params.search,
            sort_field: params.sort_field,
            sort_direction: params.sort_direction,
            limit: params.limit,
            offset: params.offset,
        };
        self.store.list(&filter).await
    }

    /// Fetch one trip, distinguishing "doesn't exist" (not found) from
    /// "exists but not yours" (forbidden).
    pub async fn get(&self, requester: TripOwner, id: Uuid) -> Result<Trip> {
        let trip = self
            .store
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Trip '{id}' not found")))?;

        match access_policy::decide(trip.owner(), requester) {
            Access::Allow => Ok(trip),
            Access::Deny => Err(AppError::Forbidden(
                "You do not have access to this trip".to_string(),
            )),
        }
    }

    /// Store a freshly generated plan on behalf of the requester.
    ///
    /// The record is committed first; the audit append is best-effort and a
    /// failure there never fails the create.
    pub async fn create(
        &self,
        requester: TripOwner,
        title: String,
        location: String,
        plan: PlanDocument,
        meta: &RequestMeta,
    ) -> Result<Trip> {
        let new = NewTrip {
            id: Uuid::new_v4(),
            owner: requester,
            title,
            location,
            plan,
        };
        let trip = self.store.create(new).await?;

        self.audit
            .record(
                AuditEntry::new(AuditAction::Create, EntityType::Trip, trip.id)
                    .actor(requester)
                    .after(snapshot(&trip))
                    .source(meta),
            )
            .await;

        Ok(trip)
    }

    /// Soft-delete one trip after an ownership check.
    ///
    /// Returns the deleted record plus the audit entry when the append
    /// succeeded. If a concurrent request won the delete race between our
    /// ownership check and the update, the store reports the record gone and
    /// this request observes not-found.
    pub async fn delete(
        &self,
        requester: TripOwner,
        id: Uuid,
        meta: &RequestMeta,
    ) -> Result<(Trip, Option<AuditLog>)> {
        let current = self
            .store
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Trip '{id}' not found")))?;

        if access_policy::decide(current.owner(), requester) == Access::Deny {
            return Err(AppError::Forbidden(
                "You do not have access to this trip".to_string(),
            ));
        }

        let deleted = self
            .store
            .soft_delete(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Trip '{id}' not found")))?;

        let entry = AuditEntry::new(AuditAction::SoftDelete, EntityType::Trip, id)
            .actor(requester)
            .before(snapshot(&current))
            .after(serde_json::json!({ "deletedAt": deleted.deleted_at }))
            .source(meta);
        let log = self.audit.record(entry).await;

        Ok((deleted, log))
    }

    /// Physically remove a record. Administrative capability with no route on
    /// the public surface; still audited when it removes anything.
    pub async fn hard_delete(
        &self,
        actor: TripOwner,
        id: Uuid,
        meta: &RequestMeta,
    ) -> Result<bool> {
        let removed = self.store.hard_delete(id).await?;

        if removed {
            self.audit
                .record(
                    AuditEntry::new(AuditAction::HardDelete, EntityType::Trip, id)
                        .actor(actor)
                        .source(meta),
                )
                .await;
        }

        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_params_defaults_are_valid() {
        assert!(ListParams::default().validate().is_ok());
    }

    #[test]
    fn test_list_params_rejects_zero_limit() {
        let params = ListParams {
            limit: 0,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_list_params_rejects_oversized_limit() {
        let params = ListParams {
            limit: MAX_PAGE_SIZE + 1,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_list_params_accepts_boundary_limits() {
        for limit in [MIN_PAGE_SIZE, MAX_PAGE_SIZE] {
            let params = ListParams {
                limit,
                ..Default::default()
            };
            assert!(params.validate().is_ok());
        }
    }

    #[test]
    fn test_list_params_rejects_negative_offset() {
        let params = ListParams {
            offset: -1,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(AppError::Validation(_))
        ));
    }
}
