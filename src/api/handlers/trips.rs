//! Trip history handlers.

use axum::{
    extract::{Extension, Path, Query, State},
    http::{header::USER_AGENT, HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::api::dto::Pagination;
use crate::api::middleware::auth::{requester_from, AuthIdentity};
use crate::api::SharedState;
use crate::error::{AppError, Result};
use crate::models::trip::{PlanDocument, Trip};
use crate::services::audit_service::RequestMeta;
use crate::services::plan_generator::PlanCriteria;
use crate::services::trip_service::{ListParams, TripService};
use crate::services::trip_store::{SortDirection, SortField, DEFAULT_PAGE_SIZE};

/// Longest accepted title or location
const MAX_DISPLAY_LEN: usize = 200;

/// Returned on delete so clients can message the recovery window. Policy
/// statement only; no purge job runs on a schedule.
const RECOVERY_NOTICE: &str = "Deleted trips can be recovered for 30 days.";

/// Create trip routes
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_trips).post(create_trip))
        .route("/:id", get(get_trip).delete(delete_trip))
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListTripsQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTripRequest {
    pub title: String,
    pub location: String,
    /// Free-text query handed to the plan generator and embedded in the
    /// stored document for search
    pub query: String,
    /// Generator-specific options, passed through untouched
    #[schema(value_type = Option<Object>)]
    pub options: Option<Value>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TripResponse {
    pub id: Uuid,
    pub owner_id: Option<Uuid>,
    pub title: String,
    pub location: String,
    #[schema(value_type = Object)]
    pub plan_payload: Value,
    pub last_updated: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub cover_image_url: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TripListResponse {
    pub records: Vec<TripResponse>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeletedTripSummary {
    pub id: Uuid,
    pub title: String,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditSummary {
    pub id: Uuid,
    pub action: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteTripResponse {
    pub record: DeletedTripSummary,
    /// Absent when the audit append failed; the delete itself stands
    pub audit: Option<AuditSummary>,
    pub message: String,
}

fn parse_sort_field(s: &str) -> Result<SortField> {
    match s {
        "lastUpdated" | "last_updated" => Ok(SortField::LastUpdated),
        "title" => Ok(SortField::Title),
        "createdAt" | "created_at" => Ok(SortField::CreatedAt),
        _ => Err(AppError::Validation(format!("Invalid sortBy: {}", s))),
    }
}

fn parse_sort_order(s: &str) -> Result<SortDirection> {
    match s.to_lowercase().as_str() {
        "asc" => Ok(SortDirection::Asc),
        "desc" => Ok(SortDirection::Desc),
        _ => Err(AppError::Validation(format!("Invalid sortOrder: {}", s))),
    }
}

fn validate_display_string(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{} must not be empty", field)));
    }
    if value.len() > MAX_DISPLAY_LEN {
        return Err(AppError::Validation(format!(
            "{} must be at most {} characters",
            field, MAX_DISPLAY_LEN
        )));
    }
    Ok(())
}

/// Request provenance for the audit trail. Free-text, best available.
fn request_meta(headers: &HeaderMap) -> RequestMeta {
    let source_ip = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    let source_agent = headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    RequestMeta {
        source_ip,
        source_agent,
    }
}

/// Look up a cover image, degrading to none on any failure.
async fn cover_image_for(state: &SharedState, location: &str) -> Option<String> {
    let enricher = state.image_enricher.as_ref()?;
    match enricher.cover_image(location).await {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!(location, error = %e, "Image enrichment failed");
            None
        }
    }
}

fn to_response(trip: Trip, cover_image_url: Option<String>) -> TripResponse {
    TripResponse {
        id: trip.id,
        owner_id: trip.owner_id,
        title: trip.title,
        location: trip.location,
        plan_payload: trip.plan_payload.0.into_value(),
        last_updated: trip.last_updated,
        created_at: trip.created_at,
        updated_at: trip.updated_at,
        cover_image_url,
    }
}

/// List the caller's trip history
#[utoipa::path(
    get,
    path = "",
    context_path = "/api/v1/trips",
    tag = "trips",
    params(ListTripsQuery),
    responses(
        (status = 200, description = "One page of trip history", body = TripListResponse),
        (status = 400, description = "Invalid query parameters"),
    )
)]
pub async fn list_trips(
    State(state): State<SharedState>,
    Extension(auth): Extension<Option<AuthIdentity>>,
    Query(query): Query<ListTripsQuery>,
) -> Result<Json<TripListResponse>> {
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE);
    let offset = query.offset.unwrap_or(0);
    let sort_field = query
        .sort_by
        .as_deref()
        .map(parse_sort_field)
        .transpose()?
        .unwrap_or(SortField::LastUpdated);
    let sort_direction = query
        .sort_order
        .as_deref()
        .map(parse_sort_order)
        .transpose()?
        .unwrap_or(SortDirection::Desc);
    let search = query.search.clone().filter(|s| !s.is_empty());

    let requester = requester_from(&auth);
    let service = TripService::new(state.db.clone());
    let (trips, total) = service
        .list(
            requester,
            ListParams {
                search,
                sort_field,
                sort_direction,
                limit,
                offset,
            },
        )
        .await?;

    let mut records = Vec::with_capacity(trips.len());
    for trip in trips {
        let cover = cover_image_for(&state, &trip.location).await;
        records.push(to_response(trip, cover));
    }

    Ok(Json(TripListResponse {
        records,
        pagination: Pagination::new(total, limit, offset),
    }))
}

/// Get one trip by id
#[utoipa::path(
    get,
    path = "/{id}",
    context_path = "/api/v1/trips",
    tag = "trips",
    responses(
        (status = 200, description = "The trip record", body = TripResponse),
        (status = 403, description = "The record exists but the caller does not own it"),
        (status = 404, description = "No such trip"),
    )
)]
pub async fn get_trip(
    State(state): State<SharedState>,
    Extension(auth): Extension<Option<AuthIdentity>>,
    Path(id): Path<Uuid>,
) -> Result<Json<TripResponse>> {
    let service = TripService::new(state.db.clone());
    let trip = service.get(requester_from(&auth), id).await?;

    let cover = cover_image_for(&state, &trip.location).await;
    Ok(Json(to_response(trip, cover)))
}

/// Generate and store a new trip plan
#[utoipa::path(
    post,
    path = "",
    context_path = "/api/v1/trips",
    tag = "trips",
    request_body = CreateTripRequest,
    responses(
        (status = 201, description = "The stored trip record", body = TripResponse),
        (status = 400, description = "Invalid request body"),
        (status = 502, description = "Plan generation failed upstream"),
    )
)]
pub async fn create_trip(
    State(state): State<SharedState>,
    Extension(auth): Extension<Option<AuthIdentity>>,
    headers: HeaderMap,
    Json(req): Json<CreateTripRequest>,
) -> Result<(StatusCode, Json<TripResponse>)> {
    validate_display_string("title", &req.title)?;
    validate_display_string("location", &req.location)?;
    if req.query.trim().is_empty() {
        return Err(AppError::Validation("query must not be empty".to_string()));
    }

    let criteria = PlanCriteria {
        query: req.query.clone(),
        options: req.options.unwrap_or(Value::Null),
    };
    let plan = state.plan_generator.generate(&criteria).await?;
    let document = PlanDocument::assemble(&req.query, serde_json::to_value(&criteria)?, plan);

    let requester = requester_from(&auth);
    let meta = request_meta(&headers);
    let service = TripService::new(state.db.clone());
    let trip = service
        .create(requester, req.title, req.location, document, &meta)
        .await?;

    // The record is stored; a failed image lookup only costs the cover.
    let cover = cover_image_for(&state, &trip.location).await;
    Ok((StatusCode::CREATED, Json(to_response(trip, cover))))
}

/// Soft-delete one trip
#[utoipa::path(
    delete,
    path = "/{id}",
    context_path = "/api/v1/trips",
    tag = "trips",
    responses(
        (status = 200, description = "Deletion confirmation", body = DeleteTripResponse),
        (status = 403, description = "The record exists but the caller does not own it"),
        (status = 404, description = "No such trip"),
    )
)]
pub async fn delete_trip(
    State(state): State<SharedState>,
    Extension(auth): Extension<Option<AuthIdentity>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<DeleteTripResponse>> {
    let meta = request_meta(&headers);
    let service = TripService::new(state.db.clone());
    let (deleted, log) = service.delete(requester_from(&auth), id, &meta).await?;

    Ok(Json(DeleteTripResponse {
        record: DeletedTripSummary {
            id: deleted.id,
            title: deleted.title,
            deleted_at: deleted.deleted_at,
        },
        audit: log.map(|l| AuditSummary {
            id: l.id,
            action: l.action,
            timestamp: l.created_at,
        }),
        message: RECOVERY_NOTICE.to_string(),
    }))
}
