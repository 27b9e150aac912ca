//! OpenAPI specification assembly.

use utoipa::OpenApi;

use crate::api::dto::Pagination;
use crate::api::handlers::audit::{AuditListResponse, AuditLogResponse};
use crate::api::handlers::trips::{
    AuditSummary, CreateTripRequest, DeleteTripResponse, DeletedTripSummary, TripListResponse,
    TripResponse,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Itinera API",
        description = "Trip plan history: ownership-scoped storage, soft deletion, and audit trail"
    ),
    paths(
        crate::api::handlers::trips::list_trips,
        crate::api::handlers::trips::get_trip,
        crate::api::handlers::trips::create_trip,
        crate::api::handlers::trips::delete_trip,
        crate::api::handlers::audit::list_audit_logs,
    ),
    components(schemas(
        TripResponse,
        TripListResponse,
        CreateTripRequest,
        DeleteTripResponse,
        DeletedTripSummary,
        AuditSummary,
        AuditLogResponse,
        AuditListResponse,
        Pagination,
    )),
    tags(
        (name = "trips", description = "Trip history"),
        (name = "audit", description = "Audit trail (operator)"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI spec. Called once at startup.
pub fn build_openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_includes_trip_paths() {
        let spec = build_openapi();
        let paths = spec.paths.paths;
        assert!(paths.contains_key("/api/v1/trips"));
        assert!(paths.contains_key("/api/v1/trips/{id}"));
        assert!(paths.contains_key("/api/v1/audit"));
    }

    #[test]
    fn test_openapi_serializes() {
        let json = serde_json::to_value(build_openapi()).unwrap();
        assert!(json.get("paths").is_some());
        assert!(json.get("components").is_some());
    }
}
