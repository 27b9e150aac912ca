//! Trip record model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Who a trip record belongs to.
///
/// Visibility is an explicit two-variant type instead of a bare nullable id:
/// the access policy matches on it exhaustively, so a missing identity can
/// never be conflated with a matching one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripOwner {
    /// Owned by the identity with this opaque id
    User(Uuid),
    /// Anonymous/public record, visible only to anonymous requesters
    Public,
}

impl TripOwner {
    /// Build from the nullable `owner_id` column.
    pub fn from_column(owner_id: Option<Uuid>) -> Self {
        match owner_id {
            Some(id) => TripOwner::User(id),
            None => TripOwner::Public,
        }
    }

    /// Build from a resolved caller identity (absent credential = anonymous).
    pub fn from_identity(user_id: Option<Uuid>) -> Self {
        Self::from_column(user_id)
    }

    /// The nullable column representation.
    pub fn as_column(&self) -> Option<Uuid> {
        match self {
            TripOwner::User(id) => Some(*id),
            TripOwner::Public => None,
        }
    }
}

/// Opaque, versioned plan document.
///
/// Stored and returned verbatim. The envelope pins a `version` tag and the
/// caller's free-text `query` at the top level; the embedded query string is
/// the only field this crate ever reads back (substring search in the store).
/// Everything under `plan`/`criteria` belongs to the generation and display
/// layers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlanDocument(Value);

impl PlanDocument {
    /// Envelope version written by [`PlanDocument::assemble`].
    pub const VERSION: i64 = 1;

    /// Wrap generator output together with the search criteria that produced it.
    pub fn assemble(query: &str, criteria: Value, plan: Value) -> Self {
        Self(json!({
            "version": Self::VERSION,
            "query": query,
            "criteria": criteria,
            "plan": plan,
        }))
    }

    /// Reconstitute a document previously persisted by the store.
    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    /// The embedded free-text query, when present.
    pub fn query_text(&self) -> Option<&str> {
        self.0.get("query").and_then(Value::as_str)
    }

    /// The envelope version, when present.
    pub fn version(&self) -> Option<i64> {
        self.0.get("version").and_then(Value::as_i64)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

/// Trip record entity
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Trip {
    pub id: Uuid,
    /// NULL marks an anonymous/public record; never reassigned after creation
    pub owner_id: Option<Uuid>,
    pub title: String,
    pub location: String,
    pub plan_payload: Json<PlanDocument>,
    pub last_updated: DateTime<Utc>,
    /// Non-null marks the record soft-deleted
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Trip {
    pub fn owner(&self) -> TripOwner {
        TripOwner::from_column(self.owner_id)
    }

    pub fn is_live(&self) -> bool {
        self.deleted_at.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_round_trips_through_column() {
        let id = Uuid::new_v4();
        assert_eq!(TripOwner::from_column(Some(id)).as_column(), Some(id));
        assert_eq!(TripOwner::from_column(None).as_column(), None);
    }

    #[test]
    fn test_owner_from_identity_absent_is_public() {
        assert_eq!(TripOwner::from_identity(None), TripOwner::Public);
    }

    #[test]
    fn test_plan_document_assemble_sets_envelope() {
        let doc = PlanDocument::assemble(
            "3 days in Lisbon",
            json!({"query": "3 days in Lisbon", "days": 3}),
            json!({"itinerary": []}),
        );
        assert_eq!(doc.version(), Some(PlanDocument::VERSION));
        assert_eq!(doc.query_text(), Some("3 days in Lisbon"));
    }

    #[test]
    fn test_plan_document_is_stored_verbatim() {
        let raw = json!({"version": 1, "query": "paris", "plan": {"days": [1, 2]}});
        let doc = PlanDocument::from_value(raw.clone());
        assert_eq!(doc.into_value(), raw);
    }

    #[test]
    fn test_plan_document_tolerates_foreign_shape() {
        // Documents written by older versions may lack the envelope entirely.
        let doc = PlanDocument::from_value(json!({"legacy": true}));
        assert_eq!(doc.version(), None);
        assert_eq!(doc.query_text(), None);
    }

    #[test]
    fn test_plan_document_serde_is_transparent() {
        let doc = PlanDocument::assemble("rome", json!({}), json!(null));
        let serialized = serde_json::to_value(&doc).unwrap();
        assert_eq!(serialized.get("version"), Some(&json!(1)));
        assert!(serialized.get("query").is_some());
    }

    #[test]
    fn test_trip_liveness() {
        let mut trip = Trip {
            id: Uuid::new_v4(),
            owner_id: None,
            title: "Paris trip".into(),
            location: "Paris, France".into(),
            plan_payload: Json(PlanDocument::from_value(json!({}))),
            last_updated: Utc::now(),
            deleted_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(trip.is_live());
        trip.deleted_at = Some(Utc::now());
        assert!(!trip.is_live());
    }
}
