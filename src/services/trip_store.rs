//! Trip record store.
//!
//! Typed persistence for trip records: filtered/sorted/paginated listing,
//! point lookup, creation, soft delete, and hard delete. The store is
//! identity-agnostic — ownership enforcement is the orchestration layer's
//! responsibility, which keeps this component reusable for admin and audit
//! tooling that must see every record.

use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::trip::{PlanDocument, Trip, TripOwner};

/// Smallest accepted page size
pub const MIN_PAGE_SIZE: i64 = 1;
/// Largest accepted page size
pub const MAX_PAGE_SIZE: i64 = 100;
/// Page size applied when the caller does not ask for one
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Sortable columns for trip listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    LastUpdated,
    Title,
    CreatedAt,
}

impl SortField {
    /// Column name interpolated into ORDER BY. Values come from this closed
    /// enum only, never from caller input.
    pub fn column(&self) -> &'static str {
        match self {
            SortField::LastUpdated => "last_updated",
            SortField::Title => "title",
            SortField::CreatedAt => "created_at",
        }
    }
}

/// Sort direction for trip listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Filter for the list operation
#[derive(Debug, Clone)]
pub struct ListFilter {
    /// Scope: records with exactly this ownership (anonymous scope matches
    /// only anonymous records)
    pub owner: TripOwner,
    /// Case-insensitive substring over title, location, and the plan
    /// payload's embedded query string
    pub search: Option<String>,
    pub sort_field: SortField,
    pub sort_direction: SortDirection,
    pub limit: i64,
    pub offset: i64,
}

/// A record to insert. Timestamps are server-assigned.
#[derive(Debug)]
pub struct NewTrip {
    pub id: Uuid,
    pub owner: TripOwner,
    pub title: String,
    pub location: String,
    pub plan: PlanDocument,
}

const TRIP_COLUMNS: &str = "id, owner_id, title, location, plan_payload, \
     last_updated, deleted_at, created_at, updated_at";

/// Escape LIKE metacharacters and wrap in wildcards so caller input always
/// means a literal substring.
fn like_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

/// Trip record store
pub struct TripStore {
    db: PgPool,
}

impl TripStore {
    /// Create a new store over an externally owned pool
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List live records matching the filter, plus the total count over the
    /// same filter before pagination. Soft-deleted records never appear.
    pub async fn list(&self, filter: &ListFilter) -> Result<(Vec<Trip>, i64)> {
        let pattern = filter.search.as_deref().map(like_pattern);

        // created_at/id tie-break keeps ordering stable across pages.
        let sql = format!(
            r#"
            SELECT {TRIP_COLUMNS}
            FROM trips
            WHERE deleted_at IS NULL
              AND owner_id IS NOT DISTINCT FROM $1::uuid
              AND ($2::text IS NULL
                   OR title ILIKE $2
                   OR location ILIKE $2
                   OR plan_payload->>'query' ILIKE $2)
            ORDER BY {} {}, created_at ASC, id ASC
            OFFSET $3
            LIMIT $4
            "#,
            filter.sort_field.column(),
            filter.sort_direction.as_sql(),
        );

        let trips = sqlx::query_as::<_, Trip>(&sql)
            .bind(filter.owner.as_column())
            .bind(pattern.clone())
            .bind(filter.offset)
            .bind(filter.limit)
            .fetch_all(&self.db)
            .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM trips
            WHERE deleted_at IS NULL
              AND owner_id IS NOT DISTINCT FROM $1::uuid
              AND ($2::text IS NULL
                   OR title ILIKE $2
                   OR location ILIKE $2
                   OR plan_payload->>'query' ILIKE $2)
            "#,
        )
        .bind(filter.owner.as_column())
        .bind(pattern)
        .fetch_one(&self.db)
        .await?;

        Ok((trips, total))
    }

    /// Point lookup by id. Soft-deleted records are excluded; ownership is
    /// not — callers apply the access policy themselves.
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Trip>> {
        let sql = format!(
            "SELECT {TRIP_COLUMNS} FROM trips WHERE id = $1 AND deleted_at IS NULL"
        );
        let trip = sqlx::query_as::<_, Trip>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(trip)
    }

    /// Insert a new record. An id collision is an integrity error, not a
    /// validation failure.
    pub async fn create(&self, new: NewTrip) -> Result<Trip> {
        let sql = format!(
            r#"
            INSERT INTO trips (id, owner_id, title, location, plan_payload)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {TRIP_COLUMNS}
            "#
        );
        let trip = sqlx::query_as::<_, Trip>(&sql)
            .bind(new.id)
            .bind(new.owner.as_column())
            .bind(&new.title)
            .bind(&new.location)
            .bind(Json(&new.plan))
            .fetch_one(&self.db)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db) = e {
                    if db.is_unique_violation() {
                        return AppError::Conflict(format!(
                            "Trip with id '{}' already exists",
                            new.id
                        ));
                    }
                }
                AppError::from(e)
            })?;

        Ok(trip)
    }

    /// Atomically transition a live record to soft-deleted.
    ///
    /// The WHERE clause is the check-and-set: only a live row matches, so of
    /// two concurrent deletes exactly one gets the record back and the other
    /// observes `None`. A second call on the same id is `None`, never a
    /// spurious success.
    pub async fn soft_delete(&self, id: Uuid) -> Result<Option<Trip>> {
        let sql = format!(
            r#"
            UPDATE trips
            SET deleted_at = NOW(), updated_at = NOW(), last_updated = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {TRIP_COLUMNS}
            "#
        );
        let trip = sqlx::query_as::<_, Trip>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(trip)
    }

    /// Physically remove a record regardless of soft-delete state.
    /// Administrative capability; not reachable from the public surface.
    pub async fn hard_delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM trips WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_wraps_in_wildcards() {
        assert_eq!(like_pattern("paris"), "%paris%");
    }

    #[test]
    fn test_like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern("100%_fun"), "%100\\%\\_fun%");
        assert_eq!(like_pattern("back\\slash"), "%back\\\\slash%");
    }

    #[test]
    fn test_sort_field_columns() {
        assert_eq!(SortField::LastUpdated.column(), "last_updated");
        assert_eq!(SortField::Title.column(), "title");
        assert_eq!(SortField::CreatedAt.column(), "created_at");
    }

    #[test]
    fn test_sort_direction_sql() {
        assert_eq!(SortDirection::Asc.as_sql(), "ASC");
        assert_eq!(SortDirection::Desc.as_sql(), "DESC");
    }

    #[test]
    fn test_page_size_bounds_are_sane() {
        assert!(MIN_PAGE_SIZE <= DEFAULT_PAGE_SIZE);
        assert!(DEFAULT_PAGE_SIZE <= MAX_PAGE_SIZE);
    }
}
