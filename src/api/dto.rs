//! Shared Data Transfer Objects (DTOs) for API handlers.

use serde::Serialize;
use utoipa::ToSchema;

/// Pagination metadata for list responses.
///
/// Offset-based: `total` counts every record matching the filter before
/// pagination, and `next_offset` is only present when a further page exists.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Total number of matching records
    pub total: i64,
    /// Page size this response was computed with
    pub limit: i64,
    /// Offset this response starts at
    pub offset: i64,
    /// Whether records exist beyond this page
    pub has_more: bool,
    /// Offset of the next page, or null on the last page
    pub next_offset: Option<i64>,
}

impl Pagination {
    /// Compute pagination metadata from the filter total and the page window.
    pub fn new(total: i64, limit: i64, offset: i64) -> Self {
        let has_more = offset + limit < total;
        Self {
            total,
            limit,
            offset,
            has_more,
            next_offset: if has_more { Some(offset + limit) } else { None },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_first_of_three_pages() {
        // 3 live records, limit 1, offset 0: one record back, more to come.
        let p = Pagination::new(3, 1, 0);
        assert!(p.has_more);
        assert_eq!(p.next_offset, Some(1));
    }

    #[test]
    fn test_pagination_last_page() {
        let p = Pagination::new(3, 1, 2);
        assert!(!p.has_more);
        assert_eq!(p.next_offset, None);
    }

    #[test]
    fn test_pagination_empty_result() {
        let p = Pagination::new(0, 20, 0);
        assert_eq!(p.total, 0);
        assert!(!p.has_more);
        assert_eq!(p.next_offset, None);
    }

    #[test]
    fn test_pagination_exact_boundary() {
        // 40 records in pages of 20: the second page is the last one.
        let p = Pagination::new(40, 20, 20);
        assert!(!p.has_more);
    }

    #[test]
    fn test_pagination_offset_past_end() {
        let p = Pagination::new(5, 20, 100);
        assert!(!p.has_more);
        assert_eq!(p.next_offset, None);
    }

    #[test]
    fn test_pagination_serializes_camel_case() {
        let json = serde_json::to_value(Pagination::new(3, 1, 0)).unwrap();
        assert_eq!(json["total"], 3);
        assert_eq!(json["hasMore"], true);
        assert_eq!(json["nextOffset"], 1);
        assert!(json.get("has_more").is_none());
    }

    #[test]
    fn test_pagination_null_next_offset_in_json() {
        let json = serde_json::to_value(Pagination::new(1, 20, 0)).unwrap();
        assert_eq!(json["nextOffset"], serde_json::Value::Null);
    }
}
