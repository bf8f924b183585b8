//! Success envelopes.
//!
//! Single resources render as `{"success": true, "data": ...}`, collections add
//! `count`, and paginated listings add `pagination` links to the neighbouring pages.

use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            count: None,
            pagination: None,
            data,
        }
    }
}

impl<T> ApiResponse<Vec<T>> {
    pub fn collection(data: Vec<T>) -> Self {
        Self {
            success: true,
            count: Some(data.len()),
            pagination: None,
            data,
        }
    }

    pub fn paginated(data: Vec<T>, pagination: Pagination) -> Self {
        Self {
            success: true,
            count: Some(data.len()),
            pagination: Some(pagination),
            data,
        }
    }
}

/// Link to a neighbouring page of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct PageLink {
    pub page: i64,
    pub limit: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct Pagination {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<PageLink>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<PageLink>,
}

impl Pagination {
    /// Computes the links for `page` (1-based) of a listing with `total` rows.
    pub fn for_page(page: i64, limit: i64, total: i64) -> Self {
        let end = page.saturating_mul(limit);
        let start = page.saturating_sub(1).saturating_mul(limit);

        Self {
            next: (end < total).then_some(PageLink {
                page: page.saturating_add(1),
                limit,
            }),
            prev: (start > 0).then_some(PageLink {
                page: page.saturating_sub(1),
                limit,
            }),
        }
    }
}

/// Body returned whenever a token is issued.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TokenResponse {
    pub success: bool,
    pub token: String,
}

impl TokenResponse {
    pub fn new(token: String) -> Self {
        Self {
            success: true,
            token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_envelope_omits_count() {
        let json = serde_json::to_value(ApiResponse::ok("photo_1.jpg")).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], "photo_1.jpg");
        assert!(json.get("count").is_none());
        assert!(json.get("pagination").is_none());
    }

    #[test]
    fn test_collection_counts_items() {
        let json = serde_json::to_value(ApiResponse::collection(vec![1, 2, 3])).unwrap();
        assert_eq!(json["count"], 3);
    }

    #[test]
    fn test_first_page_has_only_next() {
        let p = Pagination::for_page(1, 10, 25);
        assert_eq!(p.next, Some(PageLink { page: 2, limit: 10 }));
        assert_eq!(p.prev, None);
    }

    #[test]
    fn test_last_page_has_only_prev() {
        let p = Pagination::for_page(3, 10, 25);
        assert_eq!(p.next, None);
        assert_eq!(p.prev, Some(PageLink { page: 2, limit: 10 }));
    }

    #[test]
    fn test_single_page_serializes_empty_object() {
        let json = serde_json::to_value(Pagination::for_page(1, 25, 4)).unwrap();
        assert_eq!(json, serde_json::json!({}));
    }

    #[test]
    fn test_huge_page_does_not_overflow() {
        let p = Pagination::for_page(i64::MAX, 100, 10);
        assert_eq!(p.next, None);
        assert_eq!(
            p.prev,
            Some(PageLink {
                page: i64::MAX - 1,
                limit: 100
            })
        );
    }

    #[test]
    fn test_exact_boundary_has_no_next() {
        let p = Pagination::for_page(2, 10, 20);
        assert_eq!(p.next, None);
    }
}
