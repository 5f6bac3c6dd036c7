use axum::{response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;
/// Pages past this are clamped so the row offset stays in range.
pub const MAX_PAGE: u64 = 10_000;

#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> axum::response::Response {
        Json(self).into_response()
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn with_message(data: T, message: &str) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.to_string()),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedResponse<T: Serialize> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T: Serialize> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, total: u64, page: u64, limit: u64) -> Self {
        let total_pages = if limit == 0 {
            0
        } else {
            (total + limit - 1) / limit
        };
        Self {
            items,
            total,
            page,
            limit,
            total_pages,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct PaginationQuery {
    /// Page number (1-based)
    pub page: Option<u64>,
    /// Items per page (max 100)
    pub limit: Option<u64>,
}

impl PaginationQuery {
    /// Returns `(page, limit)` with defaults applied and both clamped.
    pub fn resolve(&self) -> (u64, u64) {
        let page = self.page.unwrap_or(1).clamp(1, MAX_PAGE);
        let limit = self
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        (page, limit)
    }
}

/// Shared query string of the content list endpoints. Each endpoint reads
/// the filters that apply to it.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ContentListQuery {
    /// Page number (1-based)
    pub page: Option<u64>,
    /// Items per page (max 100)
    pub limit: Option<u64>,
    /// Category filter
    pub category: Option<String>,
    /// Type filter
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Only featured (true) or non-featured (false) items
    pub featured: Option<bool>,
    /// Published filter, honored for ADMIN/EDITOR only
    pub published: Option<bool>,
    /// Case-insensitive text search
    pub search: Option<String>,
    /// Tag slug filter
    pub tag: Option<String>,
    /// Events only: restrict to events dated today or later
    pub upcoming: Option<bool>,
}

impl ContentListQuery {
    pub fn pagination(&self) -> (u64, u64) {
        PaginationQuery {
            page: self.page,
            limit: self.limit,
        }
        .resolve()
    }

    /// Trimmed, non-empty search text.
    pub fn search_text(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_basic() {
        let resp = PaginatedResponse::<String>::new(vec![], 100, 1, 20);
        assert_eq!(resp.total_pages, 5);
    }

    #[test]
    fn total_pages_with_remainder() {
        let resp = PaginatedResponse::<String>::new(vec![], 101, 1, 20);
        assert_eq!(resp.total_pages, 6);
    }

    #[test]
    fn total_pages_zero_limit() {
        let resp = PaginatedResponse::<String>::new(vec![], 10, 1, 0);
        assert_eq!(resp.total_pages, 0);
    }

    #[test]
    fn total_pages_zero_total() {
        let resp = PaginatedResponse::<String>::new(vec![], 0, 1, 20);
        assert_eq!(resp.total_pages, 0);
    }

    #[test]
    fn pagination_defaults() {
        assert_eq!(PaginationQuery::default().resolve(), (1, DEFAULT_PAGE_SIZE));
    }

    #[test]
    fn pagination_clamps_limit_and_page() {
        let q = PaginationQuery {
            page: Some(0),
            limit: Some(1000),
        };
        assert_eq!(q.resolve(), (1, MAX_PAGE_SIZE));

        let q = PaginationQuery {
            page: Some(3),
            limit: Some(0),
        };
        assert_eq!(q.resolve(), (3, 1));
    }

    #[test]
    fn huge_page_is_clamped() {
        let q = PaginationQuery {
            page: Some(u64::MAX / 4),
            limit: Some(MAX_PAGE_SIZE),
        };
        let (page, limit) = q.resolve();
        assert_eq!(page, MAX_PAGE);
        assert!((page - 1).checked_mul(limit).is_some());

        let q = ContentListQuery {
            page: Some(4_611_686_018_427_387_904),
            ..Default::default()
        };
        assert_eq!(q.pagination(), (MAX_PAGE, DEFAULT_PAGE_SIZE));
    }

    #[test]
    fn blank_search_is_ignored() {
        let q = ContentListQuery {
            search: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(q.search_text(), None);

        let q = ContentListQuery {
            search: Some("  youth ".to_string()),
            ..Default::default()
        };
        assert_eq!(q.search_text(), Some("youth"));
    }
}
