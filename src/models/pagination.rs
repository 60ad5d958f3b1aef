use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Query parameters for paginated list endpoints
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Page number (1-indexed)
    #[param(minimum = 1, default = 1, example = 1)]
    #[serde(default = "default_page")]
    pub page: i64,

    /// Number of items per page
    #[param(minimum = 1, maximum = 100, default = 20, example = 20)]
    #[serde(default = "default_per_page")]
    pub per_page: i64,
}

/// Highest page a client can request; larger values are clamped.
pub const MAX_PAGE: i64 = 1_000_000;

pub(crate) fn default_page() -> i64 {
    1
}

pub(crate) fn default_per_page() -> i64 {
    20
}

impl PaginationParams {
    /// Calculate the SQL OFFSET value
    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }

    /// Get the clamped page number (1-`MAX_PAGE`)
    pub fn page(&self) -> i64 {
        self.page.clamp(1, MAX_PAGE)
    }

    /// Get the clamped limit value (1-100)
    pub fn limit(&self) -> i64 {
        self.per_page.clamp(1, 100)
    }
}

/// Pagination metadata for list responses
#[derive(Debug, Serialize, ToSchema)]
pub struct PaginationMeta {
    #[schema(example = 1, minimum = 1)]
    pub page: i64,

    #[schema(example = 20, minimum = 1, maximum = 100)]
    pub per_page: i64,

    /// Total number of items across all pages
    #[schema(example = 156)]
    pub total_items: i64,

    #[schema(example = 8)]
    pub total_pages: i64,
}

impl PaginationMeta {
    pub fn new(page: i64, per_page: i64, total_items: i64) -> Self {
        let per_page = per_page.clamp(1, 100);
        let total_pages = (total_items.max(0) + per_page - 1) / per_page;
        Self {
            page: page.clamp(1, MAX_PAGE),
            per_page,
            total_items,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_and_limit_are_clamped() {
        let params = PaginationParams {
            page: 0,
            per_page: 500,
        };
        assert_eq!(params.limit(), 100);
        assert_eq!(params.offset(), 0);

        let params = PaginationParams {
            page: 3,
            per_page: 20,
        };
        assert_eq!(params.offset(), 40);
    }

    #[test]
    fn test_huge_page_does_not_overflow() {
        let params = PaginationParams {
            page: i64::MAX,
            per_page: 20,
        };
        assert_eq!(params.page(), MAX_PAGE);
        assert_eq!(params.offset(), (MAX_PAGE - 1) * 20);

        let params = PaginationParams {
            page: i64::MIN,
            per_page: i64::MAX,
        };
        assert_eq!(params.offset(), 0);

        let meta = PaginationMeta::new(i64::MAX, 20, 5);
        assert_eq!(meta.page, MAX_PAGE);
    }

    #[test]
    fn test_meta_total_pages_rounds_up() {
        let meta = PaginationMeta::new(1, 20, 41);
        assert_eq!(meta.total_pages, 3);

        let meta = PaginationMeta::new(1, 20, 0);
        assert_eq!(meta.total_pages, 0);
    }
}
