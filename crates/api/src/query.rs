//! Shared query parameter types for API handlers.

use serde::Deserialize;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 100;
pub const MAX_PAGE_SIZE: i64 = 1000;

/// `?name=&page=&limit=` on the employee listing.
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub name: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PaginationParams {
    /// 1-based page, at least 1.
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(DEFAULT_PAGE).max(1)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    /// Saturates instead of overflowing on absurd page numbers.
    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.limit())
    }
}

/// Number of pages needed to show `total` records, `limit` per page.
pub fn total_pages(total: i64, limit: i64) -> i64 {
    (total + limit - 1) / limit
}

/// `?code=` on activation links.
#[derive(Debug, Deserialize)]
pub struct CodeParam {
    pub code: String,
}

/// `?token=` on password reset links.
#[derive(Debug, Deserialize)]
pub struct TokenParam {
    pub token: String,
}
