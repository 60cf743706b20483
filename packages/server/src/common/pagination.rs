//! Page-number pagination types
//!
//! The client API paginates with `page`/`per_page` query parameters and
//! responses carry `results`, `total` and `page_count`.
//!
//! # Usage
//!
//! ```rust,ignore
//! // In a route handler
//! let validated = params.validate();
//!
//! // In a model
//! let (results, total) = Favr::find_page_for_user(user_id, &validated, pool).await?;
//!
//! // Build the response envelope
//! let page = Paginated::new(results, total, &validated);
//! ```

use serde::{Deserialize, Serialize};

/// Raw pagination query parameters as sent by the client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    /// 1-based page number.
    pub page: Option<i64>,
    /// Items per page.
    pub per_page: Option<i64>,
}

impl PageParams {
    /// Validate parameters, applying defaults (page 1, 10 per page) and
    /// clamping `per_page` to 1-100.
    pub fn validate(&self) -> ValidatedPageParams {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(10).clamp(1, 100);
        ValidatedPageParams { page, per_page }
    }
}

/// Validated and normalized pagination parameters.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedPageParams {
    pub page: i64,
    pub per_page: i64,
}

impl ValidatedPageParams {
    /// SQL OFFSET for this page.
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }

    /// SQL LIMIT for this page.
    pub fn limit(&self) -> i64 {
        self.per_page
    }
}

/// A page of results plus totals.
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub results: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub page_count: i64,
}

impl<T> Paginated<T> {
    /// Build the response envelope. `page_count` is always at least 1,
    /// matching the client's expectations for empty result sets.
    pub fn new(results: Vec<T>, total: i64, params: &ValidatedPageParams) -> Self {
        let page_count = ((total + params.per_page - 1) / params.per_page).max(1);
        Self {
            results,
            total,
            page: params.page,
            page_count,
        }
    }
}
