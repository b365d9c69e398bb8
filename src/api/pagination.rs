use serde::Serialize;

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::validation::{non_blank, Validator};

/// A validated `page`/`limit` pair. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    /// Parse raw query values. Blank or missing values take the defaults;
    /// `limit` above the configured maximum is capped.
    pub fn parse(page: Option<&str>, limit: Option<&str>, api: &ApiConfig) -> Result<Self, ApiError> {
        let mut v = Validator::new();

        let page = match non_blank(page) {
            None => 1,
            Some(raw) => match raw.parse::<i64>() {
                Ok(p) if p >= 1 => p,
                _ => {
                    v.push("page", "page must be a positive integer");
                    1
                }
            },
        };

        let limit = match non_blank(limit) {
            None => api.default_page_size,
            Some(raw) => match raw.parse::<i64>() {
                Ok(l) if l > api.max_page_size => {
                    tracing::warn!("Limit {} exceeds max {}, capping to max", l, api.max_page_size);
                    api.max_page_size
                }
                Ok(l) if l >= 1 => l,
                _ => {
                    v.push("limit", "limit must be a positive integer");
                    api.default_page_size
                }
            },
        };

        v.finish()?;
        Ok(Self { page, limit })
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    #[serde(rename = "totalPages")]
    pub total_pages: i64,
}

impl Pagination {
    pub fn new(request: PageRequest, total: i64) -> Self {
        Self {
            page: request.page,
            limit: request.limit,
            total,
            total_pages: (total + request.limit - 1) / request.limit,
        }
    }
}

/// List envelope: `{ data, pagination }`
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T: Serialize> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

impl<T: Serialize> Paginated<T> {
    pub fn new(data: Vec<T>, request: PageRequest, total: i64) -> Self {
        Self {
            data,
            pagination: Pagination::new(request, total),
        }
    }
}
