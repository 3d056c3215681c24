//! Pagination arithmetic.

use serde::Serialize;

use crate::error::QueryError;

use super::map::QueryMap;

/// Reference to an adjacent page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRef {
    /// 1-based page number.
    pub page: u64,
    /// Number of records on that page.
    pub page_size: u64,
}

/// Adjacent-page descriptor. A missing entry means no such page exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Pagination {
    /// Following page, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<PageRef>,
    /// Preceding page, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<PageRef>,
}

impl Pagination {
    /// Describe the pages around `page` given `limit` records per page and
    /// `total` matching records.
    ///
    /// The next page reports the remainder when it is the final partial
    /// page; the previous page always reports `limit`. Arithmetic saturates,
    /// so `page == 0` behaves like page 1 without a `prev`.
    pub fn compute(page: u64, limit: u64, total: u64) -> Self {
        let start = page.saturating_sub(1).saturating_mul(limit);
        let end = page.saturating_mul(limit);

        let next = (end < total).then(|| PageRef {
            page: page + 1,
            page_size: limit.min(total - end),
        });

        let prev = (start > 0).then(|| PageRef {
            page: page - 1,
            page_size: limit,
        });

        Self { next, prev }
    }
}

/// Validated `page`/`limit` pair read from a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: u64,
    /// Page size.
    pub limit: u64,
}

impl PageRequest {
    /// Read `page` (default 1) and `limit` (default `default_limit`).
    ///
    /// Zero, negative or non-numeric values are rejected rather than clamped.
    pub fn from_query(query: &QueryMap, default_limit: u64) -> Result<Self, QueryError> {
        let page = read_positive(query, "page")?.unwrap_or(1);
        let limit = read_positive(query, "limit")?.unwrap_or(default_limit);
        Ok(Self { page, limit })
    }

    /// Records to skip before this page.
    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Descriptor for this page given the total match count.
    pub fn pagination(&self, total: u64) -> Pagination {
        Pagination::compute(self.page, self.limit, total)
    }
}

fn read_positive(query: &QueryMap, field: &'static str) -> Result<Option<u64>, QueryError> {
    let Some(raw) = query.get_str(field) else {
        return Ok(None);
    };

    match raw.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(Some(n)),
        _ => Err(QueryError::InvalidPage {
            field,
            value: raw.to_string(),
        }),
    }
}
