//! Wire types for Helix responses.

use serde::Deserialize;

use crate::ports::{CursorPage, PaginationCursor};

/// `{data, total, limit, pagination: {cursor}}` list response.
#[derive(Debug, Deserialize)]
pub(crate) struct PageResponse<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub limit: u64,
    #[serde(default)]
    pub pagination: Pagination,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Pagination {
    #[serde(default)]
    pub cursor: Option<String>,
}

impl<T> From<PageResponse<T>> for CursorPage<T> {
    fn from(response: PageResponse<T>) -> Self {
        CursorPage {
            items: response.data,
            total: response.total,
            limit: response.limit,
            next_cursor: PaginationCursor::from(response.pagination.cursor),
        }
    }
}

/// `{data: [...]}` response without pagination.
#[derive(Debug, Deserialize)]
pub(crate) struct DataResponse<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}
