//! PageSource port - Interface for cursor-paginated remote collections.

use async_trait::async_trait;
use std::fmt;
use std::future::Future;
use thiserror::Error;

/// Errors from outbound API calls, including page fetches.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("Network error: {0}")]
    Network(String),

    /// The remote side answered with a non-success status.
    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body did not have the expected shape.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The request was rejected locally before being sent.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    /// True for failures of the transport or the remote side, as opposed
    /// to a request refused locally.
    pub fn is_transport(&self) -> bool {
        !matches!(self, ApiError::InvalidRequest(_))
    }
}

/// Opaque continuation token. Empty means "first page" on a request and
/// "no more pages" on a response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PaginationCursor(String);

impl PaginationCursor {
    pub fn new(cursor: impl Into<String>) -> Self {
        Self(cursor.into())
    }

    /// The cursor a traversal starts from.
    pub fn start() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PaginationCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Option<String>> for PaginationCursor {
    fn from(cursor: Option<String>) -> Self {
        Self(cursor.unwrap_or_default())
    }
}

/// One page of a remote collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorPage<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub limit: u64,
    pub next_cursor: PaginationCursor,
}

impl<T> CursorPage<T> {
    pub fn new(items: Vec<T>, next_cursor: PaginationCursor) -> Self {
        let total = items.len() as u64;
        Self {
            items,
            total,
            limit: 0,
            next_cursor,
        }
    }

    /// A page with no continuation.
    pub fn last(items: Vec<T>) -> Self {
        Self::new(items, PaginationCursor::start())
    }
}

/// Port for fetching one page of a collection by cursor.
///
/// Fetching the same cursor twice is assumed to return the same page.
#[async_trait]
pub trait PageSource<T>: Send + Sync {
    async fn fetch_page(&self, cursor: &PaginationCursor) -> Result<CursorPage<T>, ApiError>;
}

#[async_trait]
impl<T, F, Fut> PageSource<T> for F
where
    T: Send + 'static,
    F: Fn(PaginationCursor) -> Fut + Send + Sync,
    Fut: Future<Output = Result<CursorPage<T>, ApiError>> + Send + 'static,
{
    async fn fetch_page(&self, cursor: &PaginationCursor) -> Result<CursorPage<T>, ApiError> {
        (self)(cursor.clone()).await
    }
}
