//! Cursor pagination as a lazy, pull-driven stream.
//!
//! Pages are fetched inside `poll_next`, only when the consumer asks for an
//! item past the end of the current page. There is no producer task: a
//! stream that is dropped or closed simply stops, along with any fetch it
//! had in flight.
//!
//! Each element is `Result<T, ApiError>`. A failed fetch is yielded once as
//! the final element.
//!
//! ```ignore
//! let mut streams = paginate(move |cursor| {
//!     let api = Arc::clone(&api);
//!     async move { api.streams_page(&StreamFilter::default(), &cursor).await }
//! });
//!
//! while let Some(stream) = streams.next().await {
//!     let stream = stream?;
//!     println!("{} is live", stream.user_login);
//! }
//! ```

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::{self, BoxStream, Stream, StreamExt};

use crate::ports::{ApiError, PageSource, PaginationCursor};

enum PageState<T> {
    Fetch(PaginationCursor),
    Draining {
        items: std::vec::IntoIter<T>,
        next: PaginationCursor,
    },
    Done,
}

/// Lazy sequence over every item of a paginated collection.
///
/// Finite and not restartable.
pub struct Paginated<T> {
    inner: Option<BoxStream<'static, Result<T, ApiError>>>,
}

impl<T> Paginated<T> {
    /// Stops the sequence. Later polls return `None` and no further pages
    /// are requested.
    pub fn close(&mut self) {
        self.inner = None;
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_none()
    }
}

impl<T> Stream for Paginated<T> {
    type Item = Result<T, ApiError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let Some(inner) = self.inner.as_mut() else {
            return Poll::Ready(None);
        };

        let next = inner.poll_next_unpin(cx);
        if let Poll::Ready(None) = next {
            self.inner = None;
        }
        next
    }
}

/// Walks a paginated collection starting from the empty cursor.
///
/// The sequence ends when a page comes back empty, or once a page whose
/// next cursor is empty has been fully yielded.
pub fn paginate<T, S>(source: S) -> Paginated<T>
where
    T: Send + 'static,
    S: PageSource<T> + 'static,
{
    let pages = stream::unfold(
        (source, PageState::Fetch(PaginationCursor::start())),
        |(source, mut state)| async move {
            loop {
                match state {
                    PageState::Done => return None,
                    PageState::Draining { mut items, next } => {
                        if let Some(item) = items.next() {
                            return Some((Ok(item), (source, PageState::Draining { items, next })));
                        }
                        state = if next.is_empty() {
                            PageState::Done
                        } else {
                            PageState::Fetch(next)
                        };
                    }
                    PageState::Fetch(cursor) => match source.fetch_page(&cursor).await {
                        Ok(page) if page.items.is_empty() => return None,
                        Ok(page) => {
                            state = PageState::Draining {
                                items: page.items.into_iter(),
                                next: page.next_cursor,
                            };
                        }
                        Err(e) => {
                            tracing::warn!(cursor = %cursor, error = %e, "Page fetch failed");
                            return Some((Err(e), (source, PageState::Done)));
                        }
                    },
                }
            }
        },
    );

    Paginated {
        inner: Some(pages.boxed()),
    }
}
