//! EventSubApi port - Interface to the remote subscription and resource API.
//!
//! Credential acquisition is outside this port; implementations are handed
//! a ready-to-use access token.

use async_trait::async_trait;

use super::page_source::{ApiError, CursorPage, PaginationCursor};
use crate::domain::eventsub::Subscription;
use crate::domain::foundation::SubscriptionId;
use crate::domain::helix::{Stream, StreamFilter, SubscriptionFilter, User};

/// Port for the outbound REST collaborator.
#[async_trait]
pub trait EventSubApi: Send + Sync {
    /// Creates a subscription.
    ///
    /// Returns `Ok(None)` when an identical subscription already exists.
    async fn create_subscription(
        &self,
        request: &Subscription,
    ) -> Result<Option<Subscription>, ApiError>;

    /// Fetches one page of this application's subscriptions.
    async fn subscriptions_page(
        &self,
        filter: &SubscriptionFilter,
        cursor: &PaginationCursor,
    ) -> Result<CursorPage<Subscription>, ApiError>;

    /// Deletes a subscription by id.
    async fn delete_subscription(&self, id: &SubscriptionId) -> Result<(), ApiError>;

    /// Looks up users by id and login, at most 100 combined.
    async fn users(&self, ids: &[String], logins: &[String]) -> Result<Vec<User>, ApiError>;

    /// Fetches one page of live streams.
    async fn streams_page(
        &self,
        filter: &StreamFilter,
        cursor: &PaginationCursor,
    ) -> Result<CursorPage<Stream>, ApiError>;
}
