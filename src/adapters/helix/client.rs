//! Helix REST client.
//!
//! Every request carries the application's `Client-Id` header and a bearer
//! access token. Obtaining and refreshing that token happens elsewhere.
//!
//! # Configuration
//!
//! ```ignore
//! let client = HelixClient::new(client_id, SecretString::new(token))
//!     .with_base_url("http://localhost:8080/mock");
//! ```

use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;

use super::types::{DataResponse, PageResponse};
use crate::domain::eventsub::Subscription;
use crate::domain::foundation::SubscriptionId;
use crate::domain::helix::{Stream, StreamFilter, SubscriptionFilter, User, MAX_USER_LOOKUP};
use crate::ports::{ApiError, CursorPage, EventSubApi, PaginationCursor};

/// Production Helix endpoint.
pub const DEFAULT_API_BASE_URL: &str = "https://api.twitch.tv/helix";

const SUBSCRIPTIONS_PATH: &str = "/eventsub/subscriptions";
const USERS_PATH: &str = "/users";
const STREAMS_PATH: &str = "/streams";

/// Helix API client.
pub struct HelixClient {
    api_base_url: String,
    client_id: String,
    access_token: SecretString,
    http_client: reqwest::Client,
}

impl HelixClient {
    pub fn new(client_id: impl Into<String>, access_token: SecretString) -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            client_id: client_id.into(),
            access_token,
            http_client: reqwest::Client::new(),
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("Client-Id", &self.client_id)
            .bearer_auth(self.access_token.expose_secret())
    }

    async fn fetch_page<T: DeserializeOwned>(
        &self,
        path: &str,
        mut query: Vec<(&'static str, String)>,
        cursor: &PaginationCursor,
    ) -> Result<CursorPage<T>, ApiError> {
        if !cursor.is_empty() {
            query.push(("after", cursor.to_string()));
        }

        tracing::debug!(path, cursor = %cursor, "Requesting page");

        let response = self
            .authorized(self.http_client.get(self.url(path)))
            .query(&query)
            .send()
            .await
            .map_err(network_error)?;

        if response.status() != StatusCode::OK {
            return Err(unexpected_status(response, "list").await);
        }

        let page: PageResponse<T> = response.json().await.map_err(decode_error)?;
        Ok(page.into())
    }
}

#[async_trait]
impl EventSubApi for HelixClient {
    async fn create_subscription(
        &self,
        request: &Subscription,
    ) -> Result<Option<Subscription>, ApiError> {
        let response = self
            .authorized(self.http_client.post(self.url(SUBSCRIPTIONS_PATH)))
            .json(request)
            .send()
            .await
            .map_err(network_error)?;

        match response.status() {
            StatusCode::CONFLICT => {
                tracing::debug!(event_type = %request.event_type, "Subscription already exists");
                Ok(None)
            }
            StatusCode::OK | StatusCode::ACCEPTED => {
                let created: DataResponse<Subscription> =
                    response.json().await.map_err(decode_error)?;
                let subscription = created.data.into_iter().next().ok_or_else(|| {
                    ApiError::Decode("subscription response contained no data".to_string())
                })?;
                tracing::info!(
                    subscription_id = %subscription.id.as_str(),
                    event_type = %subscription.event_type,
                    status = %subscription.status,
                    "Subscription created"
                );
                Ok(Some(subscription))
            }
            _ => Err(unexpected_status(response, "create_subscription").await),
        }
    }

    async fn subscriptions_page(
        &self,
        filter: &SubscriptionFilter,
        cursor: &PaginationCursor,
    ) -> Result<CursorPage<Subscription>, ApiError> {
        self.fetch_page(SUBSCRIPTIONS_PATH, filter.to_query(), cursor).await
    }

    async fn delete_subscription(&self, id: &SubscriptionId) -> Result<(), ApiError> {
        let response = self
            .authorized(self.http_client.delete(self.url(SUBSCRIPTIONS_PATH)))
            .query(&[("id", id.as_str())])
            .send()
            .await
            .map_err(network_error)?;

        match response.status() {
            StatusCode::OK | StatusCode::NO_CONTENT => {
                tracing::debug!(subscription_id = %id.as_str(), "Subscription deleted");
                Ok(())
            }
            _ => Err(unexpected_status(response, "delete_subscription").await),
        }
    }

    async fn users(&self, ids: &[String], logins: &[String]) -> Result<Vec<User>, ApiError> {
        if ids.len() + logins.len() > MAX_USER_LOOKUP {
            return Err(ApiError::InvalidRequest(format!(
                "at most {} users can be requested at a time",
                MAX_USER_LOOKUP
            )));
        }

        let query: Vec<(&str, &str)> = ids
            .iter()
            .map(|id| ("id", id.as_str()))
            .chain(logins.iter().map(|login| ("login", login.as_str())))
            .collect();

        let response = self
            .authorized(self.http_client.get(self.url(USERS_PATH)))
            .query(&query)
            .send()
            .await
            .map_err(network_error)?;

        if response.status() != StatusCode::OK {
            return Err(unexpected_status(response, "users").await);
        }

        let users: DataResponse<User> = response.json().await.map_err(decode_error)?;
        Ok(users.data)
    }

    async fn streams_page(
        &self,
        filter: &StreamFilter,
        cursor: &PaginationCursor,
    ) -> Result<CursorPage<Stream>, ApiError> {
        self.fetch_page(STREAMS_PATH, filter.to_query(), cursor).await
    }
}

fn network_error(err: reqwest::Error) -> ApiError {
    tracing::warn!(error = %err, "Helix request failed");
    ApiError::Network(err.to_string())
}

fn decode_error(err: reqwest::Error) -> ApiError {
    tracing::warn!(error = %err, "Failed to decode Helix response");
    ApiError::Decode(err.to_string())
}

async fn unexpected_status(response: reqwest::Response, operation: &'static str) -> ApiError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    tracing::warn!(operation, status, body = %body, "Unexpected Helix response");
    ApiError::Status { status, body }
}
