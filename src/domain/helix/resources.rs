//! Resources returned by the REST API, and the filters used to list them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::eventsub::EventKind;

/// Maximum number of ids plus logins accepted by one user lookup.
pub const MAX_USER_LOOKUP: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub login: String,
    pub display_name: String,
    #[serde(rename = "type", default)]
    pub user_type: String,
    #[serde(default)]
    pub broadcaster_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub profile_image_url: String,
    #[serde(default)]
    pub offline_image_url: String,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stream {
    pub id: String,
    pub user_id: String,
    pub user_login: String,
    pub user_name: String,
    #[serde(default)]
    pub game_id: String,
    #[serde(default)]
    pub game_name: String,
    #[serde(rename = "type", default)]
    pub stream_type: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub viewer_count: u64,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub thumbnail_url: String,
    #[serde(default)]
    pub tag_ids: Vec<String>,
}

/// Filters for listing subscriptions. Empty means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionFilter {
    pub status: Option<String>,
    pub event_type: Option<EventKind>,
}

impl SubscriptionFilter {
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_type(mut self, kind: EventKind) -> Self {
        self.event_type = Some(kind);
        self
    }

    /// Query parameters in request order.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(status) = &self.status {
            query.push(("status", status.clone()));
        }
        if let Some(kind) = self.event_type {
            query.push(("type", kind.as_str().to_string()));
        }
        query
    }
}

/// Filters for listing live streams. Repeated fields become repeated
/// query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamFilter {
    pub first: Option<u32>,
    pub game_id: Vec<String>,
    pub language: Vec<String>,
    pub user_id: Vec<String>,
    pub user_login: Vec<String>,
}

impl StreamFilter {
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(first) = self.first {
            query.push(("first", first.to_string()));
        }
        let repeated = [
            ("game_id", &self.game_id),
            ("language", &self.language),
            ("user_id", &self.user_id),
            ("user_login", &self.user_login),
        ];
        for (key, values) in repeated {
            query.extend(values.iter().map(|v| (key, v.clone())));
        }
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_subscription_filter_has_no_query() {
        assert!(SubscriptionFilter::default().to_query().is_empty());
    }

    #[test]
    fn subscription_filter_encodes_status_and_type() {
        let filter = SubscriptionFilter::default()
            .with_status("enabled")
            .with_type(EventKind::ChannelFollow);

        assert_eq!(
            filter.to_query(),
            vec![
                ("status", "enabled".to_string()),
                ("type", "channel.follow".to_string())
            ]
        );
    }

    #[test]
    fn stream_filter_repeats_list_parameters() {
        let filter = StreamFilter {
            first: Some(20),
            user_login: vec!["a_user".into(), "b_user".into()],
            ..StreamFilter::default()
        };

        assert_eq!(
            filter.to_query(),
            vec![
                ("first", "20".to_string()),
                ("user_login", "a_user".to_string()),
                ("user_login", "b_user".to_string()),
            ]
        );
    }

    #[test]
    fn stream_deserializes_from_api_shape() {
        let json = r#"{
            "id": "40952121085",
            "user_id": "101051819",
            "user_login": "afro",
            "user_name": "Afro",
            "game_id": "32982",
            "game_name": "Grand Theft Auto V",
            "type": "live",
            "title": "Jacob: Digital Den Laptops & Tablets",
            "viewer_count": 1490,
            "started_at": "2021-03-10T03:18:11Z",
            "language": "en",
            "thumbnail_url": "https://example.com/thumb-{width}x{height}.jpg",
            "tag_ids": []
        }"#;

        let stream: Stream = serde_json::from_str(json).unwrap();

        assert_eq!(stream.user_login, "afro");
        assert_eq!(stream.viewer_count, 1490);
        assert_eq!(stream.stream_type, "live");
    }
}
