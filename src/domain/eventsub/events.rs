//! Closed catalogue of event types and their payloads.
//!
//! Every event-type tag the gateway understands has exactly one `EventKind`
//! variant and one `TypedEvent` variant. Adding an event type means adding
//! to both enums and to the decoder's routing table; there is no runtime
//! registration of new shapes.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Event-type tag, one per subscription type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    #[serde(rename = "channel.update")]
    ChannelUpdate,
    #[serde(rename = "channel.follow")]
    ChannelFollow,
    #[serde(rename = "channel.subscribe")]
    ChannelSubscribe,
    #[serde(rename = "channel.cheer")]
    ChannelCheer,
    #[serde(rename = "channel.raid")]
    ChannelRaid,
    #[serde(rename = "channel.ban")]
    ChannelBan,
    #[serde(rename = "channel.unban")]
    ChannelUnban,
    #[serde(rename = "channel.channel_points_custom_reward.add")]
    CustomRewardAdd,
    #[serde(rename = "channel.channel_points_custom_reward.update")]
    CustomRewardUpdate,
    #[serde(rename = "channel.channel_points_custom_reward.remove")]
    CustomRewardRemove,
    #[serde(rename = "channel.channel_points_custom_reward_redemption.add")]
    RedemptionAdd,
    #[serde(rename = "channel.channel_points_custom_reward_redemption.update")]
    RedemptionUpdate,
    #[serde(rename = "channel.hype_train.begin")]
    HypeTrainBegin,
    #[serde(rename = "channel.hype_train.progress")]
    HypeTrainProgress,
    #[serde(rename = "channel.hype_train.end")]
    HypeTrainEnd,
    #[serde(rename = "stream.online")]
    StreamOnline,
    #[serde(rename = "stream.offline")]
    StreamOffline,
    #[serde(rename = "user.authorization.revoke")]
    UserAuthorizationRevoke,
    #[serde(rename = "user.update")]
    UserUpdate,
}

impl EventKind {
    /// Every catalogued kind.
    pub const ALL: [EventKind; 19] = [
        EventKind::ChannelUpdate,
        EventKind::ChannelFollow,
        EventKind::ChannelSubscribe,
        EventKind::ChannelCheer,
        EventKind::ChannelRaid,
        EventKind::ChannelBan,
        EventKind::ChannelUnban,
        EventKind::CustomRewardAdd,
        EventKind::CustomRewardUpdate,
        EventKind::CustomRewardRemove,
        EventKind::RedemptionAdd,
        EventKind::RedemptionUpdate,
        EventKind::HypeTrainBegin,
        EventKind::HypeTrainProgress,
        EventKind::HypeTrainEnd,
        EventKind::StreamOnline,
        EventKind::StreamOffline,
        EventKind::UserAuthorizationRevoke,
        EventKind::UserUpdate,
    ];

    /// Returns the wire tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::ChannelUpdate => "channel.update",
            EventKind::ChannelFollow => "channel.follow",
            EventKind::ChannelSubscribe => "channel.subscribe",
            EventKind::ChannelCheer => "channel.cheer",
            EventKind::ChannelRaid => "channel.raid",
            EventKind::ChannelBan => "channel.ban",
            EventKind::ChannelUnban => "channel.unban",
            EventKind::CustomRewardAdd => "channel.channel_points_custom_reward.add",
            EventKind::CustomRewardUpdate => "channel.channel_points_custom_reward.update",
            EventKind::CustomRewardRemove => "channel.channel_points_custom_reward.remove",
            EventKind::RedemptionAdd => "channel.channel_points_custom_reward_redemption.add",
            EventKind::RedemptionUpdate => {
                "channel.channel_points_custom_reward_redemption.update"
            }
            EventKind::HypeTrainBegin => "channel.hype_train.begin",
            EventKind::HypeTrainProgress => "channel.hype_train.progress",
            EventKind::HypeTrainEnd => "channel.hype_train.end",
            EventKind::StreamOnline => "stream.online",
            EventKind::StreamOffline => "stream.offline",
            EventKind::UserAuthorizationRevoke => "user.authorization.revoke",
            EventKind::UserUpdate => "user.update",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when a tag is not in the catalogue.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown event type: {0}")]
pub struct UnknownEventKind(pub String);

impl FromStr for EventKind {
    type Err = UnknownEventKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownEventKind(s.to_string()))
    }
}

// ════════════════════════════════════════════════════════════════════
// Payloads
// ════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelUpdateEvent {
    pub broadcaster_user_id: String,
    pub broadcaster_user_login: String,
    pub broadcaster_user_name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub category_id: String,
    #[serde(default)]
    pub category_name: String,
    #[serde(default)]
    pub is_mature: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelFollowEvent {
    pub user_id: String,
    pub user_login: String,
    pub user_name: String,
    pub broadcaster_user_id: String,
    pub broadcaster_user_login: String,
    pub broadcaster_user_name: String,
}

/// New subscriber. Resubscriptions are not reported by this event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSubscribeEvent {
    pub user_id: String,
    pub user_login: String,
    pub user_name: String,
    pub broadcaster_user_id: String,
    pub broadcaster_user_login: String,
    pub broadcaster_user_name: String,
    pub tier: String,
    pub is_gift: bool,
}

/// Bits cheered on a channel. User fields are absent for anonymous cheers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelCheerEvent {
    pub is_anonymous: bool,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub user_login: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    pub broadcaster_user_id: String,
    pub broadcaster_user_login: String,
    pub broadcaster_user_name: String,
    #[serde(default)]
    pub message: String,
    pub bits: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRaidEvent {
    pub from_broadcaster_user_id: String,
    pub from_broadcaster_user_login: String,
    pub from_broadcaster_user_name: String,
    pub to_broadcaster_user_id: String,
    pub to_broadcaster_user_login: String,
    pub to_broadcaster_user_name: String,
    pub viewers: u64,
}

/// Ban or timeout. `ends_at` is null for permanent bans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelBanEvent {
    pub user_id: String,
    pub user_login: String,
    pub user_name: String,
    pub broadcaster_user_id: String,
    pub broadcaster_user_login: String,
    pub broadcaster_user_name: String,
    pub moderator_user_id: String,
    pub moderator_user_login: String,
    pub moderator_user_name: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    pub is_permanent: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelUnbanEvent {
    pub user_id: String,
    pub user_login: String,
    pub user_name: String,
    pub broadcaster_user_id: String,
    pub broadcaster_user_login: String,
    pub broadcaster_user_name: String,
    pub moderator_user_id: String,
    pub moderator_user_login: String,
    pub moderator_user_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardLimit {
    pub is_enabled: bool,
    pub value: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardCooldown {
    pub is_enabled: bool,
    pub seconds: u64,
}

/// Custom channel points reward. Shared by the add, update, and remove kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomRewardEvent {
    pub id: String,
    pub broadcaster_user_id: String,
    pub broadcaster_user_login: String,
    pub broadcaster_user_name: String,
    pub is_enabled: bool,
    pub is_paused: bool,
    pub is_in_stock: bool,
    pub title: String,
    pub cost: u64,
    #[serde(default)]
    pub prompt: String,
    pub is_user_input_required: bool,
    pub should_redemptions_skip_request_queue: bool,
    #[serde(default)]
    pub cooldown_expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub redemptions_redeemed_current_stream: Option<u64>,
    #[serde(default)]
    pub max_per_stream: RewardLimit,
    #[serde(default)]
    pub max_per_user_per_stream: RewardLimit,
    #[serde(default)]
    pub global_cooldown: RewardCooldown,
    #[serde(default)]
    pub background_color: String,
    #[serde(default)]
    pub image: Option<HashMap<String, String>>,
    #[serde(default)]
    pub default_image: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedeemedReward {
    pub id: String,
    pub title: String,
    pub cost: u64,
    #[serde(default)]
    pub prompt: String,
}

/// Redemption of a custom reward. Shared by the add and update kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardRedemptionEvent {
    pub id: String,
    pub broadcaster_user_id: String,
    pub broadcaster_user_login: String,
    pub broadcaster_user_name: String,
    pub user_id: String,
    pub user_login: String,
    pub user_name: String,
    #[serde(default)]
    pub user_input: String,
    pub status: String,
    pub reward: RedeemedReward,
    pub redeemed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HypeTrainContribution {
    pub user_id: String,
    pub user_login: String,
    pub user_name: String,
    #[serde(rename = "type")]
    pub contribution_type: String,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HypeTrainBeginEvent {
    pub broadcaster_user_id: String,
    pub broadcaster_user_login: String,
    pub broadcaster_user_name: String,
    pub total: u64,
    pub progress: u64,
    pub goal: u64,
    #[serde(default)]
    pub top_contributions: Vec<HypeTrainContribution>,
    pub last_contribution: HypeTrainContribution,
    pub started_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HypeTrainProgressEvent {
    pub broadcaster_user_id: String,
    pub broadcaster_user_login: String,
    pub broadcaster_user_name: String,
    pub level: u32,
    pub total: u64,
    pub progress: u64,
    pub goal: u64,
    #[serde(default)]
    pub top_contributions: Vec<HypeTrainContribution>,
    pub last_contribution: HypeTrainContribution,
    pub started_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HypeTrainEndEvent {
    pub broadcaster_user_id: String,
    pub broadcaster_user_login: String,
    pub broadcaster_user_name: String,
    pub level: u32,
    pub total: u64,
    #[serde(default)]
    pub top_contributions: Vec<HypeTrainContribution>,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub cooldown_ends_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamOnlineEvent {
    pub id: String,
    pub broadcaster_user_id: String,
    pub broadcaster_user_login: String,
    pub broadcaster_user_name: String,
    #[serde(rename = "type")]
    pub stream_type: String,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamOfflineEvent {
    pub broadcaster_user_id: String,
    pub broadcaster_user_login: String,
    pub broadcaster_user_name: String,
}

/// Sent when a user revokes this application's access.
///
/// Login and name are null when the user account has been deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAuthorizationRevokeEvent {
    pub client_id: String,
    pub user_id: String,
    #[serde(default)]
    pub user_login: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
}

/// `email` is only present when the token has the email scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUpdateEvent {
    pub user_id: String,
    pub user_login: String,
    pub user_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub description: String,
}

// ════════════════════════════════════════════════════════════════════
// Tagged union
// ════════════════════════════════════════════════════════════════════

/// A decoded event payload, exactly one variant per `EventKind`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypedEvent {
    ChannelUpdate(ChannelUpdateEvent),
    ChannelFollow(ChannelFollowEvent),
    ChannelSubscribe(ChannelSubscribeEvent),
    ChannelCheer(ChannelCheerEvent),
    ChannelRaid(ChannelRaidEvent),
    ChannelBan(ChannelBanEvent),
    ChannelUnban(ChannelUnbanEvent),
    CustomRewardAdd(CustomRewardEvent),
    CustomRewardUpdate(CustomRewardEvent),
    CustomRewardRemove(CustomRewardEvent),
    RedemptionAdd(RewardRedemptionEvent),
    RedemptionUpdate(RewardRedemptionEvent),
    HypeTrainBegin(HypeTrainBeginEvent),
    HypeTrainProgress(HypeTrainProgressEvent),
    HypeTrainEnd(HypeTrainEndEvent),
    StreamOnline(StreamOnlineEvent),
    StreamOffline(StreamOfflineEvent),
    UserAuthorizationRevoke(UserAuthorizationRevokeEvent),
    UserUpdate(UserUpdateEvent),
}

impl TypedEvent {
    /// Returns the discriminant tag of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            TypedEvent::ChannelUpdate(_) => EventKind::ChannelUpdate,
            TypedEvent::ChannelFollow(_) => EventKind::ChannelFollow,
            TypedEvent::ChannelSubscribe(_) => EventKind::ChannelSubscribe,
            TypedEvent::ChannelCheer(_) => EventKind::ChannelCheer,
            TypedEvent::ChannelRaid(_) => EventKind::ChannelRaid,
            TypedEvent::ChannelBan(_) => EventKind::ChannelBan,
            TypedEvent::ChannelUnban(_) => EventKind::ChannelUnban,
            TypedEvent::CustomRewardAdd(_) => EventKind::CustomRewardAdd,
            TypedEvent::CustomRewardUpdate(_) => EventKind::CustomRewardUpdate,
            TypedEvent::CustomRewardRemove(_) => EventKind::CustomRewardRemove,
            TypedEvent::RedemptionAdd(_) => EventKind::RedemptionAdd,
            TypedEvent::RedemptionUpdate(_) => EventKind::RedemptionUpdate,
            TypedEvent::HypeTrainBegin(_) => EventKind::HypeTrainBegin,
            TypedEvent::HypeTrainProgress(_) => EventKind::HypeTrainProgress,
            TypedEvent::HypeTrainEnd(_) => EventKind::HypeTrainEnd,
            TypedEvent::StreamOnline(_) => EventKind::StreamOnline,
            TypedEvent::StreamOffline(_) => EventKind::StreamOffline,
            TypedEvent::UserAuthorizationRevoke(_) => EventKind::UserAuthorizationRevoke,
            TypedEvent::UserUpdate(_) => EventKind::UserUpdate,
        }
    }
}

/// Payload types that can be borrowed out of a `TypedEvent`.
///
/// Used by typed handler registration. Payloads shared by several kinds
/// list all of them in `KINDS`.
pub trait CatalogEvent: Send + Sync + 'static {
    const KINDS: &'static [EventKind];

    fn from_typed(event: &TypedEvent) -> Option<&Self>;
}

macro_rules! catalog_event {
    ($payload:ty => $($variant:ident),+) => {
        impl CatalogEvent for $payload {
            const KINDS: &'static [EventKind] = &[$(EventKind::$variant),+];

            fn from_typed(event: &TypedEvent) -> Option<&Self> {
                match event {
                    $(TypedEvent::$variant(inner) => Some(inner),)+
                    #[allow(unreachable_patterns)]
                    _ => None,
                }
            }
        }
    };
}

catalog_event!(ChannelUpdateEvent => ChannelUpdate);
catalog_event!(ChannelFollowEvent => ChannelFollow);
catalog_event!(ChannelSubscribeEvent => ChannelSubscribe);
catalog_event!(ChannelCheerEvent => ChannelCheer);
catalog_event!(ChannelRaidEvent => ChannelRaid);
catalog_event!(ChannelBanEvent => ChannelBan);
catalog_event!(ChannelUnbanEvent => ChannelUnban);
catalog_event!(CustomRewardEvent => CustomRewardAdd, CustomRewardUpdate, CustomRewardRemove);
catalog_event!(RewardRedemptionEvent => RedemptionAdd, RedemptionUpdate);
catalog_event!(HypeTrainBeginEvent => HypeTrainBegin);
catalog_event!(HypeTrainProgressEvent => HypeTrainProgress);
catalog_event!(HypeTrainEndEvent => HypeTrainEnd);
catalog_event!(StreamOnlineEvent => StreamOnline);
catalog_event!(StreamOfflineEvent => StreamOffline);
catalog_event!(UserAuthorizationRevokeEvent => UserAuthorizationRevoke);
catalog_event!(UserUpdateEvent => UserUpdate);
