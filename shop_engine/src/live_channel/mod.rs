//! # Live channel
//!
//! Best-effort, near-real-time delivery of notifications to connected sessions. Delivery is fire-and-forget:
//! nothing is retried, and a session that misses a push recovers by polling its inbox. The durable copy of every
//! notification lives in the notification store, never here.
//!
//! Pushes are addressed either to a single user identity or to a shared [`Topic`].
mod broadcast;

use std::fmt::Display;

pub use broadcast::{BroadcastLiveChannel, LiveSubscription};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db_types::{Notification, NotificationType, Role, UserId};

#[derive(Debug, Clone, Error)]
pub enum LiveChannelError {
    #[error("Nobody is listening on the live channel")]
    NoSubscribers,
    #[error("Live push failed: {0}")]
    DispatchDegraded(String),
}

/// A shared broadcast destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topic {
    /// Every connected session.
    Everyone,
    /// Sessions of admin users only.
    AdminNotifications,
}

impl Topic {
    pub fn path(&self) -> &'static str {
        match self {
            Topic::Everyone => "/topic/notifications",
            Topic::AdminNotifications => "/topic/admin-notifications",
        }
    }

    /// Whether a session with the given role may listen on this topic.
    pub fn admits(&self, role: Role) -> bool {
        match self {
            Topic::Everyone => true,
            Topic::AdminNotifications => role == Role::Admin,
        }
    }
}

impl Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// What a connected client receives for every push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LivePayload {
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub reference_id: Option<i64>,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl From<&Notification> for LivePayload {
    fn from(n: &Notification) -> Self {
        Self {
            notification_type: n.notification_type,
            reference_id: n.reference_id,
            title: n.title.clone(),
            message: n.body.clone(),
            timestamp: n.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveTarget {
    User(UserId),
    Topic(Topic),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveEnvelope {
    pub target: LiveTarget,
    pub payload: LivePayload,
}

impl LiveEnvelope {
    /// Whether a session belonging to `user`, who has the given role, should see this push.
    pub fn is_visible_to(&self, user: &UserId, role: Role) -> bool {
        match &self.target {
            LiveTarget::User(recipient) => recipient == user,
            LiveTarget::Topic(topic) => topic.admits(role),
        }
    }
}

/// The transport seam for live pushes.
#[allow(async_fn_in_trait)]
pub trait LiveChannel {
    async fn send_to_user(&self, user: &UserId, payload: LivePayload) -> Result<(), LiveChannelError>;

    async fn broadcast(&self, topic: Topic, payload: LivePayload) -> Result<(), LiveChannelError>;
}
