use log::*;
use tokio::sync::broadcast::{self, error::RecvError};

use crate::{
    db_types::{Role, UserId},
    live_channel::{LiveChannel, LiveChannelError, LiveEnvelope, LivePayload, LiveTarget, Topic},
};

/// An in-process live channel built on a tokio broadcast channel.
///
/// Every session holds a [`LiveSubscription`] on the same channel and picks out the envelopes meant for it. A
/// session that falls more than `capacity` envelopes behind skips the ones it missed.
#[derive(Debug, Clone)]
pub struct BroadcastLiveChannel {
    sender: broadcast::Sender<LiveEnvelope>,
}

impl BroadcastLiveChannel {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Opens a live session for `user`.
    pub fn subscribe(&self, user: UserId, role: Role) -> LiveSubscription {
        debug!("📡️ Live session opened for {user} ({role})");
        LiveSubscription { receiver: self.sender.subscribe(), user, role }
    }

    pub fn session_count(&self) -> usize {
        self.sender.receiver_count()
    }

    fn send(&self, envelope: LiveEnvelope) -> Result<(), LiveChannelError> {
        match self.sender.send(envelope) {
            Ok(n) => {
                trace!("📡️ Push handed to {n} live sessions");
                Ok(())
            },
            Err(_) => Err(LiveChannelError::NoSubscribers),
        }
    }
}

impl LiveChannel for BroadcastLiveChannel {
    async fn send_to_user(&self, user: &UserId, payload: LivePayload) -> Result<(), LiveChannelError> {
        self.send(LiveEnvelope { target: LiveTarget::User(user.clone()), payload })
    }

    async fn broadcast(&self, topic: Topic, payload: LivePayload) -> Result<(), LiveChannelError> {
        self.send(LiveEnvelope { target: LiveTarget::Topic(topic), payload })
    }
}

/// One connected session's view of the live channel.
pub struct LiveSubscription {
    receiver: broadcast::Receiver<LiveEnvelope>,
    user: UserId,
    role: Role,
}

impl LiveSubscription {
    pub fn user(&self) -> &UserId {
        &self.user
    }

    /// Waits for the next push addressed to this session. Returns `None` once the channel has shut down.
    pub async fn next(&mut self) -> Option<LivePayload> {
        loop {
            match self.receiver.recv().await {
                Ok(envelope) if envelope.is_visible_to(&self.user, self.role) => return Some(envelope.payload),
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    warn!("📡️ Live session for {} fell behind and skipped {skipped} pushes", self.user);
                    continue;
                },
                Err(RecvError::Closed) => {
                    debug!("📡️ Live channel closed. Ending session for {}", self.user);
                    return None;
                },
            }
        }
    }
}

#[cfg(test)]
mod test {
    use chrono::Utc;

    use super::*;
    use crate::db_types::NotificationType;

    fn payload(title: &str) -> LivePayload {
        LivePayload {
            notification_type: NotificationType::Order,
            reference_id: None,
            title: title.into(),
            message: String::new(),
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn sessions_only_see_their_own_pushes() {
        let channel = BroadcastLiveChannel::new(16);
        let mut alice = channel.subscribe(UserId::from("alice"), Role::Customer);
        let mut admin = channel.subscribe(UserId::from("root"), Role::Admin);
        channel.send_to_user(&UserId::from("bob"), payload("for bob")).await.unwrap();
        channel.broadcast(Topic::AdminNotifications, payload("for admins")).await.unwrap();
        channel.send_to_user(&UserId::from("alice"), payload("for alice")).await.unwrap();
        channel.broadcast(Topic::Everyone, payload("for everyone")).await.unwrap();

        assert_eq!(alice.next().await.unwrap().title, "for alice");
        assert_eq!(alice.next().await.unwrap().title, "for everyone");
        assert_eq!(admin.next().await.unwrap().title, "for admins");
        assert_eq!(admin.next().await.unwrap().title, "for everyone");
    }

    #[tokio::test]
    async fn sending_without_sessions_reports_no_subscribers() {
        let channel = BroadcastLiveChannel::new(4);
        let err = channel.broadcast(Topic::Everyone, payload("hello?")).await.unwrap_err();
        assert!(matches!(err, LiveChannelError::NoSubscribers));
        assert_eq!(channel.session_count(), 0);
    }

    #[tokio::test]
    async fn lagging_session_skips_ahead() {
        let channel = BroadcastLiveChannel::new(2);
        let mut alice = channel.subscribe(UserId::from("alice"), Role::Customer);
        for i in 0..5 {
            channel.send_to_user(&UserId::from("alice"), payload(&format!("push {i}"))).await.unwrap();
        }
        // Only the most recent pushes survive in a channel of capacity 2
        assert_eq!(alice.next().await.unwrap().title, "push 3");
        assert_eq!(alice.next().await.unwrap().title, "push 4");
    }
}
