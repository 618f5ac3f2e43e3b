//! The notification dispatcher.
//!
//! Every dispatch is two steps with different failure contracts:
//! 1. The notification is written to the [`NotificationStore`]. A failure here is returned to the caller.
//! 2. The notification is pushed to the [`LiveChannel`]. A failure here is logged and otherwise ignored, since the
//!    recipient will find the notification in their inbox the next time they poll.
//!
//! The push always happens after the write has completed, never before.
use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Notification, NotificationId, NotificationType, UserId},
    live_channel::{LiveChannel, LiveChannelError, LivePayload, Topic},
    shop_api::{
        notification_objects::{BulkNotification, DispatchOutcome, NotificationRequest},
        recipients::{admit, RecipientPolicy, RecipientResolver, SuppressionReason},
    },
    traits::{NotificationError, NotificationStore, UserDirectory},
};

pub struct NotificationApi<B, L> {
    db: B,
    live: L,
}

impl<B, L> Debug for NotificationApi<B, L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NotificationApi")
    }
}

impl<B, L> NotificationApi<B, L> {
    pub fn new(db: B, live: L) -> Self {
        Self { db, live }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn live_channel(&self) -> &L {
        &self.live
    }
}

impl<B, L> NotificationApi<B, L>
where
    B: NotificationStore + UserDirectory,
    L: LiveChannel,
{
    /// Sends a notification to a single user.
    ///
    /// Nothing is written when the actor is the recipient, or when the recipient's role or marketing preferences
    /// exclude the notification type. In those cases the reason is returned as [`DispatchOutcome::Suppressed`].
    pub async fn notify_one(&self, request: NotificationRequest) -> Result<DispatchOutcome, NotificationError> {
        if request.is_self_notification() {
            trace!("🔔️ {} caused this {} themselves. Not notifying.", request.recipient, request.notification_type);
            return Ok(DispatchOutcome::Suppressed(SuppressionReason::SelfNotification));
        }
        let recipient = self
            .db
            .fetch_user(&request.recipient)
            .await?
            .ok_or_else(|| NotificationError::RecipientNotFound(request.recipient.clone()))?;
        if let Err(reason) = admit(&recipient, request.notification_type) {
            debug!("🔔️ {} notification for {} suppressed: {reason:?}", request.notification_type, recipient.user_id);
            return Ok(DispatchOutcome::Suppressed(reason));
        }
        let notification_type = request.notification_type;
        let notification = self.db.insert_notification(request.into_new_notification()).await.map_err(|e| {
            error!("🔔️ Could not store {notification_type} notification for {}. {e}", recipient.user_id);
            e
        })?;
        debug!("🔔️ Notification {} ({notification_type}) stored for {}", notification.id, notification.recipient);
        self.push_to_user(&notification).await;
        Ok(DispatchOutcome::Delivered(notification))
    }

    /// Sends a notification to everyone the routing table selects for its type.
    ///
    /// Rows are written in batches and a failing batch does not stop the others, so the result may be fewer rows
    /// than there are recipients. Returns the number of notifications written.
    pub async fn notify_many(&self, notification: BulkNotification) -> Result<usize, NotificationError> {
        let notification_type = notification.notification_type;
        let policy = RecipientPolicy::for_type(notification_type);
        let users = RecipientResolver::new(&self.db).resolve(notification_type).await?;
        let rows = users
            .iter()
            .filter(|user| admit(user, notification_type).is_ok())
            .map(|user| {
                let mut request = NotificationRequest::new(
                    user.user_id.clone(),
                    notification_type,
                    notification.title.as_str(),
                    notification.body.as_str(),
                );
                request.reference_id = notification.reference_id;
                request.into_new_notification()
            })
            .collect::<Vec<_>>();
        if rows.is_empty() {
            match policy {
                RecipientPolicy::AdminsOnly => warn!("🔔️ There are no admins to receive {notification_type} messages"),
                _ => debug!("🔔️ Nobody is eligible for {notification_type} messages"),
            }
            return Ok(0);
        }
        let expected = rows.len();
        let written = self.db.insert_notifications(rows).await.map_err(|e| {
            error!("🔔️ Could not store {notification_type} notifications. {e}");
            e
        })?;
        if written.len() < expected {
            warn!("🔔️ Only {} of {expected} {notification_type} notifications were stored", written.len());
        } else {
            debug!("🔔️ {expected} {notification_type} notifications stored");
        }
        match (policy, written.first()) {
            (_, None) => {},
            (RecipientPolicy::AllActive, Some(first)) => self.push_to_topic(Topic::Everyone, first).await,
            (RecipientPolicy::AdminsOnly, Some(first)) => self.push_to_topic(Topic::AdminNotifications, first).await,
            (_, Some(_)) => {
                for n in &written {
                    self.push_to_user(n).await;
                }
            },
        }
        Ok(written.len())
    }

    async fn push_to_user(&self, notification: &Notification) {
        let result = self.live.send_to_user(&notification.recipient, LivePayload::from(notification)).await;
        log_push_result(&notification.recipient.to_string(), result);
    }

    async fn push_to_topic(&self, topic: Topic, notification: &Notification) {
        let result = self.live.broadcast(topic, LivePayload::from(notification)).await;
        log_push_result(topic.path(), result);
    }

    /// Fetches a notification. Fails with [`NotificationError::NotificationNotFound`] if it does not exist.
    pub async fn fetch(&self, id: NotificationId) -> Result<Notification, NotificationError> {
        self.db.fetch_notification(id).await?.ok_or(NotificationError::NotificationNotFound(id))
    }

    /// The recipient's inbox, newest first.
    pub async fn list(&self, recipient: &UserId) -> Result<Vec<Notification>, NotificationError> {
        self.db.fetch_notifications_for(recipient).await
    }

    pub async fn unread_count(&self, recipient: &UserId) -> Result<i64, NotificationError> {
        self.db.count_unread(recipient).await
    }

    pub async fn mark_read(&self, id: NotificationId) -> Result<Notification, NotificationError> {
        self.db.mark_read(id).await
    }

    pub async fn mark_all_read(&self, recipient: &UserId) -> Result<u64, NotificationError> {
        let count = self.db.mark_all_read(recipient).await?;
        debug!("🔔️ {count} notifications marked as read for {recipient}");
        Ok(count)
    }

    pub async fn delete(&self, id: NotificationId) -> Result<(), NotificationError> {
        self.db.delete_notification(id).await
    }

    pub async fn delete_all_for(&self, recipient: &UserId) -> Result<u64, NotificationError> {
        let count = self.db.delete_notifications_for(recipient).await?;
        debug!("🔔️ {count} notifications deleted for {recipient}");
        Ok(count)
    }

    /// Removes every notification of `notification_type` that refers to `reference_id`, e.g. when the QnA thread or
    /// review it points at is deleted.
    ///
    /// This is a clean-up sweep. Failures are logged and reported as zero rows removed.
    pub async fn delete_by_type_and_reference(&self, notification_type: NotificationType, reference_id: i64) -> u64 {
        match self.db.delete_by_type_and_reference(notification_type, reference_id).await {
            Ok(count) => {
                debug!("🔔️ Swept {count} {notification_type} notifications referring to {reference_id}");
                count
            },
            Err(e) => {
                warn!("🔔️ Could not sweep {notification_type} notifications referring to {reference_id}. {e}");
                0
            },
        }
    }
}

fn log_push_result(destination: &str, result: Result<(), LiveChannelError>) {
    match result {
        Ok(()) => trace!("📡️ Live push sent to {destination}"),
        Err(LiveChannelError::NoSubscribers) => debug!("📡️ Nobody is connected to receive a push for {destination}"),
        Err(e) => warn!("📡️ Live push to {destination} failed. It is stored and can still be polled. {e}"),
    }
}
