use serde::{Deserialize, Serialize};

use crate::{
    db_types::{NewNotification, Notification, NotificationType, ProductId, UserId},
    shop_api::recipients::SuppressionReason,
};

/// A notification addressed to a single user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    /// The user whose action caused the notification. `None` for system events.
    pub actor: Option<UserId>,
    pub recipient: UserId,
    pub notification_type: NotificationType,
    pub title: String,
    pub body: String,
    pub reference_id: Option<i64>,
    pub product_id: Option<ProductId>,
}

impl NotificationRequest {
    pub fn new<T: Into<String>, S: Into<String>>(
        recipient: UserId,
        notification_type: NotificationType,
        title: T,
        body: S,
    ) -> Self {
        Self {
            actor: None,
            recipient,
            notification_type,
            title: title.into(),
            body: body.into(),
            reference_id: None,
            product_id: None,
        }
    }

    pub fn from_actor(mut self, actor: UserId) -> Self {
        self.actor = Some(actor);
        self
    }

    pub fn with_reference(mut self, reference_id: i64) -> Self {
        self.reference_id = Some(reference_id);
        self
    }

    pub fn with_product(mut self, product_id: ProductId) -> Self {
        self.product_id = Some(product_id);
        self
    }

    pub fn is_self_notification(&self) -> bool {
        self.actor.as_ref() == Some(&self.recipient)
    }

    pub(crate) fn into_new_notification(self) -> NewNotification {
        NewNotification::new(self.recipient, self.notification_type, self.title, self.body)
            .with_reference(self.reference_id)
            .with_product(self.product_id)
    }
}

/// A notification fanned out to everyone the routing table selects for its type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkNotification {
    pub notification_type: NotificationType,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub reference_id: Option<i64>,
}

impl BulkNotification {
    pub fn new<T: Into<String>, S: Into<String>>(notification_type: NotificationType, title: T, body: S) -> Self {
        Self { notification_type, title: title.into(), body: body.into(), reference_id: None }
    }

    pub fn with_reference(mut self, reference_id: i64) -> Self {
        self.reference_id = Some(reference_id);
        self
    }
}

/// The result of dispatching a single notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The notification was written. It may or may not have reached a live session.
    Delivered(Notification),
    /// Nothing was written.
    Suppressed(SuppressionReason),
}

impl DispatchOutcome {
    pub fn notification(&self) -> Option<&Notification> {
        match self {
            Self::Delivered(n) => Some(n),
            Self::Suppressed(_) => None,
        }
    }

    pub fn is_suppressed(&self) -> bool {
        matches!(self, Self::Suppressed(_))
    }
}
