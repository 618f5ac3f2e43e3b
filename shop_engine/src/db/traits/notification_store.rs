use thiserror::Error;

use crate::{
    db::traits::UserDirectoryError,
    db_types::{NewNotification, Notification, NotificationId, NotificationType, UserId},
};

#[derive(Debug, Clone, Error)]
pub enum NotificationError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Notification {0} does not exist")]
    NotificationNotFound(NotificationId),
    #[error("Recipient {0} does not exist")]
    RecipientNotFound(UserId),
}

impl From<sqlx::Error> for NotificationError {
    fn from(e: sqlx::Error) -> Self {
        NotificationError::DatabaseError(e.to_string())
    }
}

impl From<UserDirectoryError> for NotificationError {
    fn from(e: UserDirectoryError) -> Self {
        match e {
            UserDirectoryError::DatabaseError(s) => NotificationError::DatabaseError(s),
            UserDirectoryError::UserNotFound(id) => NotificationError::RecipientNotFound(id),
        }
    }
}

/// The durable notification inbox.
///
/// Content is immutable once written. Only the read flag and read timestamp ever change.
#[allow(async_fn_in_trait)]
pub trait NotificationStore {
    async fn insert_notification(&self, notification: NewNotification) -> Result<Notification, NotificationError>;

    /// Writes a batch of notifications. Batches are written in chunks, and a failing chunk does not prevent the
    /// others from being written. The notifications that were written are returned.
    async fn insert_notifications(
        &self,
        notifications: Vec<NewNotification>,
    ) -> Result<Vec<Notification>, NotificationError>;

    async fn fetch_notification(&self, id: NotificationId) -> Result<Option<Notification>, NotificationError>;

    /// All notifications for `recipient`, newest first.
    async fn fetch_notifications_for(&self, recipient: &UserId) -> Result<Vec<Notification>, NotificationError>;

    async fn count_unread(&self, recipient: &UserId) -> Result<i64, NotificationError>;

    /// Marks the notification as read. An already-read notification keeps its original read timestamp.
    async fn mark_read(&self, id: NotificationId) -> Result<Notification, NotificationError>;

    /// Marks every unread notification of `recipient` as read with one shared timestamp. Returns the number changed.
    async fn mark_all_read(&self, recipient: &UserId) -> Result<u64, NotificationError>;

    async fn delete_notification(&self, id: NotificationId) -> Result<(), NotificationError>;

    /// Deletes every notification of `recipient`. Returns the number removed.
    async fn delete_notifications_for(&self, recipient: &UserId) -> Result<u64, NotificationError>;

    /// Deletes every notification of the given type that points at `reference_id`. Returns the number removed.
    async fn delete_by_type_and_reference(
        &self,
        notification_type: NotificationType,
        reference_id: i64,
    ) -> Result<u64, NotificationError>;
}
