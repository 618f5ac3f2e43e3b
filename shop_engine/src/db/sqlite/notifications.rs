use chrono::Utc;
use log::{error, trace};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::{
    db::traits::NotificationError,
    db_types::{NewNotification, Notification, NotificationId, NotificationType, UserId},
};

/// Each row binds 7 values, which keeps a full chunk well under SQLite's bound-variable limit.
const INSERT_CHUNK_SIZE: usize = 100;

pub async fn insert_notification(
    notification: NewNotification,
    conn: &mut SqliteConnection,
) -> Result<Notification, sqlx::Error> {
    sqlx::query_as(
        r#"
            INSERT INTO notifications (
                recipient,
                title,
                body,
                notification_type,
                reference_id,
                product_id,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *;
        "#,
    )
    .bind(notification.recipient.as_str())
    .bind(notification.title)
    .bind(notification.body)
    .bind(notification.notification_type.as_str())
    .bind(notification.reference_id)
    .bind(notification.product_id)
    .bind(notification.created_at)
    .fetch_one(conn)
    .await
}

/// Writes the notifications in multi-row `INSERT` statements of up to [`INSERT_CHUNK_SIZE`] rows.
///
/// Every chunk stands on its own. A chunk that fails is logged and skipped, and the rows that did make it are
/// returned.
pub async fn insert_notifications(
    notifications: Vec<NewNotification>,
    conn: &mut SqliteConnection,
) -> Vec<Notification> {
    let mut written = Vec::with_capacity(notifications.len());
    for chunk in notifications.chunks(INSERT_CHUNK_SIZE) {
        let mut builder = QueryBuilder::<Sqlite>::new(
            "INSERT INTO notifications (recipient, title, body, notification_type, reference_id, product_id, \
             created_at) ",
        );
        builder.push_values(chunk, |mut row, n| {
            row.push_bind(n.recipient.as_str())
                .push_bind(n.title.as_str())
                .push_bind(n.body.as_str())
                .push_bind(n.notification_type.as_str())
                .push_bind(n.reference_id)
                .push_bind(n.product_id)
                .push_bind(n.created_at);
        });
        builder.push(" RETURNING *");
        match builder.build_query_as::<Notification>().fetch_all(&mut *conn).await {
            Ok(rows) => {
                trace!("🗃️ Stored a batch of {} notifications", rows.len());
                written.extend(rows);
            },
            Err(e) => {
                error!("🗃️ A batch of {} notifications could not be stored. {e}", chunk.len());
            },
        }
    }
    written
}

pub async fn fetch_notification(
    id: NotificationId,
    conn: &mut SqliteConnection,
) -> Result<Option<Notification>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM notifications WHERE id = $1").bind(id).fetch_optional(conn).await
}

pub async fn fetch_for_recipient(
    recipient: &UserId,
    conn: &mut SqliteConnection,
) -> Result<Vec<Notification>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM notifications WHERE recipient = $1 ORDER BY created_at DESC, id DESC")
        .bind(recipient.as_str())
        .fetch_all(conn)
        .await
}

pub async fn count_unread(recipient: &UserId, conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE recipient = $1 AND is_read = FALSE")
        .bind(recipient.as_str())
        .fetch_one(conn)
        .await
}

/// Marks the notification as read. The first read timestamp is kept if the notification was already read.
pub async fn mark_read(id: NotificationId, conn: &mut SqliteConnection) -> Result<Notification, NotificationError> {
    let notification: Option<Notification> = sqlx::query_as(
        "UPDATE notifications SET is_read = TRUE, read_at = COALESCE(read_at, $1) WHERE id = $2 RETURNING *",
    )
    .bind(Utc::now())
    .bind(id)
    .fetch_optional(conn)
    .await?;
    notification.ok_or(NotificationError::NotificationNotFound(id))
}

pub async fn mark_all_read(recipient: &UserId, conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
    let result =
        sqlx::query("UPDATE notifications SET is_read = TRUE, read_at = $1 WHERE recipient = $2 AND is_read = FALSE")
            .bind(Utc::now())
            .bind(recipient.as_str())
            .execute(conn)
            .await?;
    Ok(result.rows_affected())
}

pub async fn delete_notification(id: NotificationId, conn: &mut SqliteConnection) -> Result<(), NotificationError> {
    let result = sqlx::query("DELETE FROM notifications WHERE id = $1").bind(id).execute(conn).await?;
    if result.rows_affected() == 0 {
        return Err(NotificationError::NotificationNotFound(id));
    }
    Ok(())
}

pub async fn delete_for_recipient(recipient: &UserId, conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM notifications WHERE recipient = $1").bind(recipient.as_str()).execute(conn).await?;
    Ok(result.rows_affected())
}

pub async fn delete_by_type_and_reference(
    notification_type: NotificationType,
    reference_id: i64,
    conn: &mut SqliteConnection,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM notifications WHERE notification_type = $1 AND reference_id = $2")
        .bind(notification_type.as_str())
        .bind(reference_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}
