use thiserror::Error;

use crate::{
    db::traits::PurgeSummary,
    db_types::{Role, User, UserId},
};

#[derive(Debug, Clone, Error)]
pub enum UserDirectoryError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("User {0} does not exist")]
    UserNotFound(UserId),
}

impl From<sqlx::Error> for UserDirectoryError {
    fn from(e: sqlx::Error) -> Self {
        UserDirectoryError::DatabaseError(e.to_string())
    }
}

/// The `UserDirectory` trait is the engine's view of the user population. Recipient resolution is built on top of it.
#[allow(async_fn_in_trait)]
pub trait UserDirectory {
    async fn fetch_user_by_id(&self, id: i64) -> Result<Option<User>, UserDirectoryError>;

    /// Fetches the user by login identity.
    async fn fetch_user(&self, user_id: &UserId) -> Result<Option<User>, UserDirectoryError>;

    /// All users with the given role, active or not.
    async fn list_by_role(&self, role: Role) -> Result<Vec<User>, UserDirectoryError>;

    async fn list_active(&self) -> Result<Vec<User>, UserDirectoryError>;

    /// Active users whose role is anything but `role`.
    async fn list_active_excluding_role(&self, role: Role) -> Result<Vec<User>, UserDirectoryError>;

    /// Non-admin users who have opted in to marketing.
    async fn list_consented_to_marketing(&self) -> Result<Vec<User>, UserDirectoryError>;

    /// Soft delete. The user stops receiving broadcasts, but their orders and notifications are kept.
    async fn deactivate_user(&self, user_id: &UserId) -> Result<User, UserDirectoryError>;

    /// Hard delete. Removes the user's notifications, orders (with line items) and the user record itself in one
    /// transaction.
    async fn purge_user(&self, user_id: &UserId) -> Result<PurgeSummary, UserDirectoryError>;
}
