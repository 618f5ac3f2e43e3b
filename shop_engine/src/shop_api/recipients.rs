//! Who receives what.
//!
//! Every [`NotificationType`] maps to exactly one [`RecipientPolicy`], and every user is put through the same
//! [`admit`] check before anything is written for them, whether the notification is addressed to one user or fanned
//! out to many.
use log::*;
use serde::{Deserialize, Serialize};

use crate::{
    db_types::{NotificationType, Role, User},
    traits::{UserDirectory, UserDirectoryError},
};

/// The recipient population of a notification type when it is sent to many users at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecipientPolicy {
    /// Users who opted in to marketing. Admins are never included.
    MarketingConsented,
    /// Every active user, admins included.
    AllActive,
    /// Every admin, whether active or not.
    AdminsOnly,
    /// Every active user apart from admins.
    AllActiveExceptAdmins,
}

impl RecipientPolicy {
    pub fn for_type(notification_type: NotificationType) -> Self {
        use NotificationType::*;
        match notification_type {
            Marketing | Advertisement => Self::MarketingConsented,
            Order | Qna | Review => Self::AllActive,
            AdminOrder | AdminQna | AdminReview => Self::AdminsOnly,
            Notice | QnaReply | ReviewReply => Self::AllActiveExceptAdmins,
        }
    }
}

/// Why a notification was not produced for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SuppressionReason {
    /// The user caused the event themselves.
    SelfNotification,
    /// Admin accounts only take order, QnA and review traffic.
    AdminFiltered,
    /// Promotional content for a user who has not opted in.
    NoMarketingConsent,
}

/// The role and consent rules every notification must pass before it is written for `user`.
///
/// Admins accept `ORDER`, `QNA`, `REVIEW` and the `ADMIN_*` family. Everything else addressed to an admin is dropped.
/// Customers drop `MARKETING` and `ADVERTISEMENT` unless they have consented to marketing.
pub fn admit(user: &User, notification_type: NotificationType) -> Result<(), SuppressionReason> {
    use NotificationType::*;
    match user.role {
        Role::Admin => match notification_type {
            Order | Qna | Review | AdminOrder | AdminQna | AdminReview => Ok(()),
            _ => Err(SuppressionReason::AdminFiltered),
        },
        Role::Customer if notification_type.is_promotional() && !user.marketing_consent => {
            Err(SuppressionReason::NoMarketingConsent)
        },
        Role::Customer => Ok(()),
    }
}

/// Resolves notification types to the set of users that should receive them.
pub struct RecipientResolver<'a, U> {
    directory: &'a U,
}

impl<'a, U> RecipientResolver<'a, U>
where U: UserDirectory
{
    pub fn new(directory: &'a U) -> Self {
        Self { directory }
    }

    pub async fn resolve(&self, notification_type: NotificationType) -> Result<Vec<User>, UserDirectoryError> {
        let policy = RecipientPolicy::for_type(notification_type);
        let users = match policy {
            RecipientPolicy::MarketingConsented => self.directory.list_consented_to_marketing().await?,
            RecipientPolicy::AllActive => self.directory.list_active().await?,
            RecipientPolicy::AdminsOnly => self.directory.list_by_role(Role::Admin).await?,
            RecipientPolicy::AllActiveExceptAdmins => self.directory.list_active_excluding_role(Role::Admin).await?,
        };
        trace!("🔔️ {notification_type} resolves to {} users under {policy:?}", users.len());
        Ok(users)
    }
}
