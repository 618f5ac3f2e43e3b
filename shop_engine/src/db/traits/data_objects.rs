use serde::{Deserialize, Serialize};

use crate::db_types::UserId;

/// What was removed when a user account was purged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurgeSummary {
    pub user_id: UserId,
    pub orders_removed: u64,
    pub notifications_removed: u64,
}
