//! Shop Engine
//!
//! The shop engine is the core of the shop backend: it places orders, moves them through their lifecycle, keeps the
//! inventory ledger honest and tells the right people about it.
//!
//! The library is divided into these main sections:
//! 1. Database management and control ([`mod@db`]). SQLite is the supported backend. You should never need to access
//!    the database directly. Instead, use the public API provided by the engine. The exception is the data types used
//!    in the database. These are defined in the `db_types` module and are public. The storage contracts live in
//!    [`mod@traits`].
//! 2. The engine public API ([`mod@shop_api`]). This provides the order lifecycle and the notification dispatcher.
//! 3. The live channel ([`mod@live_channel`]), which pushes freshly stored notifications to connected sessions on a
//!    best-effort basis.
//!
//! The engine also provides a set of events that can be subscribed to. These events are emitted when an order is
//! created or changes status, and you can hook into them to perform custom actions.
mod db;

pub mod db_types;
pub mod events;
pub mod helpers;
pub mod live_channel;
pub mod shop_api;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use db::sqlite::{SqliteDatabase, SqliteDatabaseError};
pub use db::traits;
pub use live_channel::{BroadcastLiveChannel, LiveChannel, LiveChannelError};
pub use shop_api::{
    notification_api::NotificationApi,
    notification_objects,
    order_flow_api::OrderFlowApi,
    order_objects,
    recipients,
};
pub use traits::{NotificationError, OrderFlowError, UserDirectoryError};
