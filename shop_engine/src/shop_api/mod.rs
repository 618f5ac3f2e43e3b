//! # Shop engine public API
//!
//! The `shop_api` module exposes the programmatic API of the shop engine. Every API is generic over the storage
//! traits in [`crate::traits`] and, where it pushes to connected sessions, over a [`crate::live_channel::LiveChannel`].
//!
//! * [`order_flow_api`] drives orders through their lifecycle: checkout, payment, shipping, delivery, cancellation and
//!   visibility. It keeps the inventory ledger in step and emits the checkout notifications.
//! * [`notification_api`] is the notification dispatcher. It applies the admission rules, persists notifications and
//!   then pushes them to the live channel on a best-effort basis. It also manages each user's inbox.
//! * [`recipients`] holds the routing table from notification type to recipient population.
//!
//! # API usage
//!
//! ```rust,ignore
//! use shop_engine::{events::EventProducers, BroadcastLiveChannel, OrderFlowApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url("sqlite://data/shop_store.db", 25).await?;
//! let live = BroadcastLiveChannel::new(256);
//! let api = OrderFlowApi::new(db, live, EventProducers::default());
//! let order = api.create_order(new_order).await?;
//! ```

pub mod notification_api;
pub mod notification_objects;
pub mod order_flow_api;
pub mod order_objects;
pub mod recipients;
