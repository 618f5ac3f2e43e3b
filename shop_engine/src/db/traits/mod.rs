//! # Storage contracts
//!
//! This module defines the interface contracts that storage *backends* must fulfil so that the shop engine can run on
//! top of them. The public APIs in [`crate::shop_api`] are generic over these traits, so backends can be swapped out
//! (or mocked) without touching the order and notification flows.
//!
//! * [`OrderManagement`] stores orders and their line items, and performs the atomic lifecycle transitions.
//! * [`InventoryLedger`] tracks per-product stock. Stock never goes negative.
//! * [`ProductCatalog`] is a read-only view of the product catalog.
//! * [`NotificationStore`] is the durable, queryable notification inbox of every user.
//! * [`UserDirectory`] answers "who should receive this?" and handles account deactivation and purging.
//! * [`ShopDatabase`] ties all of the above together for a single backend.
mod data_objects;
mod inventory_ledger;
mod notification_store;
mod order_management;
mod product_catalog;
mod shop_database;
mod user_directory;

pub use data_objects::PurgeSummary;
pub use inventory_ledger::InventoryLedger;
pub use notification_store::{NotificationError, NotificationStore};
pub use order_management::{OrderFlowError, OrderManagement};
pub use product_catalog::ProductCatalog;
pub use shop_database::ShopDatabase;
pub use user_directory::{UserDirectory, UserDirectoryError};
