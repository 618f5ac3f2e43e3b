use crate::db::traits::{InventoryLedger, NotificationStore, OrderManagement, ProductCatalog, UserDirectory};

/// The highest level of behaviour for a storage backend of the shop engine: everything the order lifecycle and the
/// notification dispatcher need, behind one cloneable handle.
#[allow(async_fn_in_trait)]
pub trait ShopDatabase: Clone + OrderManagement + InventoryLedger + ProductCatalog + UserDirectory + NotificationStore {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Closes the backend's connections. Outstanding clones become unusable.
    async fn close(&mut self);
}
