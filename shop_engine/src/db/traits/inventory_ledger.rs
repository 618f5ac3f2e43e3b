use crate::{db::traits::OrderFlowError, db_types::ProductId};

/// Per-product stock bookkeeping.
///
/// Decrements must be a single conditional update against the store, never a read followed by a write.
#[allow(async_fn_in_trait)]
pub trait InventoryLedger {
    /// Removes `quantity` units from stock and returns the remaining stock.
    /// Fails with [`OrderFlowError::OutOfStock`] without changing anything if there is not enough stock.
    async fn decrement_stock(&self, product_id: ProductId, quantity: i64) -> Result<i64, OrderFlowError>;

    /// Returns `quantity` units to stock and returns the new stock level.
    async fn increment_stock(&self, product_id: ProductId, quantity: i64) -> Result<i64, OrderFlowError>;

    async fn stock_level(&self, product_id: ProductId) -> Result<i64, OrderFlowError>;
}
