use thiserror::Error;

use crate::{
    db::traits::{NotificationError, UserDirectoryError},
    db_types::{Order, OrderAction, OrderId, OrderNumber, OrderRecord, OrderStatusType, ProductId, UserId},
};

#[derive(Debug, Clone, Error)]
pub enum OrderFlowError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("There is no order with number {0}")]
    OrderNumberNotFound(OrderNumber),
    #[error("Product {0} does not exist")]
    ProductNotFound(ProductId),
    #[error("User {0} does not exist")]
    UserNotFound(UserId),
    #[error("Product {product_id} is out of stock. {requested} requested, but only {available} available")]
    OutOfStock { product_id: ProductId, requested: i64, available: i64 },
    #[error("Cannot {action} order {order_id} because it is {status}")]
    InvalidTransition { order_id: OrderId, status: OrderStatusType, action: OrderAction },
    #[error("An order must contain at least one line item")]
    EmptyOrder,
    #[error("Quantity for product {product_id} must be at least 1, but was {quantity}")]
    InvalidQuantity { product_id: ProductId, quantity: i64 },
    #[error("The order total is too large to be represented")]
    PriceOverflow,
    #[error("The buyer notification could not be stored. {0}")]
    Notification(#[from] NotificationError),
}

impl From<sqlx::Error> for OrderFlowError {
    fn from(e: sqlx::Error) -> Self {
        OrderFlowError::DatabaseError(e.to_string())
    }
}

impl From<UserDirectoryError> for OrderFlowError {
    fn from(e: UserDirectoryError) -> Self {
        match e {
            UserDirectoryError::DatabaseError(s) => OrderFlowError::DatabaseError(s),
            UserDirectoryError::UserNotFound(id) => OrderFlowError::UserNotFound(id),
        }
    }
}

/// The `OrderManagement` trait defines the behaviour for storing orders and moving them through their lifecycle.
///
/// Implementations must guarantee that stock changes and order writes happen in the same atomic unit, so that a
/// failure half-way through a checkout or a cancellation leaves no trace.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    /// Fetches the order, including its line items.
    async fn fetch_order(&self, id: OrderId) -> Result<Option<Order>, OrderFlowError>;

    /// Fetches the order with the given external order number, including its line items.
    async fn fetch_order_by_number(&self, number: &OrderNumber) -> Result<Option<Order>, OrderFlowError>;

    /// All orders placed by `user`, newest first. Hidden orders are only included if `include_hidden` is true.
    async fn fetch_orders_for_user(&self, user: &UserId, include_hidden: bool) -> Result<Vec<Order>, OrderFlowError>;

    /// Every order in the system, newest first, hidden ones included.
    async fn fetch_all_orders(&self) -> Result<Vec<Order>, OrderFlowError>;

    /// Orders whose buyer id, buyer username or any product name on the order contains `keyword`, newest first.
    /// Hidden orders are included.
    async fn search_orders(&self, keyword: &str) -> Result<Vec<Order>, OrderFlowError>;

    /// In a single atomic transaction,
    /// * decrements stock for every line item, failing with [`OrderFlowError::OutOfStock`] if any product cannot
    ///   cover the requested quantity,
    /// * writes the order in the status dictated by its payment method,
    /// * writes the line items.
    ///
    /// If any step fails, nothing is written and no stock is consumed.
    async fn insert_order(&self, order: OrderRecord) -> Result<Order, OrderFlowError>;

    /// Applies `action` to the order if its current status allows it.
    ///
    /// The status check and the update are a single conditional statement, so two concurrent callers can never both
    /// succeed. Cancelling also returns every line item's quantity to stock in the same transaction. Paying stamps
    /// the `paid_at` timestamp.
    async fn transition_order(&self, id: OrderId, action: OrderAction) -> Result<Order, OrderFlowError>;

    /// Sets the hidden flag on the order. This is idempotent and never touches the status.
    async fn set_order_hidden(&self, id: OrderId, hidden: bool) -> Result<Order, OrderFlowError>;
}
