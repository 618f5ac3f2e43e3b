use serde::{Deserialize, Serialize};

use crate::db_types::{Order, OrderAction, OrderStatusType};

/// Emitted once an order and its stock reservation have been committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCreatedEvent {
    pub order: Order,
}

impl OrderCreatedEvent {
    pub fn new(order: Order) -> Self {
        Self { order }
    }
}

/// Emitted after a lifecycle action (pay, ship, deliver, cancel) has been applied to an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatusChangedEvent {
    pub order: Order,
    pub action: OrderAction,
}

impl OrderStatusChangedEvent {
    pub fn new(order: Order, action: OrderAction) -> Self {
        Self { order, action }
    }

    pub fn new_status(&self) -> OrderStatusType {
        self.order.status
    }
}
