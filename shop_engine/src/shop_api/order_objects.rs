use serde::{Deserialize, Serialize};

use crate::db_types::{Order, OrderId, OrderNumber, OrderStatusType};

/// What a customer sees when tracking an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingInfo {
    pub order_id: OrderId,
    pub order_number: OrderNumber,
    pub status: OrderStatusType,
    pub label: String,
}

impl From<&Order> for TrackingInfo {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.id,
            order_number: order.order_number.clone(),
            status: order.status,
            label: tracking_label(order.status).to_string(),
        }
    }
}

/// The customer-facing description of an order status.
pub fn tracking_label(status: OrderStatusType) -> &'static str {
    status.label()
}
