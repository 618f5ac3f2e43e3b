use std::fmt::Display;

use serde::{Deserialize, Serialize};
use shop_engine::db_types::{NewLineItem, NewOrder, PaymentMethod, ShippingInfo, UserId};

/// The body of a checkout request. The buyer is always the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub items: Vec<NewLineItem>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    pub shipping: ShippingInfo,
}

impl CreateOrderRequest {
    pub fn into_new_order(self, buyer: UserId) -> NewOrder {
        NewOrder::new(buyer, self.items, self.payment_method).with_shipping(self.shipping)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

/// Query string for the admin order list. When `q` is present, only orders matching it are returned.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderSearch {
    #[serde(default)]
    pub q: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UnreadCount {
    pub count: i64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BulkSendResult {
    pub sent: usize,
}
