use std::fmt::Debug;

use chrono::Utc;
use log::*;

use crate::{
    db_types::{
        NewOrder,
        NotificationType,
        Order,
        OrderAction,
        OrderId,
        OrderNumber,
        OrderRecord,
        PricedLineItem,
        ProductId,
        UserId,
    },
    events::{EventProducers, OrderCreatedEvent, OrderStatusChangedEvent},
    helpers::{new_order_number, summarize_items},
    live_channel::LiveChannel,
    shop_api::{
        notification_api::NotificationApi,
        notification_objects::{BulkNotification, NotificationRequest},
        order_objects::TrackingInfo,
    },
    traits::{OrderFlowError, ShopDatabase},
};

pub const ORDER_COMPLETED_TITLE: &str = "Order completed";
pub const NEW_ORDER_TITLE: &str = "New order registered";

/// `OrderFlowApi` drives orders through their lifecycle.
///
/// It owns the checkout flow (validation, price snapshot, stock reservation and the checkout notifications), the
/// status transitions and the visibility toggles. Every successful change is published to the event hooks.
pub struct OrderFlowApi<B, L> {
    db: B,
    notifier: NotificationApi<B, L>,
    producers: EventProducers,
}

impl<B, L> Debug for OrderFlowApi<B, L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B: Clone, L> OrderFlowApi<B, L> {
    pub fn new(db: B, live: L, producers: EventProducers) -> Self {
        let notifier = NotificationApi::new(db.clone(), live);
        Self { db, notifier, producers }
    }
}

impl<B, L> OrderFlowApi<B, L> {
    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn db_mut(&mut self) -> &mut B {
        &mut self.db
    }

    pub fn notifier(&self) -> &NotificationApi<B, L> {
        &self.notifier
    }
}

impl<B, L> OrderFlowApi<B, L>
where
    B: ShopDatabase,
    L: LiveChannel,
{
    /// Places a new order on behalf of `order.user_id`.
    ///
    /// Each line item's price and name are copied from the catalog as they are right now, and later catalog edits do
    /// not affect the order. Stock for every line is reserved in the same transaction that writes the order, so
    /// either everything is reserved and the order exists, or nothing happened.
    ///
    /// Once the order is committed, the buyer is sent an `ORDER` notification and the admins an `ADMIN_ORDER`
    /// notification. The buyer's notification must be stored, otherwise this call fails with
    /// [`OrderFlowError::Notification`] even though the order itself was placed. Problems with the admin
    /// notification are only logged.
    pub async fn create_order(&self, order: NewOrder) -> Result<Order, OrderFlowError> {
        if order.items.is_empty() {
            return Err(OrderFlowError::EmptyOrder);
        }
        if let Some(item) = order.items.iter().find(|i| i.quantity < 1) {
            return Err(OrderFlowError::InvalidQuantity { product_id: item.product_id, quantity: item.quantity });
        }
        let buyer = self
            .db
            .fetch_user(&order.user_id)
            .await?
            .ok_or_else(|| OrderFlowError::UserNotFound(order.user_id.clone()))?;
        let mut items = Vec::with_capacity(order.items.len());
        for item in &order.items {
            let product =
                self.db.fetch_product(item.product_id).await?.ok_or(OrderFlowError::ProductNotFound(item.product_id))?;
            items.push(PricedLineItem {
                product_id: product.id,
                product_name: product.name,
                unit_price: product.price,
                quantity: item.quantity,
            });
        }
        let record = OrderRecord {
            order_number: new_order_number(),
            user_id: order.user_id,
            payment_method: order.payment_method,
            shipping: order.shipping,
            items,
            created_at: Utc::now(),
        };
        let order = self.db.insert_order(record).await?;
        info!(
            "📦️ Order {} [{}] placed by {} for {} ({})",
            order.id, order.order_number, buyer.user_id, order.total_price, order.status
        );

        let names = order.items.iter().map(|i| i.product_name.as_str()).collect::<Vec<&str>>();
        let summary = summarize_items(&names);
        let buyer_note = NotificationRequest::new(
            order.user_id.clone(),
            NotificationType::Order,
            ORDER_COMPLETED_TITLE,
            format!("Your order {} for {summary} has been placed.", order.order_number),
        )
        .with_reference(order.id.0);
        self.notifier.notify_one(buyer_note).await.map_err(|e| {
            error!("📦️ Order {} was placed, but the buyer could not be notified. {e}", order.id);
            OrderFlowError::Notification(e)
        })?;

        let admin_note = BulkNotification::new(
            NotificationType::AdminOrder,
            NEW_ORDER_TITLE,
            format!("{} ordered {summary} ({}).", buyer.username, order.total_price),
        )
        .with_reference(order.id.0);
        if let Err(e) = self.notifier.notify_many(admin_note).await {
            warn!("📦️ The admins could not be told about order {}. {e}", order.id);
        }

        self.call_order_created_hook(&order).await;
        Ok(order)
    }

    /// Confirms payment for a bank transfer order. Only valid while the order is awaiting payment.
    pub async fn pay(&self, id: OrderId) -> Result<Order, OrderFlowError> {
        self.transition(id, OrderAction::Pay).await
    }

    /// Hands a paid order over to the courier.
    pub async fn ship(&self, id: OrderId) -> Result<Order, OrderFlowError> {
        self.transition(id, OrderAction::Ship).await
    }

    pub async fn deliver(&self, id: OrderId) -> Result<Order, OrderFlowError> {
        self.transition(id, OrderAction::Deliver).await
    }

    /// Cancels an order that has not been delivered yet and returns the full quantity of every line item to stock.
    pub async fn cancel(&self, id: OrderId) -> Result<Order, OrderFlowError> {
        self.transition(id, OrderAction::Cancel).await
    }

    async fn transition(&self, id: OrderId, action: OrderAction) -> Result<Order, OrderFlowError> {
        let order = self.db.transition_order(id, action).await.map_err(|e| {
            debug!("📦️ Could not {action} order {id}. {e}");
            e
        })?;
        info!("📦️ Order {id} [{}]: {action} -> {}", order.order_number, order.status);
        self.call_status_changed_hook(&order, action).await;
        Ok(order)
    }

    /// Hides the order from its owner's order list. Hiding an already hidden order is fine.
    pub async fn hide(&self, id: OrderId) -> Result<Order, OrderFlowError> {
        let order = self.db.set_order_hidden(id, true).await?;
        debug!("📦️ Order {id} is hidden");
        Ok(order)
    }

    pub async fn unhide(&self, id: OrderId) -> Result<Order, OrderFlowError> {
        let order = self.db.set_order_hidden(id, false).await?;
        debug!("📦️ Order {id} is visible");
        Ok(order)
    }

    pub async fn track(&self, id: OrderId) -> Result<TrackingInfo, OrderFlowError> {
        let order = self.fetch_order(id).await?;
        Ok(TrackingInfo::from(&order))
    }

    /// Fetches the order and its line items. Fails with [`OrderFlowError::OrderNotFound`] if it does not exist.
    pub async fn fetch_order(&self, id: OrderId) -> Result<Order, OrderFlowError> {
        self.db.fetch_order(id).await?.ok_or(OrderFlowError::OrderNotFound(id))
    }

    pub async fn fetch_by_number(&self, number: &OrderNumber) -> Result<Order, OrderFlowError> {
        self.db.fetch_order_by_number(number).await?.ok_or_else(|| OrderFlowError::OrderNumberNotFound(number.clone()))
    }

    /// The user's own order history, newest first. Hidden orders are left out.
    pub async fn orders_for_user(&self, user: &UserId) -> Result<Vec<Order>, OrderFlowError> {
        self.db.fetch_orders_for_user(user, false).await
    }

    /// Every order in the system, newest first, hidden orders included.
    pub async fn all_orders(&self) -> Result<Vec<Order>, OrderFlowError> {
        self.db.fetch_all_orders().await
    }

    /// The admin order search. See [`crate::traits::OrderManagement::search_orders`].
    pub async fn search_orders(&self, keyword: &str) -> Result<Vec<Order>, OrderFlowError> {
        self.db.search_orders(keyword).await
    }

    pub async fn stock_level(&self, product_id: ProductId) -> Result<i64, OrderFlowError> {
        self.db.stock_level(product_id).await
    }

    async fn call_order_created_hook(&self, order: &Order) {
        for emitter in &self.producers.order_created_producer {
            debug!("📬️ Notifying order created hook subscribers");
            emitter.publish_event(OrderCreatedEvent::new(order.clone())).await;
        }
    }

    async fn call_status_changed_hook(&self, order: &Order, action: OrderAction) {
        for emitter in &self.producers.status_changed_producer {
            debug!("📬️ Notifying status changed hook subscribers");
            emitter.publish_event(OrderStatusChangedEvent::new(order.clone(), action)).await;
        }
    }
}
