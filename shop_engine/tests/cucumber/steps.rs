use std::str::FromStr;

use cucumber::{then, when};
use shop_engine::{
    db_types::{NewLineItem, NewOrder, NotificationType, OrderStatusType, PaymentMethod, Price, UserId},
    notification_objects::{BulkNotification, NotificationRequest},
    traits::NotificationStore,
    OrderFlowError,
};

use crate::cucumber::ShopWorld;

/// Parses a basket description such as "2 Mug, 1 Tea".
fn basket(world: &ShopWorld, description: &str) -> Vec<NewLineItem> {
    description
        .split(',')
        .map(|line| {
            let (qty, name) = line.trim().split_once(' ').expect("Basket lines look like '2 Mug'");
            let qty = i64::from_str(qty).expect("Quantity must be a number");
            NewLineItem::new(world.product(name.trim()).id, qty)
        })
        .collect()
}

fn payment_method(method: &str) -> PaymentMethod {
    PaymentMethod::from_str(method).expect("Payment method must be CARD or BANK_TRANSFER")
}

#[when(expr = "{word} checks out {string} paying by {word}")]
async fn check_out(world: &mut ShopWorld, buyer: String, items: String, method: String) {
    let order = NewOrder::new(UserId::from(buyer), basket(world, &items), payment_method(&method));
    let result = world.api().create_order(order).await;
    if let Some(order) = world.record(result) {
        world.last_order = Some(order);
    }
}

#[when(expr = "the order is {word}")]
async fn apply_action(world: &mut ShopWorld, action: String) {
    let id = world.last_order().id;
    let api = world.api();
    let result = match action.as_str() {
        "paid" => api.pay(id).await,
        "shipped" => api.ship(id).await,
        "delivered" => api.deliver(id).await,
        "cancelled" => api.cancel(id).await,
        "hidden" => api.hide(id).await,
        "unhidden" => api.unhide(id).await,
        s => panic!("Unknown order action: {s}"),
    };
    if let Some(order) = world.record(result) {
        world.last_order = Some(order);
    }
}

#[when(expr = "the price of {word} changes to {int}")]
async fn change_price(world: &mut ShopWorld, name: String, price: i64) {
    let id = world.product(&name).id;
    world.api().db().set_product_price(id, Price::from(price)).await.expect("Error changing price");
}

#[when(expr = "everyone eligible is sent a {word} notification")]
async fn bulk_send(world: &mut ShopWorld, notification_type: String) {
    let t = NotificationType::from_str(&notification_type).expect("Unknown notification type");
    let bulk = BulkNotification::new(t, "Announcement", "Something for you");
    world.api().notifier().notify_many(bulk).await.expect("Error sending notifications");
}

#[when(expr = "{word} is sent a {word} notification by {word}")]
async fn send_one(world: &mut ShopWorld, recipient: String, notification_type: String, actor: String) {
    let t = NotificationType::from_str(&notification_type).expect("Unknown notification type");
    let req = NotificationRequest::new(UserId::from(recipient), t, "Hello", "Something happened")
        .from_actor(UserId::from(actor));
    world.api().notifier().notify_one(req).await.expect("Error sending notification");
}

#[then(expr = "the order status is {word}")]
async fn check_status(world: &mut ShopWorld, status: String) {
    let expected = OrderStatusType::from_str(&status).expect("Unknown status");
    let order = world.api().fetch_order(world.last_order().id).await.expect("Order not found");
    assert_eq!(order.status, expected);
}

#[then(expr = "the order tracking label is {string}")]
async fn check_label(world: &mut ShopWorld, label: String) {
    let info = world.api().track(world.last_order().id).await.expect("Order not found");
    assert_eq!(info.label, label);
}

#[then(expr = "the order total is {int}")]
async fn check_total(world: &mut ShopWorld, total: i64) {
    let order = world.api().fetch_order(world.last_order().id).await.expect("Order not found");
    assert_eq!(order.total_price, Price::from(total));
}

#[then("the order has a payment timestamp")]
async fn check_paid_at(world: &mut ShopWorld) {
    let order = world.api().fetch_order(world.last_order().id).await.expect("Order not found");
    assert!(order.paid_at.is_some(), "paid_at is not set");
}

#[then("the order has no payment timestamp")]
async fn check_not_paid(world: &mut ShopWorld) {
    let order = world.api().fetch_order(world.last_order().id).await.expect("Order not found");
    assert!(order.paid_at.is_none(), "paid_at is set");
}

#[then(expr = "the stock of {word} is {int}")]
async fn check_stock(world: &mut ShopWorld, name: String, stock: i64) {
    let id = world.product(&name).id;
    assert_eq!(world.api().stock_level(id).await.expect("Error fetching stock"), stock);
}

#[then(expr = "{word} has {int} order(s) in their history")]
async fn check_history(world: &mut ShopWorld, user: String, count: usize) {
    let orders = world.api().orders_for_user(&UserId::from(user)).await.expect("Error fetching orders");
    assert_eq!(orders.len(), count);
}

#[then(expr = "{word} has {int} {word} notification(s)")]
async fn check_notifications(world: &mut ShopWorld, user: String, count: usize, notification_type: String) {
    let t = NotificationType::from_str(&notification_type).expect("Unknown notification type");
    let inbox = world.api().db().fetch_notifications_for(&UserId::from(user)).await.expect("Error fetching inbox");
    assert_eq!(inbox.iter().filter(|n| n.notification_type == t).count(), count);
}

#[then("the last step was rejected as an invalid transition")]
async fn check_invalid_transition(world: &mut ShopWorld) {
    assert!(
        matches!(world.last_error, Some(OrderFlowError::InvalidTransition { .. })),
        "Expected an invalid transition, got {:?}",
        world.last_error
    );
}

#[then(expr = "the checkout was rejected because {word} is out of stock")]
async fn check_out_of_stock(world: &mut ShopWorld, name: String) {
    let id = world.product(&name).id;
    match &world.last_error {
        Some(OrderFlowError::OutOfStock { product_id, .. }) => assert_eq!(*product_id, id),
        other => panic!("Expected OutOfStock, got {other:?}"),
    }
}
