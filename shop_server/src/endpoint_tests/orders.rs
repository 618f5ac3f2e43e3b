use actix_web::{http::StatusCode, test::TestRequest};
use shop_engine::{
    db_types::{NewProduct, Order, OrderStatusType, Price},
    order_objects::TrackingInfo,
    test_utils::seed::Seed,
};

use super::helpers::{as_user, order_body, TestShop};

#[actix_web::test]
async fn health_check() {
    let shop = TestShop::new().await;
    let (status, body) = shop.send(TestRequest::get().uri("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "👍️\n");
    shop.destroy().await;
}

#[actix_web::test]
async fn requests_without_identity_are_rejected() {
    let shop = TestShop::new().await;
    let (status, body) = shop.send(TestRequest::get().uri("/api/orders")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("\"error\""));
    let req = TestRequest::get().uri("/api/orders").insert_header(("x-shop-user", "alice"));
    let req = req.insert_header(("x-shop-role", "wizard"));
    let (status, _) = shop.send(req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    shop.destroy().await;
}

#[actix_web::test]
async fn card_checkout() {
    let shop = TestShop::new().await;
    let alice = &shop.seed.alice;
    let req = as_user(TestRequest::post().uri("/api/orders"), alice).set_json(order_body(&[(1, 2), (3, 1)], "CARD"));
    let (status, body) = shop.send(req).await;
    assert_eq!(status, StatusCode::CREATED);
    let order: Order = serde_json::from_str(&body).unwrap();
    assert_eq!(order.status, OrderStatusType::Ordered);
    assert_eq!(order.total_price, Price::from(2250));
    assert_eq!(order.items.len(), 2);
    assert!(order.paid_at.is_some());

    let (status, body) = shop.send(as_user(TestRequest::get().uri("/api/orders"), alice)).await;
    assert_eq!(status, StatusCode::OK);
    let orders: Vec<Order> = serde_json::from_str(&body).unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].id, order.id);
    shop.destroy().await;
}

#[actix_web::test]
async fn checkout_errors() {
    let shop = TestShop::new().await;
    let alice = &shop.seed.alice;
    let req = as_user(TestRequest::post().uri("/api/orders"), alice).set_json(order_body(&[(3, 4)], "CARD"));
    let (status, body) = shop.send(req).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body.contains("out of stock"));

    let req = as_user(TestRequest::post().uri("/api/orders"), alice).set_json(order_body(&[], "CARD"));
    let (status, _) = shop.send(req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let req = as_user(TestRequest::post().uri("/api/orders"), alice).set_json(order_body(&[(99, 1)], "CARD"));
    let (status, _) = shop.send(req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    shop.destroy().await;
}

#[actix_web::test]
async fn orders_are_private() {
    let shop = TestShop::new().await;
    let Seed { alice, bob, admin, .. } = shop.seed.clone();
    let id = shop.checkout(&alice, &[(1, 1)], "CARD").await;
    let uri = format!("/api/orders/{id}");
    let (status, _) = shop.send(as_user(TestRequest::get().uri(&uri), &bob)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = shop.send(as_user(TestRequest::get().uri(&uri), &alice)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = shop.send(as_user(TestRequest::get().uri(&uri), &admin)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = shop.send(as_user(TestRequest::get().uri("/api/orders/999"), &alice)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    shop.destroy().await;
}

#[actix_web::test]
async fn only_admins_ship_and_deliver() {
    let shop = TestShop::new().await;
    let Seed { alice, admin, .. } = shop.seed.clone();
    let id = shop.checkout(&alice, &[(2, 1)], "CARD").await;
    let (status, _) = shop.send(as_user(TestRequest::post().uri(&format!("/api/admin/orders/{id}/ship")), &alice)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, body) =
        shop.send(as_user(TestRequest::post().uri(&format!("/api/admin/orders/{id}/ship")), &admin)).await;
    assert_eq!(status, StatusCode::OK);
    let order: Order = serde_json::from_str(&body).unwrap();
    assert_eq!(order.status, OrderStatusType::Delivering);
    let (status, body) =
        shop.send(as_user(TestRequest::post().uri(&format!("/api/admin/orders/{id}/deliver")), &admin)).await;
    assert_eq!(status, StatusCode::OK);
    let order: Order = serde_json::from_str(&body).unwrap();
    assert_eq!(order.status, OrderStatusType::Delivered);
    // Delivered is final
    let (status, _) = shop.send(as_user(TestRequest::post().uri(&format!("/api/orders/{id}/cancel")), &alice)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = shop.send(as_user(TestRequest::get().uri("/api/admin/orders"), &admin)).await;
    assert_eq!(status, StatusCode::OK);
    let orders: Vec<Order> = serde_json::from_str(&body).unwrap();
    assert_eq!(orders.len(), 1);
    shop.destroy().await;
}

#[actix_web::test]
async fn bank_transfer_is_paid_once() {
    let shop = TestShop::new().await;
    let alice = shop.seed.alice.clone();
    let id = shop.checkout(&alice, &[(1, 1)], "BANK_TRANSFER").await;

    let (status, body) = shop.send(as_user(TestRequest::get().uri(&format!("/api/orders/{id}/track")), &alice)).await;
    assert_eq!(status, StatusCode::OK);
    let tracking: TrackingInfo = serde_json::from_str(&body).unwrap();
    assert_eq!(tracking.status, OrderStatusType::PaymentPending);
    assert_eq!(tracking.label, "Awaiting payment");

    let (status, body) = shop.send(as_user(TestRequest::post().uri(&format!("/api/orders/{id}/pay")), &alice)).await;
    assert_eq!(status, StatusCode::OK);
    let order: Order = serde_json::from_str(&body).unwrap();
    assert_eq!(order.status, OrderStatusType::Ordered);
    assert!(order.paid_at.is_some());
    let (status, body) = shop.send(as_user(TestRequest::post().uri(&format!("/api/orders/{id}/pay")), &alice)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body.contains("Cannot pay order"));
    shop.destroy().await;
}

#[actix_web::test]
async fn cancel_restores_stock() {
    let shop = TestShop::new().await;
    let Seed { alice, bob, .. } = shop.seed.clone();
    let id = shop.checkout(&alice, &[(3, 3)], "CARD").await;
    let (status, _) = shop.send(as_user(TestRequest::post().uri(&format!("/api/orders/{id}/cancel")), &bob)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, body) = shop.send(as_user(TestRequest::post().uri(&format!("/api/orders/{id}/cancel")), &alice)).await;
    assert_eq!(status, StatusCode::OK);
    let order: Order = serde_json::from_str(&body).unwrap();
    assert_eq!(order.status, OrderStatusType::Canceled);
    // All three spoons are back on the shelf
    shop.checkout(&bob, &[(3, 3)], "CARD").await;
    shop.destroy().await;
}

#[actix_web::test]
async fn hidden_orders_leave_the_owners_list() {
    let shop = TestShop::new().await;
    let Seed { alice, admin, .. } = shop.seed.clone();
    let id = shop.checkout(&alice, &[(1, 1)], "CARD").await;
    let (status, _) = shop.send(as_user(TestRequest::post().uri(&format!("/api/orders/{id}/hide")), &admin)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = shop.send(as_user(TestRequest::post().uri(&format!("/api/orders/{id}/hide")), &alice)).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = shop.send(as_user(TestRequest::get().uri("/api/orders"), &alice)).await;
    let orders: Vec<Order> = serde_json::from_str(&body).unwrap();
    assert!(orders.is_empty());
    let (_, body) = shop.send(as_user(TestRequest::get().uri("/api/admin/orders"), &admin)).await;
    let orders: Vec<Order> = serde_json::from_str(&body).unwrap();
    assert_eq!(orders.len(), 1);
    let (status, _) = shop.send(as_user(TestRequest::post().uri(&format!("/api/orders/{id}/unhide")), &alice)).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = shop.send(as_user(TestRequest::get().uri("/api/orders"), &alice)).await;
    let orders: Vec<Order> = serde_json::from_str(&body).unwrap();
    assert_eq!(orders.len(), 1);
    shop.destroy().await;
}

#[actix_web::test]
async fn admin_order_list_can_be_searched() {
    let shop = TestShop::new().await;
    let Seed { alice, bob, admin, .. } = shop.seed.clone();
    let mug_order = shop.checkout(&alice, &[(1, 1)], "CARD").await;
    let tea_order = shop.checkout(&bob, &[(2, 1), (3, 1)], "CARD").await;

    let search = |q: &str| as_user(TestRequest::get().uri(&format!("/api/admin/orders?q={q}")), &admin);
    let (status, body) = shop.send(search("Spoon")).await;
    assert_eq!(status, StatusCode::OK);
    let orders: Vec<Order> = serde_json::from_str(&body).unwrap();
    assert_eq!(orders.iter().map(|o| o.id.0).collect::<Vec<_>>(), vec![tea_order]);

    let (_, body) = shop.send(search("alice")).await;
    let orders: Vec<Order> = serde_json::from_str(&body).unwrap();
    assert_eq!(orders.iter().map(|o| o.id.0).collect::<Vec<_>>(), vec![mug_order]);

    let (_, body) = shop.send(search("Nothing")).await;
    assert_eq!(body, "[]");

    let (status, _) = shop.send(as_user(TestRequest::get().uri("/api/admin/orders?q=Mug"), &alice)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    shop.destroy().await;
}

#[actix_web::test]
async fn unrepresentable_totals_are_a_bad_request() {
    let shop = TestShop::new().await;
    let alice = shop.seed.alice.clone();
    let gold = shop.db.insert_product(NewProduct::new("Gold bar", Price::from(i64::MAX / 2), 3)).await.unwrap();
    let req = as_user(TestRequest::post().uri("/api/orders"), &alice).set_json(order_body(&[(gold.id.0, 3)], "CARD"));
    let (status, body) = shop.send(req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("too large"));
    shop.destroy().await;
}
