use actix_web::{
    http::{header, StatusCode},
    test::TestRequest,
};
use serde_json::json;
use shop_engine::{
    db_types::{Notification, NotificationType, User},
    test_utils::seed::Seed,
};

use super::helpers::{as_user, TestShop};

async fn inbox(shop: &TestShop, user: &User) -> Vec<Notification> {
    let (status, body) = shop.send(as_user(TestRequest::get().uri("/api/notifications"), user)).await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_str(&body).unwrap()
}

async fn unread(shop: &TestShop, user: &User) -> i64 {
    let (status, body) = shop.send(as_user(TestRequest::get().uri("/api/notifications/unread-count"), user)).await;
    assert_eq!(status, StatusCode::OK);
    let value: serde_json::Value = serde_json::from_str(&body).unwrap();
    value["count"].as_i64().unwrap()
}

#[actix_web::test]
async fn checkout_fills_both_inboxes() {
    let shop = TestShop::new().await;
    let Seed { alice, bob, admin, .. } = shop.seed.clone();
    shop.checkout(&alice, &[(1, 1), (2, 1), (3, 1)], "CARD").await;
    let list = inbox(&shop, &alice).await;
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].notification_type, NotificationType::Order);
    assert_eq!(list[0].title, "Order completed");
    let list = inbox(&shop, &admin).await;
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].notification_type, NotificationType::AdminOrder);
    assert_eq!(list[0].body, "Alice ordered Mug, Tea +1 more (₩1750).");
    assert!(inbox(&shop, &bob).await.is_empty());
    assert_eq!(unread(&shop, &alice).await, 1);
    shop.destroy().await;
}

#[actix_web::test]
async fn reading_notifications() {
    let shop = TestShop::new().await;
    let Seed { alice, bob, .. } = shop.seed.clone();
    shop.checkout(&alice, &[(1, 1)], "CARD").await;
    shop.checkout(&alice, &[(2, 1)], "BANK_TRANSFER").await;
    let list = inbox(&shop, &alice).await;
    assert_eq!(list.len(), 2);
    let id = list[0].id.0;

    let (status, _) = shop.send(as_user(TestRequest::put().uri(&format!("/api/notifications/{id}/read")), &bob)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, body) =
        shop.send(as_user(TestRequest::put().uri(&format!("/api/notifications/{id}/read")), &alice)).await;
    assert_eq!(status, StatusCode::OK);
    let notification: Notification = serde_json::from_str(&body).unwrap();
    assert!(notification.is_read);
    assert!(notification.read_at.is_some());
    assert_eq!(unread(&shop, &alice).await, 1);

    let (status, body) = shop.send(as_user(TestRequest::put().uri("/api/notifications/read-all"), &alice)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"count":1}"#);
    assert_eq!(unread(&shop, &alice).await, 0);

    let (status, _) = shop.send(as_user(TestRequest::put().uri("/api/notifications/9999/read"), &alice)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    shop.destroy().await;
}

#[actix_web::test]
async fn deleting_notifications() {
    let shop = TestShop::new().await;
    let Seed { alice, bob, .. } = shop.seed.clone();
    shop.checkout(&alice, &[(1, 1)], "CARD").await;
    shop.checkout(&alice, &[(1, 1)], "CARD").await;
    shop.checkout(&alice, &[(1, 1)], "CARD").await;
    let list = inbox(&shop, &alice).await;
    let id = list[0].id.0;

    let (status, _) = shop.send(as_user(TestRequest::delete().uri(&format!("/api/notifications/{id}")), &bob)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = shop.send(as_user(TestRequest::delete().uri(&format!("/api/notifications/{id}")), &alice)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(inbox(&shop, &alice).await.len(), 2);

    let (status, body) = shop.send(as_user(TestRequest::delete().uri("/api/notifications"), &alice)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"count":2}"#);
    assert!(inbox(&shop, &alice).await.is_empty());
    shop.destroy().await;
}

#[actix_web::test]
async fn bulk_sends_are_for_admins() {
    let shop = TestShop::new().await;
    let Seed { alice, bob, carol, admin, .. } = shop.seed.clone();
    let body = json!({ "notification_type": "MARKETING", "title": "Spring sale", "body": "Everything is 10% off" });

    let req = as_user(TestRequest::post().uri("/api/admin/notifications"), &alice).set_json(&body);
    let (status, _) = shop.send(req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let req = as_user(TestRequest::post().uri("/api/admin/notifications"), &admin).set_json(&body);
    let (status, body) = shop.send(req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"sent":2}"#);
    assert_eq!(inbox(&shop, &alice).await.len(), 1);
    assert_eq!(inbox(&shop, &carol).await.len(), 1);
    assert!(inbox(&shop, &bob).await.is_empty());
    assert!(inbox(&shop, &admin).await.is_empty());

    let body = json!({ "notification_type": "NOTICE", "title": "Maintenance", "body": "Back at 9am", "reference_id": 4 });
    let req = as_user(TestRequest::post().uri("/api/admin/notifications"), &admin).set_json(&body);
    let (status, body) = shop.send(req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"sent":2}"#);
    shop.destroy().await;
}

#[actix_web::test]
async fn live_stream_is_an_event_stream() {
    let shop = TestShop::new().await;
    let (status, _) = shop.send(TestRequest::get().uri("/api/notifications/stream")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let res = shop.call(as_user(TestRequest::get().uri("/api/notifications/stream"), &shop.seed.alice)).await;
    assert_eq!(res.status(), StatusCode::OK);
    let content_type = res.headers().get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok());
    assert_eq!(content_type, Some("text/event-stream"));
    assert_eq!(shop.live.session_count(), 1);
    drop(res);
    shop.destroy().await;
}
