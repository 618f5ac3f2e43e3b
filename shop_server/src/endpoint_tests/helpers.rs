use actix_web::{
    body::BoxBody,
    dev::ServiceResponse,
    http::StatusCode,
    test,
    test::TestRequest,
    web,
    App,
};
use log::debug;
use serde_json::json;
use shop_engine::{
    db_types::User,
    events::EventProducers,
    test_utils::{
        prepare_env::{destroy_test_db, new_test_db},
        seed::{seed_shop, Seed},
    },
    BroadcastLiveChannel,
    OrderFlowApi,
    SqliteDatabase,
};

use crate::{
    auth::{ROLE_HEADER, USER_HEADER},
    routes::health,
    server::api_scope,
};

/// A seeded shop on a fresh database, with the same routes the server exposes.
pub struct TestShop {
    pub db: SqliteDatabase,
    pub live: BroadcastLiveChannel,
    pub seed: Seed,
}

impl TestShop {
    pub async fn new() -> Self {
        let db = new_test_db().await;
        let seed = seed_shop(&db).await;
        Self { db, live: BroadcastLiveChannel::new(16), seed }
    }

    pub async fn destroy(self) {
        destroy_test_db(self.db).await;
    }

    /// Calls the app and hands back the response without reading the body.
    pub async fn call(&self, req: TestRequest) -> ServiceResponse<BoxBody> {
        let api = OrderFlowApi::new(self.db.clone(), self.live.clone(), EventProducers::default());
        let app = App::new()
            .app_data(web::Data::new(api))
            .app_data(web::Data::new(self.live.clone()))
            .service(health)
            .service(api_scope());
        let service = test::init_service(app).await;
        test::call_service(&service, req.to_request()).await.map_into_boxed_body()
    }

    /// Calls the app and returns the status code and body.
    pub async fn send(&self, req: TestRequest) -> (StatusCode, String) {
        let res = self.call(req).await;
        let status = res.status();
        let body = test::read_body(res).await;
        let body = String::from_utf8_lossy(&body).into_owned();
        debug!("🚀️ Response: {status} {body}");
        (status, body)
    }

    /// Places an order for `user` through the checkout endpoint and returns its id.
    pub async fn checkout(&self, user: &User, lines: &[(i64, i64)], method: &str) -> i64 {
        let req = as_user(TestRequest::post().uri("/api/orders"), user).set_json(order_body(lines, method));
        let (status, body) = self.send(req).await;
        assert_eq!(status, StatusCode::CREATED, "checkout failed: {body}");
        let order: serde_json::Value = serde_json::from_str(&body).unwrap();
        order["id"].as_i64().unwrap()
    }
}

pub fn as_user(req: TestRequest, user: &User) -> TestRequest {
    req.insert_header((USER_HEADER, user.user_id.as_str())).insert_header((ROLE_HEADER, user.role.to_string()))
}

pub fn order_body(lines: &[(i64, i64)], method: &str) -> serde_json::Value {
    let items: Vec<_> = lines.iter().map(|(p, q)| json!({ "product_id": p, "quantity": q })).collect();
    json!({
        "items": items,
        "payment_method": method,
        "shipping": {
            "recipient_name": "Alice Kim",
            "recipient_phone": "010-1234-5678",
            "shipping_address": "12 Harbour Road, Busan"
        }
    })
}
