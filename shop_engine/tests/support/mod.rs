#![allow(dead_code)]
use shop_engine::{
    db_types::{NewLineItem, NewOrder, Order, PaymentMethod, ProductId, ShippingInfo, UserId},
    events::EventProducers,
    test_utils::{
        prepare_env::{destroy_test_db, new_test_db},
        seed::{seed_shop, Seed},
    },
    BroadcastLiveChannel,
    OrderFlowApi,
    SqliteDatabase,
};

pub type Api = OrderFlowApi<SqliteDatabase, BroadcastLiveChannel>;

pub async fn setup() -> (Api, Seed) {
    setup_with_producers(EventProducers::default()).await
}

pub async fn setup_with_producers(producers: EventProducers) -> (Api, Seed) {
    let db = new_test_db().await;
    let seed = seed_shop(&db).await;
    let api = OrderFlowApi::new(db, BroadcastLiveChannel::new(64), producers);
    (api, seed)
}

pub async fn tear_down(api: Api) {
    destroy_test_db(api.db().clone()).await;
}

pub fn shipping() -> ShippingInfo {
    ShippingInfo::new("Alice Kim", "010-1234-5678", "12 Harbour Road, Busan").with_request("Leave at the door")
}

pub fn order_for(user: &str, lines: &[(ProductId, i64)], method: PaymentMethod) -> NewOrder {
    let items = lines.iter().map(|(p, q)| NewLineItem::new(*p, *q)).collect();
    NewOrder::new(UserId::from(user), items, method).with_shipping(shipping())
}

pub async fn place(api: &Api, user: &str, lines: &[(ProductId, i64)], method: PaymentMethod) -> Order {
    api.create_order(order_for(user, lines, method)).await.expect("Error placing order")
}
