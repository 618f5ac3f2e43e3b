use cucumber::World;
use log::*;
use shop_engine::{
    db_types::{Order, Product},
    events::EventProducers,
    test_utils::{
        prepare_env::{create_database, random_db_path, run_migrations},
        seed::{seed_shop, Seed},
    },
    BroadcastLiveChannel,
    OrderFlowApi,
    OrderFlowError,
    SqliteDatabase,
};

#[derive(Default, Debug, World)]
pub struct ShopWorld {
    pub system: Option<ShopSystem>,
    pub last_order: Option<Order>,
    pub last_error: Option<OrderFlowError>,
}

#[derive(Debug)]
pub struct ShopSystem {
    pub db_path: String,
    pub api: OrderFlowApi<SqliteDatabase, BroadcastLiveChannel>,
    pub seed: Seed,
}

impl ShopWorld {
    pub fn api(&self) -> &OrderFlowApi<SqliteDatabase, BroadcastLiveChannel> {
        &self.system.as_ref().expect("Shop not initialised").api
    }

    pub fn product(&self, name: &str) -> &Product {
        let seed = &self.system.as_ref().expect("Shop not initialised").seed;
        [&seed.mug, &seed.tea, &seed.spoon]
            .into_iter()
            .find(|p| p.name == name)
            .unwrap_or_else(|| panic!("No seeded product called {name}"))
    }

    pub fn last_order(&self) -> &Order {
        self.last_order.as_ref().expect("No order has been placed")
    }

    pub fn record<T>(&mut self, result: Result<T, OrderFlowError>) -> Option<T> {
        match result {
            Ok(v) => {
                self.last_error = None;
                Some(v)
            },
            Err(e) => {
                debug!("🚀️ Step produced an error: {e}");
                self.last_error = Some(e);
                None
            },
        }
    }
}

impl ShopSystem {
    pub async fn new() -> Self {
        let url = prepare_test_env().await;
        let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating connection to database");
        debug!("Created database: {url}");
        let seed = seed_shop(&db).await;
        let api = OrderFlowApi::new(db, BroadcastLiveChannel::new(64), EventProducers::default());
        Self { db_path: url, api, seed }
    }
}

pub async fn prepare_test_env() -> String {
    let path = random_db_path();
    create_database(&path).await;
    run_migrations(&path).await;
    path
}
