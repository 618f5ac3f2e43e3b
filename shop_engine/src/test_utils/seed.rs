//! A small, well-known population of users and products for tests.
use crate::{
    db_types::{NewProduct, NewUser, Price, Product, User},
    traits::UserDirectory,
    SqliteDatabase,
};

#[derive(Debug, Clone)]
pub struct Seed {
    pub alice: User,
    pub bob: User,
    pub carol: User,
    pub admin: User,
    pub mug: Product,
    pub tea: Product,
    pub spoon: Product,
}

/// Seeds the database with
/// * `alice`, a customer who consented to marketing,
/// * `bob`, a customer who did not,
/// * `carol`, a deactivated customer who consented to marketing,
/// * `root`, an admin,
/// * product 1 `Mug` at 1000 with 10 in stock, product 2 `Tea` at 500 with 5 in stock, and product 3 `Spoon` at 250
///   with 3 in stock.
pub async fn seed_shop(db: &SqliteDatabase) -> Seed {
    let alice = db.insert_user(NewUser::customer("alice", "Alice").with_marketing_consent(true)).await.unwrap();
    let bob = db.insert_user(NewUser::customer("bob", "Bob")).await.unwrap();
    let carol = db.insert_user(NewUser::customer("carol", "Carol").with_marketing_consent(true)).await.unwrap();
    let carol = db.deactivate_user(&carol.user_id).await.unwrap();
    let admin = db.insert_user(NewUser::admin("root", "Shop Admin")).await.unwrap();
    let mug = db.insert_product(NewProduct::new("Mug", Price::from(1000), 10)).await.unwrap();
    let tea = db.insert_product(NewProduct::new("Tea", Price::from(500), 5)).await.unwrap();
    let spoon = db.insert_product(NewProduct::new("Spoon", Price::from(250), 3)).await.unwrap();
    Seed { alice, bob, carol, admin, mug, tea, spoon }
}
