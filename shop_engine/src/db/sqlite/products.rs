use chrono::Utc;
use sqlx::SqliteConnection;

use crate::db_types::{NewProduct, Price, Product, ProductId};

pub async fn insert_product(product: NewProduct, conn: &mut SqliteConnection) -> Result<Product, sqlx::Error> {
    let now = Utc::now();
    sqlx::query_as(
        r#"
            INSERT INTO products (name, price, stock, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(product.name)
    .bind(product.price)
    .bind(product.stock)
    .bind(now)
    .bind(now)
    .fetch_one(conn)
    .await
}

pub async fn fetch_product(id: ProductId, conn: &mut SqliteConnection) -> Result<Option<Product>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM products WHERE id = $1").bind(id).fetch_optional(conn).await
}

pub async fn update_price(
    id: ProductId,
    price: Price,
    conn: &mut SqliteConnection,
) -> Result<Option<Product>, sqlx::Error> {
    sqlx::query_as("UPDATE products SET price = $1, updated_at = $2 WHERE id = $3 RETURNING *")
        .bind(price)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(conn)
        .await
}
