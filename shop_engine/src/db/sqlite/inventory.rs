use chrono::Utc;
use log::trace;
use sqlx::SqliteConnection;

use crate::{db::traits::OrderFlowError, db_types::ProductId};

/// Removes `quantity` units from the product's stock with a single conditional update. If the product cannot cover
/// the request, nothing is changed and [`OrderFlowError::OutOfStock`] is returned.
pub async fn decrement_stock(
    product_id: ProductId,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<i64, OrderFlowError> {
    let remaining: Option<i64> = sqlx::query_scalar(
        "UPDATE products SET stock = stock - $1, updated_at = $2 WHERE id = $3 AND stock >= $4 RETURNING stock",
    )
    .bind(quantity)
    .bind(Utc::now())
    .bind(product_id)
    .bind(quantity)
    .fetch_optional(&mut *conn)
    .await?;
    match remaining {
        Some(stock) => {
            trace!("🗃️ Product {product_id} stock reduced by {quantity} to {stock}");
            Ok(stock)
        },
        None => match fetch_stock(product_id, conn).await? {
            Some(available) => Err(OrderFlowError::OutOfStock { product_id, requested: quantity, available }),
            None => Err(OrderFlowError::ProductNotFound(product_id)),
        },
    }
}

pub async fn increment_stock(
    product_id: ProductId,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<i64, OrderFlowError> {
    let stock: Option<i64> =
        sqlx::query_scalar("UPDATE products SET stock = stock + $1, updated_at = $2 WHERE id = $3 RETURNING stock")
            .bind(quantity)
            .bind(Utc::now())
            .bind(product_id)
            .fetch_optional(conn)
            .await?;
    let stock = stock.ok_or(OrderFlowError::ProductNotFound(product_id))?;
    trace!("🗃️ Product {product_id} stock increased by {quantity} to {stock}");
    Ok(stock)
}

pub async fn fetch_stock(product_id: ProductId, conn: &mut SqliteConnection) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar("SELECT stock FROM products WHERE id = $1").bind(product_id).fetch_optional(conn).await
}
