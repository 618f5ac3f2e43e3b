use std::collections::HashMap;

use chrono::Utc;
use log::{debug, trace};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::{
    db::{sqlite::inventory, traits::OrderFlowError},
    db_types::{LineItem, Order, OrderAction, OrderId, OrderNumber, OrderRecord, OrderStatusType, PricedLineItem, UserId},
};

/// Writes the order and its line items, consuming stock for every line first.
///
/// This is not atomic on its own. Embed the call in a transaction and pass `&mut tx` as the connection so that a
/// failed stock decrement on a later line rolls back the earlier ones. The stock updates are the first statements
/// executed, so the transaction takes the write lock before it reads anything.
pub async fn insert_order(order: OrderRecord, conn: &mut SqliteConnection) -> Result<Order, OrderFlowError> {
    let total_price = order.total_price().ok_or(OrderFlowError::PriceOverflow)?;
    for item in &order.items {
        inventory::decrement_stock(item.product_id, item.quantity, conn).await?;
    }
    let status = order.initial_status();
    // Card payments are confirmed synchronously, so they are stamped as paid at checkout
    let paid_at = (status == OrderStatusType::Ordered).then_some(order.created_at);
    let row: Order = sqlx::query_as(
        r#"
            INSERT INTO orders (
                order_number,
                user_id,
                total_price,
                payment_method,
                status,
                recipient_name,
                recipient_phone,
                shipping_address,
                shipping_request,
                created_at,
                updated_at,
                paid_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *;
        "#,
    )
    .bind(order.order_number.as_str())
    .bind(order.user_id.as_str())
    .bind(total_price)
    .bind(order.payment_method.to_string())
    .bind(status.to_string())
    .bind(order.shipping.recipient_name)
    .bind(order.shipping.recipient_phone)
    .bind(order.shipping.shipping_address)
    .bind(order.shipping.shipping_request)
    .bind(order.created_at)
    .bind(order.created_at)
    .bind(paid_at)
    .fetch_one(&mut *conn)
    .await?;
    let mut items = Vec::with_capacity(order.items.len());
    for item in order.items {
        items.push(insert_line_item(row.id, item, conn).await?);
    }
    debug!("🗃️ Order {} [{}] inserted with {} line items", row.id, row.order_number, items.len());
    Ok(row.with_items(items))
}

async fn insert_line_item(
    order_id: OrderId,
    item: PricedLineItem,
    conn: &mut SqliteConnection,
) -> Result<LineItem, sqlx::Error> {
    sqlx::query_as(
        r#"
            INSERT INTO line_items (order_id, product_id, product_name, unit_price, quantity)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(order_id)
    .bind(item.product_id)
    .bind(item.product_name)
    .bind(item.unit_price)
    .bind(item.quantity)
    .fetch_one(conn)
    .await
}

pub async fn fetch_line_items(order_id: OrderId, conn: &mut SqliteConnection) -> Result<Vec<LineItem>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM line_items WHERE order_id = $1 ORDER BY id ASC").bind(order_id).fetch_all(conn).await
}

/// Loads the line items for all the given orders in one query and attaches them.
async fn attach_line_items(orders: Vec<Order>, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    if orders.is_empty() {
        return Ok(orders);
    }
    let mut builder = QueryBuilder::<Sqlite>::new("SELECT * FROM line_items WHERE order_id IN (");
    let mut ids = builder.separated(", ");
    for order in &orders {
        ids.push_bind(order.id);
    }
    ids.push_unseparated(") ORDER BY id ASC");
    let items: Vec<LineItem> = builder.build_query_as().fetch_all(conn).await?;
    let mut by_order = items.into_iter().fold(HashMap::<OrderId, Vec<LineItem>>::new(), |mut map, item| {
        map.entry(item.order_id).or_default().push(item);
        map
    });
    let orders = orders
        .into_iter()
        .map(|order| {
            let items = by_order.remove(&order.id).unwrap_or_default();
            order.with_items(items)
        })
        .collect();
    Ok(orders)
}

pub async fn fetch_order(id: OrderId, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order: Option<Order> =
        sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(id).fetch_optional(&mut *conn).await?;
    match order {
        Some(order) => {
            let items = fetch_line_items(order.id, conn).await?;
            Ok(Some(order.with_items(items)))
        },
        None => Ok(None),
    }
}

pub async fn fetch_order_by_number(
    number: &OrderNumber,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order: Option<Order> = sqlx::query_as("SELECT * FROM orders WHERE order_number = $1")
        .bind(number.as_str())
        .fetch_optional(&mut *conn)
        .await?;
    match order {
        Some(order) => {
            let items = fetch_line_items(order.id, conn).await?;
            Ok(Some(order.with_items(items)))
        },
        None => Ok(None),
    }
}

/// Orders for the user, newest first.
pub async fn fetch_orders_for_user(
    user: &UserId,
    include_hidden: bool,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, sqlx::Error> {
    let mut builder = QueryBuilder::<Sqlite>::new("SELECT * FROM orders WHERE user_id = ");
    builder.push_bind(user.as_str());
    if !include_hidden {
        builder.push(" AND hidden = FALSE");
    }
    builder.push(" ORDER BY created_at DESC, id DESC");
    trace!("🗃️ Executing query: {}", builder.sql());
    let orders: Vec<Order> = builder.build_query_as().fetch_all(&mut *conn).await?;
    attach_line_items(orders, conn).await
}

pub async fn fetch_all_orders(conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let orders: Vec<Order> =
        sqlx::query_as("SELECT * FROM orders ORDER BY created_at DESC, id DESC").fetch_all(&mut *conn).await?;
    attach_line_items(orders, conn).await
}

/// Orders whose buyer id, buyer username or any line item's product name contains `keyword`, newest first.
///
/// Matching is a case-sensitive substring test, and an empty keyword matches every order.
pub async fn search_orders(keyword: &str, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let orders: Vec<Order> = sqlx::query_as(
        r#"
            SELECT * FROM orders
            WHERE instr(user_id, $1) > 0
               OR EXISTS (SELECT 1 FROM users WHERE users.user_id = orders.user_id AND instr(users.username, $2) > 0)
               OR EXISTS (
                    SELECT 1 FROM line_items
                    WHERE line_items.order_id = orders.id AND instr(line_items.product_name, $3) > 0
               )
            ORDER BY created_at DESC, id DESC;
        "#,
    )
    .bind(keyword)
    .bind(keyword)
    .bind(keyword)
    .fetch_all(&mut *conn)
    .await?;
    trace!("🗃️ {} orders match '{keyword}'", orders.len());
    attach_line_items(orders, conn).await
}

/// Moves the order to `action`'s target status, provided its current status is one the action is allowed from.
///
/// The status guard is part of the `UPDATE` statement itself, so of two racing callers only one can win. When the
/// action is a cancellation, every line item's quantity is returned to stock. Run this inside a transaction so the
/// status change and the restock commit together.
pub async fn transition_order(
    id: OrderId,
    action: OrderAction,
    conn: &mut SqliteConnection,
) -> Result<Order, OrderFlowError> {
    let now = Utc::now();
    let mut builder = QueryBuilder::<Sqlite>::new("UPDATE orders SET status = ");
    builder.push_bind(action.target().to_string());
    builder.push(", updated_at = ");
    builder.push_bind(now);
    if action == OrderAction::Pay {
        builder.push(", paid_at = ");
        builder.push_bind(now);
    }
    builder.push(" WHERE id = ");
    builder.push_bind(id);
    builder.push(" AND status IN (");
    {
        let mut statuses = builder.separated(", ");
        for status in action.allowed_from() {
            statuses.push_bind(status.to_string());
        }
    }
    builder.push(") RETURNING *");
    trace!("🗃️ Executing query: {}", builder.sql());
    let updated: Option<Order> = builder.build_query_as().fetch_optional(&mut *conn).await?;
    let order = match updated {
        Some(order) => order,
        None => {
            let current = fetch_order(id, conn).await?;
            return Err(match current {
                Some(order) => OrderFlowError::InvalidTransition { order_id: id, status: order.status, action },
                None => OrderFlowError::OrderNotFound(id),
            });
        },
    };
    let items = fetch_line_items(id, conn).await?;
    if action == OrderAction::Cancel {
        for item in &items {
            inventory::increment_stock(item.product_id, item.quantity, conn).await?;
        }
        debug!("🗃️ Order {id} cancelled. Stock restored for {} line items", items.len());
    }
    Ok(order.with_items(items))
}

pub async fn set_hidden(id: OrderId, hidden: bool, conn: &mut SqliteConnection) -> Result<Order, OrderFlowError> {
    let order: Option<Order> = sqlx::query_as("UPDATE orders SET hidden = $1 WHERE id = $2 RETURNING *")
        .bind(hidden)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    let order = order.ok_or(OrderFlowError::OrderNotFound(id))?;
    let items = fetch_line_items(id, conn).await?;
    Ok(order.with_items(items))
}

/// Removes all orders (and their line items) belonging to `user`. Returns the number of orders removed.
pub async fn delete_orders_for_user(user: &UserId, conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
    sqlx::query("DELETE FROM line_items WHERE order_id IN (SELECT id FROM orders WHERE user_id = $1)")
        .bind(user.as_str())
        .execute(&mut *conn)
        .await?;
    let result = sqlx::query("DELETE FROM orders WHERE user_id = $1").bind(user.as_str()).execute(conn).await?;
    Ok(result.rows_affected())
}
