use std::fmt::Debug;

use log::*;
use sqlx::SqlitePool;

use super::{db_url, inventory, new_pool, notifications, orders, products, users, SqliteDatabaseError};
use crate::{
    db::traits::{
        InventoryLedger,
        NotificationError,
        NotificationStore,
        OrderFlowError,
        OrderManagement,
        ProductCatalog,
        PurgeSummary,
        ShopDatabase,
        UserDirectory,
        UserDirectoryError,
    },
    db_types::{
        NewNotification,
        NewProduct,
        NewUser,
        Notification,
        NotificationId,
        NotificationType,
        Order,
        OrderAction,
        OrderId,
        OrderNumber,
        OrderRecord,
        Price,
        Product,
        ProductId,
        Role,
        User,
        UserId,
    },
};

/// SQLite-backed store for the shop.
///
/// Every write that reads its row back through `RETURNING` runs in its own transaction. The commit is what makes the
/// row visible to the other pooled connections once the call returns.
#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SqliteDatabase ({})", self.url)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object, using the URL in `SHOP_DATABASE_URL`, or the default.
    pub async fn new(max_connections: u32) -> Result<Self, SqliteDatabaseError> {
        let url = db_url();
        SqliteDatabase::new_with_url(&url, max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, SqliteDatabaseError> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Brings the schema up to date. Safe to call on every start-up.
    pub async fn migrate(&self) -> Result<(), SqliteDatabaseError> {
        sqlx::migrate!("./src/db/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations are up to date");
        Ok(())
    }

    /// Registers a user. Account sign-up lives outside the engine, so this is used for seeding and by tests.
    pub async fn insert_user(&self, user: NewUser) -> Result<User, UserDirectoryError> {
        let mut tx = self.pool.begin().await?;
        let user = users::insert_user(user, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ User {} ({}) registered as {}", user.user_id, user.username, user.role);
        Ok(user)
    }

    /// Adds a product to the catalog. Catalog management lives outside the engine, so this is used for seeding and
    /// by tests.
    pub async fn insert_product(&self, product: NewProduct) -> Result<Product, OrderFlowError> {
        let mut tx = self.pool.begin().await?;
        let product = products::insert_product(product, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Product {} ({}) added at {} with {} in stock", product.id, product.name, product.price, product.stock);
        Ok(product)
    }

    pub async fn set_product_price(&self, id: ProductId, price: Price) -> Result<Product, OrderFlowError> {
        let mut tx = self.pool.begin().await?;
        let product = products::update_price(id, price, &mut tx).await?.ok_or(OrderFlowError::ProductNotFound(id))?;
        tx.commit().await?;
        Ok(product)
    }
}

impl ShopDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn close(&mut self) {
        self.pool.close().await;
    }
}

impl OrderManagement for SqliteDatabase {
    async fn fetch_order(&self, id: OrderId) -> Result<Option<Order>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order(id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_by_number(&self, number: &OrderNumber) -> Result<Option<Order>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_number(number, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_orders_for_user(&self, user: &UserId, include_hidden: bool) -> Result<Vec<Order>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_orders_for_user(user, include_hidden, &mut conn).await?;
        Ok(orders)
    }

    async fn fetch_all_orders(&self) -> Result<Vec<Order>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_all_orders(&mut conn).await?;
        Ok(orders)
    }

    async fn search_orders(&self, keyword: &str) -> Result<Vec<Order>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::search_orders(keyword, &mut conn).await?;
        Ok(orders)
    }

    async fn insert_order(&self, order: OrderRecord) -> Result<Order, OrderFlowError> {
        let mut tx = self.pool.begin().await?;
        let number = order.order_number.clone();
        // Dropping the transaction on error rolls back any stock that was already taken
        let order = orders::insert_order(order, &mut tx).await.map_err(|e| {
            debug!("🗃️ Order [{number}] was not saved. {e}");
            e
        })?;
        tx.commit().await?;
        Ok(order)
    }

    async fn transition_order(&self, id: OrderId, action: OrderAction) -> Result<Order, OrderFlowError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::transition_order(id, action, &mut tx).await?;
        tx.commit().await?;
        trace!("🗃️ Order {id} is now {}", order.status);
        Ok(order)
    }

    async fn set_order_hidden(&self, id: OrderId, hidden: bool) -> Result<Order, OrderFlowError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::set_hidden(id, hidden, &mut tx).await?;
        tx.commit().await?;
        Ok(order)
    }
}

impl InventoryLedger for SqliteDatabase {
    async fn decrement_stock(&self, product_id: ProductId, quantity: i64) -> Result<i64, OrderFlowError> {
        let mut tx = self.pool.begin().await?;
        let stock = inventory::decrement_stock(product_id, quantity, &mut tx).await?;
        tx.commit().await?;
        Ok(stock)
    }

    async fn increment_stock(&self, product_id: ProductId, quantity: i64) -> Result<i64, OrderFlowError> {
        let mut tx = self.pool.begin().await?;
        let stock = inventory::increment_stock(product_id, quantity, &mut tx).await?;
        tx.commit().await?;
        Ok(stock)
    }

    async fn stock_level(&self, product_id: ProductId) -> Result<i64, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        inventory::fetch_stock(product_id, &mut conn).await?.ok_or(OrderFlowError::ProductNotFound(product_id))
    }
}

impl ProductCatalog for SqliteDatabase {
    async fn fetch_product(&self, id: ProductId) -> Result<Option<Product>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::fetch_product(id, &mut conn).await?;
        Ok(product)
    }
}

impl UserDirectory for SqliteDatabase {
    async fn fetch_user_by_id(&self, id: i64) -> Result<Option<User>, UserDirectoryError> {
        let mut conn = self.pool.acquire().await?;
        let user = users::fetch_user_by_id(id, &mut conn).await?;
        Ok(user)
    }

    async fn fetch_user(&self, user_id: &UserId) -> Result<Option<User>, UserDirectoryError> {
        let mut conn = self.pool.acquire().await?;
        let user = users::fetch_user(user_id, &mut conn).await?;
        Ok(user)
    }

    async fn list_by_role(&self, role: Role) -> Result<Vec<User>, UserDirectoryError> {
        let mut conn = self.pool.acquire().await?;
        let users = users::fetch_by_role(role, &mut conn).await?;
        Ok(users)
    }

    async fn list_active(&self) -> Result<Vec<User>, UserDirectoryError> {
        let mut conn = self.pool.acquire().await?;
        let users = users::fetch_active(&mut conn).await?;
        Ok(users)
    }

    async fn list_active_excluding_role(&self, role: Role) -> Result<Vec<User>, UserDirectoryError> {
        let mut conn = self.pool.acquire().await?;
        let users = users::fetch_active_excluding_role(role, &mut conn).await?;
        Ok(users)
    }

    async fn list_consented_to_marketing(&self) -> Result<Vec<User>, UserDirectoryError> {
        let mut conn = self.pool.acquire().await?;
        let users = users::fetch_marketing_consenting(&mut conn).await?;
        Ok(users)
    }

    async fn deactivate_user(&self, user_id: &UserId) -> Result<User, UserDirectoryError> {
        let mut tx = self.pool.begin().await?;
        let user = users::deactivate(user_id, &mut tx)
            .await?
            .ok_or_else(|| UserDirectoryError::UserNotFound(user_id.clone()))?;
        tx.commit().await?;
        info!("🗃️ User {user_id} has been deactivated");
        Ok(user)
    }

    async fn purge_user(&self, user_id: &UserId) -> Result<PurgeSummary, UserDirectoryError> {
        let mut tx = self.pool.begin().await?;
        let notifications_removed = notifications::delete_for_recipient(user_id, &mut tx).await?;
        let orders_removed = orders::delete_orders_for_user(user_id, &mut tx).await?;
        if users::delete_user(user_id, &mut tx).await? == 0 {
            return Err(UserDirectoryError::UserNotFound(user_id.clone()));
        }
        tx.commit().await?;
        info!(
            "🗃️ User {user_id} has been purged along with {orders_removed} orders and {notifications_removed} \
             notifications"
        );
        Ok(PurgeSummary { user_id: user_id.clone(), orders_removed, notifications_removed })
    }
}

impl NotificationStore for SqliteDatabase {
    async fn insert_notification(&self, notification: NewNotification) -> Result<Notification, NotificationError> {
        let mut tx = self.pool.begin().await?;
        let notification = notifications::insert_notification(notification, &mut tx).await?;
        tx.commit().await?;
        Ok(notification)
    }

    async fn insert_notifications(
        &self,
        notifications: Vec<NewNotification>,
    ) -> Result<Vec<Notification>, NotificationError> {
        let mut tx = self.pool.begin().await?;
        let written = notifications::insert_notifications(notifications, &mut tx).await;
        tx.commit().await?;
        Ok(written)
    }

    async fn fetch_notification(&self, id: NotificationId) -> Result<Option<Notification>, NotificationError> {
        let mut conn = self.pool.acquire().await?;
        let notification = notifications::fetch_notification(id, &mut conn).await?;
        Ok(notification)
    }

    async fn fetch_notifications_for(&self, recipient: &UserId) -> Result<Vec<Notification>, NotificationError> {
        let mut conn = self.pool.acquire().await?;
        let list = notifications::fetch_for_recipient(recipient, &mut conn).await?;
        Ok(list)
    }

    async fn count_unread(&self, recipient: &UserId) -> Result<i64, NotificationError> {
        let mut conn = self.pool.acquire().await?;
        let count = notifications::count_unread(recipient, &mut conn).await?;
        Ok(count)
    }

    async fn mark_read(&self, id: NotificationId) -> Result<Notification, NotificationError> {
        let mut tx = self.pool.begin().await?;
        let notification = notifications::mark_read(id, &mut tx).await?;
        tx.commit().await?;
        Ok(notification)
    }

    async fn mark_all_read(&self, recipient: &UserId) -> Result<u64, NotificationError> {
        let mut conn = self.pool.acquire().await?;
        let count = notifications::mark_all_read(recipient, &mut conn).await?;
        Ok(count)
    }

    async fn delete_notification(&self, id: NotificationId) -> Result<(), NotificationError> {
        let mut conn = self.pool.acquire().await?;
        notifications::delete_notification(id, &mut conn).await
    }

    async fn delete_notifications_for(&self, recipient: &UserId) -> Result<u64, NotificationError> {
        let mut conn = self.pool.acquire().await?;
        let count = notifications::delete_for_recipient(recipient, &mut conn).await?;
        Ok(count)
    }

    async fn delete_by_type_and_reference(
        &self,
        notification_type: NotificationType,
        reference_id: i64,
    ) -> Result<u64, NotificationError> {
        let mut conn = self.pool.acquire().await?;
        let count = notifications::delete_by_type_and_reference(notification_type, reference_id, &mut conn).await?;
        Ok(count)
    }
}
