//! Request handlers for the shop API.
//!
//! Handlers stay thin. They check the caller, hand off to [`OrderFlowApi`] or its notifier, and map the result to a
//! response. Anything that talks to the database is async, so a slow query never stalls the worker thread.
use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use shop_engine::{
    db_types::{NotificationId, Order, OrderId},
    notification_objects::BulkNotification,
    traits::ShopDatabase,
    LiveChannel,
    OrderFlowApi,
};

use crate::{
    auth::Caller,
    data_objects::{BulkSendResult, CountResponse, CreateOrderRequest, JsonResponse, OrderSearch, UnreadCount},
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro.
// Handler type parameters must be declared in the same order as the bounds listed in the macro call.
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Orders  ----------------------------------------------------

route!(create_order => Post "/orders" impl ShopDatabase, LiveChannel);
/// Route handler for checkout
///
/// The caller is always the buyer. Card orders are confirmed immediately, bank-transfer orders wait for a `pay` call.
/// Responds with `201 Created` and the stored order, including the catalog price snapshot for each line.
pub async fn create_order<B: ShopDatabase, L: LiveChannel>(
    caller: Caller,
    body: web::Json<CreateOrderRequest>,
    api: web::Data<OrderFlowApi<B, L>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ POST create_order for {}", caller.user_id);
    let new_order = body.into_inner().into_new_order(caller.user_id);
    let order = api.create_order(new_order).await.map_err(|e| {
        debug!("💻️ Could not create order. {e}");
        e
    })?;
    Ok(HttpResponse::Created().json(order))
}

route!(my_orders => Get "/orders" impl ShopDatabase, LiveChannel);
/// The caller's orders, newest first. Hidden orders are left out.
pub async fn my_orders<B: ShopDatabase, L: LiveChannel>(
    caller: Caller,
    api: web::Data<OrderFlowApi<B, L>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET my_orders for {}", caller.user_id);
    let orders = api.orders_for_user(&caller.user_id).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(order_by_id => Get "/orders/{id}" impl ShopDatabase, LiveChannel);
pub async fn order_by_id<B: ShopDatabase, L: LiveChannel>(
    caller: Caller,
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B, L>>,
) -> Result<HttpResponse, ServerError> {
    let id = OrderId(path.into_inner());
    debug!("💻️ GET order {id} for {}", caller.user_id);
    let order = fetch_accessible_order(&caller, id, api.as_ref()).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(track_order => Get "/orders/{id}/track" impl ShopDatabase, LiveChannel);
pub async fn track_order<B: ShopDatabase, L: LiveChannel>(
    caller: Caller,
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B, L>>,
) -> Result<HttpResponse, ServerError> {
    let id = OrderId(path.into_inner());
    debug!("💻️ GET tracking for order {id}");
    fetch_accessible_order(&caller, id, api.as_ref()).await?;
    let tracking = api.track(id).await?;
    Ok(HttpResponse::Ok().json(tracking))
}

route!(pay_order => Post "/orders/{id}/pay" impl ShopDatabase, LiveChannel);
/// Confirms payment for a bank-transfer order. Only valid while the order is awaiting payment.
pub async fn pay_order<B: ShopDatabase, L: LiveChannel>(
    caller: Caller,
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B, L>>,
) -> Result<HttpResponse, ServerError> {
    let id = OrderId(path.into_inner());
    debug!("💻️ POST pay for order {id} by {}", caller.user_id);
    fetch_accessible_order(&caller, id, api.as_ref()).await?;
    let order = api.pay(id).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(cancel_order => Post "/orders/{id}/cancel" impl ShopDatabase, LiveChannel);
/// Cancels an order that has not yet been delivered, returning its stock to inventory.
pub async fn cancel_order<B: ShopDatabase, L: LiveChannel>(
    caller: Caller,
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B, L>>,
) -> Result<HttpResponse, ServerError> {
    let id = OrderId(path.into_inner());
    debug!("💻️ POST cancel for order {id} by {}", caller.user_id);
    fetch_accessible_order(&caller, id, api.as_ref()).await?;
    let order = api.cancel(id).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(hide_order => Post "/orders/{id}/hide" impl ShopDatabase, LiveChannel);
pub async fn hide_order<B: ShopDatabase, L: LiveChannel>(
    caller: Caller,
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B, L>>,
) -> Result<HttpResponse, ServerError> {
    let id = OrderId(path.into_inner());
    debug!("💻️ POST hide for order {id} by {}", caller.user_id);
    fetch_owned_order(&caller, id, api.as_ref()).await?;
    api.hide(id).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::success(format!("Order {id} is hidden"))))
}

route!(unhide_order => Post "/orders/{id}/unhide" impl ShopDatabase, LiveChannel);
pub async fn unhide_order<B: ShopDatabase, L: LiveChannel>(
    caller: Caller,
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B, L>>,
) -> Result<HttpResponse, ServerError> {
    let id = OrderId(path.into_inner());
    debug!("💻️ POST unhide for order {id} by {}", caller.user_id);
    fetch_owned_order(&caller, id, api.as_ref()).await?;
    api.unhide(id).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::success(format!("Order {id} is visible again"))))
}

//----------------------------------------------   Admin orders  ----------------------------------------------------

route!(all_orders => Get "/admin/orders" impl ShopDatabase, LiveChannel);
/// Every order in the shop, hidden ones included. Admins only.
///
/// `?q=keyword` narrows the list to orders whose buyer id, buyer username or product names contain the keyword.
pub async fn all_orders<B: ShopDatabase, L: LiveChannel>(
    caller: Caller,
    query: web::Query<OrderSearch>,
    api: web::Data<OrderFlowApi<B, L>>,
) -> Result<HttpResponse, ServerError> {
    caller.require_admin()?;
    let orders = match query.into_inner().q {
        Some(keyword) => {
            debug!("💻️ GET all_orders matching [{keyword}]");
            api.search_orders(&keyword).await?
        },
        None => {
            debug!("💻️ GET all_orders");
            api.all_orders().await?
        },
    };
    Ok(HttpResponse::Ok().json(orders))
}

route!(ship_order => Post "/admin/orders/{id}/ship" impl ShopDatabase, LiveChannel);
pub async fn ship_order<B: ShopDatabase, L: LiveChannel>(
    caller: Caller,
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B, L>>,
) -> Result<HttpResponse, ServerError> {
    caller.require_admin()?;
    let id = OrderId(path.into_inner());
    info!("💻️ Order {id} is being shipped by {}", caller.user_id);
    let order = api.ship(id).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(deliver_order => Post "/admin/orders/{id}/deliver" impl ShopDatabase, LiveChannel);
pub async fn deliver_order<B: ShopDatabase, L: LiveChannel>(
    caller: Caller,
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B, L>>,
) -> Result<HttpResponse, ServerError> {
    caller.require_admin()?;
    let id = OrderId(path.into_inner());
    info!("💻️ Order {id} marked as delivered by {}", caller.user_id);
    let order = api.deliver(id).await?;
    Ok(HttpResponse::Ok().json(order))
}

/// Fetches the order, provided the caller owns it or is an admin.
async fn fetch_accessible_order<B: ShopDatabase, L: LiveChannel>(
    caller: &Caller,
    id: OrderId,
    api: &OrderFlowApi<B, L>,
) -> Result<Order, ServerError> {
    let order = api.fetch_order(id).await?;
    if caller.can_access(&order) {
        Ok(order)
    } else {
        debug!("💻️ {} may not access order {id}", caller.user_id);
        Err(ServerError::InsufficientPermissions(format!("Order {id} belongs to another user")))
    }
}

/// Fetches the order, provided the caller owns it. Hiding is a personal view setting, so admins get no exemption.
async fn fetch_owned_order<B: ShopDatabase, L: LiveChannel>(
    caller: &Caller,
    id: OrderId,
    api: &OrderFlowApi<B, L>,
) -> Result<Order, ServerError> {
    let order = api.fetch_order(id).await?;
    if order.is_owned_by(&caller.user_id) {
        Ok(order)
    } else {
        Err(ServerError::InsufficientPermissions(format!("Order {id} belongs to another user")))
    }
}

//----------------------------------------------   Notifications  ----------------------------------------------------

route!(my_notifications => Get "/notifications" impl ShopDatabase, LiveChannel);
/// The caller's notification inbox, newest first.
pub async fn my_notifications<B: ShopDatabase, L: LiveChannel>(
    caller: Caller,
    api: web::Data<OrderFlowApi<B, L>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET notifications for {}", caller.user_id);
    let notifications = api.notifier().list(&caller.user_id).await?;
    Ok(HttpResponse::Ok().json(notifications))
}

route!(unread_count => Get "/notifications/unread-count" impl ShopDatabase, LiveChannel);
pub async fn unread_count<B: ShopDatabase, L: LiveChannel>(
    caller: Caller,
    api: web::Data<OrderFlowApi<B, L>>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ GET unread count for {}", caller.user_id);
    let count = api.notifier().unread_count(&caller.user_id).await?;
    Ok(HttpResponse::Ok().json(UnreadCount { count }))
}

route!(mark_read => Put "/notifications/{id}/read" impl ShopDatabase, LiveChannel);
pub async fn mark_read<B: ShopDatabase, L: LiveChannel>(
    caller: Caller,
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B, L>>,
) -> Result<HttpResponse, ServerError> {
    let id = NotificationId(path.into_inner());
    debug!("💻️ PUT read for notification {id} by {}", caller.user_id);
    check_recipient(&caller, id, api.as_ref()).await?;
    let notification = api.notifier().mark_read(id).await?;
    Ok(HttpResponse::Ok().json(notification))
}

route!(mark_all_read => Put "/notifications/read-all" impl ShopDatabase, LiveChannel);
pub async fn mark_all_read<B: ShopDatabase, L: LiveChannel>(
    caller: Caller,
    api: web::Data<OrderFlowApi<B, L>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ PUT read-all for {}", caller.user_id);
    let count = api.notifier().mark_all_read(&caller.user_id).await?;
    Ok(HttpResponse::Ok().json(CountResponse { count }))
}

route!(delete_notification => Delete "/notifications/{id}" impl ShopDatabase, LiveChannel);
pub async fn delete_notification<B: ShopDatabase, L: LiveChannel>(
    caller: Caller,
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B, L>>,
) -> Result<HttpResponse, ServerError> {
    let id = NotificationId(path.into_inner());
    debug!("💻️ DELETE notification {id} by {}", caller.user_id);
    check_recipient(&caller, id, api.as_ref()).await?;
    api.notifier().delete(id).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::success(format!("Notification {id} deleted"))))
}

route!(delete_my_notifications => Delete "/notifications" impl ShopDatabase, LiveChannel);
pub async fn delete_my_notifications<B: ShopDatabase, L: LiveChannel>(
    caller: Caller,
    api: web::Data<OrderFlowApi<B, L>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ DELETE all notifications for {}", caller.user_id);
    let count = api.notifier().delete_all_for(&caller.user_id).await?;
    Ok(HttpResponse::Ok().json(CountResponse { count }))
}

route!(send_notifications => Post "/admin/notifications" impl ShopDatabase, LiveChannel);
/// Sends a notification to every user the notification type's recipient policy selects. Admins only.
///
/// Responds with the number of notifications that were stored.
pub async fn send_notifications<B: ShopDatabase, L: LiveChannel>(
    caller: Caller,
    body: web::Json<BulkNotification>,
    api: web::Data<OrderFlowApi<B, L>>,
) -> Result<HttpResponse, ServerError> {
    caller.require_admin()?;
    let notification = body.into_inner();
    let BulkNotification { notification_type, title, .. } = &notification;
    info!("💻️ {} is sending a {notification_type} notification: {title}", caller.user_id);
    let sent = api.notifier().notify_many(notification).await?;
    Ok(HttpResponse::Ok().json(BulkSendResult { sent }))
}

/// Only the recipient may act on a notification.
async fn check_recipient<B: ShopDatabase, L: LiveChannel>(
    caller: &Caller,
    id: NotificationId,
    api: &OrderFlowApi<B, L>,
) -> Result<(), ServerError> {
    let notification = api.notifier().fetch(id).await?;
    if notification.recipient == caller.user_id {
        Ok(())
    } else {
        debug!("💻️ {} may not modify notification {id}", caller.user_id);
        Err(ServerError::InsufficientPermissions(format!("Notification {id} belongs to another user")))
    }
}
