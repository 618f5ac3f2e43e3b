use std::{future::Future, pin::Pin, time::Duration};

use actix_web::{
    dev::Server,
    http::KeepAlive,
    middleware::Logger,
    web,
    App,
    HttpServer,
    Scope,
};
use log::*;
use shop_engine::{
    events::{EventHandlers, EventHooks, EventProducers},
    BroadcastLiveChannel,
    OrderFlowApi,
    SqliteDatabase,
};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    live_stream::notification_stream,
    routes::{
        health,
        AllOrdersRoute,
        CancelOrderRoute,
        CreateOrderRoute,
        DeleteMyNotificationsRoute,
        DeleteNotificationRoute,
        DeliverOrderRoute,
        HideOrderRoute,
        MarkAllReadRoute,
        MarkReadRoute,
        MyNotificationsRoute,
        MyOrdersRoute,
        OrderByIdRoute,
        PayOrderRoute,
        SendNotificationsRoute,
        ShipOrderRoute,
        TrackOrderRoute,
        UnhideOrderRoute,
        UnreadCountRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, config.max_connections).await?;
    if config.run_migrations {
        db.migrate().await?;
    }
    let live = BroadcastLiveChannel::new(config.live_channel_capacity);
    let handlers = EventHandlers::new(config.event_buffer_size, logging_hooks());
    let producers = handlers.producers();
    let _tasks = handlers.start_handlers();
    let srv = create_server_instance(config, db, live, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

/// Hooks that write every order event to the log. Integrations with fulfilment or analytics would be registered here.
fn logging_hooks() -> EventHooks {
    let mut hooks = EventHooks::default();
    hooks
        .on_order_created(|ev| {
            Box::pin(async move {
                let order = &ev.order;
                info!(
                    "📬️ Order {} [{}] placed by {} for {}",
                    order.id, order.order_number, order.user_id, order.total_price
                );
            }) as Pin<Box<dyn Future<Output = ()> + Send>>
        })
        .on_status_changed(|ev| {
            Box::pin(async move {
                info!("📬️ Order {} is now {} after '{}'", ev.order.id, ev.new_status(), ev.action);
            }) as Pin<Box<dyn Future<Output = ()> + Send>>
        });
    hooks
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    live: BroadcastLiveChannel,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let srv = HttpServer::new(move || {
        let orders_api = OrderFlowApi::new(db.clone(), live.clone(), producers.clone());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("shop::access_log"))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(live.clone()))
            .service(health)
            .service(api_scope())
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}

/// All the `/api` routes, bound to the SQLite backend and the in-process live channel.
pub fn api_scope() -> Scope {
    web::scope("/api")
        .service(CreateOrderRoute::<SqliteDatabase, BroadcastLiveChannel>::new())
        .service(MyOrdersRoute::<SqliteDatabase, BroadcastLiveChannel>::new())
        .service(OrderByIdRoute::<SqliteDatabase, BroadcastLiveChannel>::new())
        .service(TrackOrderRoute::<SqliteDatabase, BroadcastLiveChannel>::new())
        .service(PayOrderRoute::<SqliteDatabase, BroadcastLiveChannel>::new())
        .service(CancelOrderRoute::<SqliteDatabase, BroadcastLiveChannel>::new())
        .service(HideOrderRoute::<SqliteDatabase, BroadcastLiveChannel>::new())
        .service(UnhideOrderRoute::<SqliteDatabase, BroadcastLiveChannel>::new())
        .service(AllOrdersRoute::<SqliteDatabase, BroadcastLiveChannel>::new())
        .service(ShipOrderRoute::<SqliteDatabase, BroadcastLiveChannel>::new())
        .service(DeliverOrderRoute::<SqliteDatabase, BroadcastLiveChannel>::new())
        .service(notification_stream)
        .service(UnreadCountRoute::<SqliteDatabase, BroadcastLiveChannel>::new())
        .service(MarkAllReadRoute::<SqliteDatabase, BroadcastLiveChannel>::new())
        .service(MarkReadRoute::<SqliteDatabase, BroadcastLiveChannel>::new())
        .service(MyNotificationsRoute::<SqliteDatabase, BroadcastLiveChannel>::new())
        .service(DeleteMyNotificationsRoute::<SqliteDatabase, BroadcastLiveChannel>::new())
        .service(DeleteNotificationRoute::<SqliteDatabase, BroadcastLiveChannel>::new())
        .service(SendNotificationsRoute::<SqliteDatabase, BroadcastLiveChannel>::new())
}
