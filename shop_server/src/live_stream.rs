//! Server-sent event stream for live notification pushes.
//!
//! Each connected client holds one subscription to the [`BroadcastLiveChannel`]. Pushes addressed to the caller, and
//! broadcasts on topics their role may see, are written as `notification` events. Pushes sent while the client is
//! disconnected are not replayed; clients reload their inbox on reconnect.
use actix_web::{get, http::header, web, HttpResponse};
use bytes::Bytes;
use futures::stream;
use log::*;
use shop_engine::{live_channel::LivePayload, BroadcastLiveChannel};

use crate::auth::Caller;

#[get("/notifications/stream")]
pub async fn notification_stream(caller: Caller, live: web::Data<BroadcastLiveChannel>) -> HttpResponse {
    debug!("💻️ GET notification stream for {}", caller.user_id);
    let subscription = live.subscribe(caller.user_id, caller.role);
    let events = stream::unfold(subscription, |mut sub| async move {
        loop {
            let payload = sub.next().await?;
            match sse_frame(&payload) {
                Ok(frame) => return Some((Ok::<_, actix_web::Error>(frame), sub)),
                Err(e) => warn!("📡️ Could not serialize push for {}. {e}", sub.user()),
            }
        }
    });
    HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, "text/event-stream"))
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        .streaming(events)
}

/// Formats a payload as a single server-sent event frame.
pub fn sse_frame(payload: &LivePayload) -> Result<Bytes, serde_json::Error> {
    let json = serde_json::to_string(payload)?;
    Ok(Bytes::from(format!("event: notification\ndata: {json}\n\n")))
}
