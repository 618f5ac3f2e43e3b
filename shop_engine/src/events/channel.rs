//! Stateless pub-sub for engine events.
//!
//! Other parts of the system can subscribe to order events and react to them, e.g. to send an e-mail when an order
//! ships. Handlers only ever see the event itself, never the engine's internal state. They may be async, and every
//! event is handled on its own task, so a slow handler never holds up the order flow that emitted the event.
use std::{future::Future, pin::Pin, sync::Arc};

use log::*;
use tokio::{sync::mpsc, task::JoinSet};

pub type Handler<E> = Arc<dyn Fn(E) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

pub struct EventHandler<E: Send + Sync + 'static> {
    listener: mpsc::Receiver<E>,
    sender: mpsc::Sender<E>,
    handler: Handler<E>,
}

impl<E: Send + Sync + 'static> EventHandler<E> {
    pub fn new(buffer_size: usize, handler: Handler<E>) -> Self {
        let (sender, listener) = mpsc::channel(buffer_size);
        Self { listener, sender, handler }
    }

    pub fn subscribe(&self) -> EventProducer<E> {
        EventProducer::new(self.sender.clone())
    }

    /// Runs until every [`EventProducer`] has been dropped, then waits for in-flight handler jobs to finish.
    pub async fn start_handler(self) {
        debug!("📬️ Starting event handler");
        let Self { mut listener, sender, handler } = self;
        // Only producers should keep the channel open, otherwise the loop below would never end
        drop(sender);
        let mut jobs = JoinSet::new();
        while let Some(ev) = listener.recv().await {
            trace!("📬️ Handling event");
            let handler = Arc::clone(&handler);
            jobs.spawn(async move { (handler)(ev).await });
            // Reap finished jobs so the set does not grow without bound on a long-lived server
            while let Some(done) = jobs.try_join_next() {
                if let Err(e) = done {
                    warn!("📬️ An event handler job failed. {e}");
                }
            }
        }
        debug!("📬️ All producers are gone. Waiting for {} outstanding jobs", jobs.len());
        while let Some(done) = jobs.join_next().await {
            if let Err(e) = done {
                warn!("📬️ An event handler job failed. {e}");
            }
        }
        debug!("📬️ Event handler has shut down");
    }
}

#[derive(Clone)]
pub struct EventProducer<E: Send + Sync> {
    sender: mpsc::Sender<E>,
}

impl<E: Send + Sync> EventProducer<E> {
    pub fn new(sender: mpsc::Sender<E>) -> Self {
        Self { sender }
    }

    /// Hands the event to the handler. Delivery failures are logged, never returned, since a broken hook must not
    /// affect the operation that triggered it.
    pub async fn publish_event(&self, event: E) {
        if let Err(e) = self.sender.send(event).await {
            error!("📬️ Failed to send event: {e}");
        }
    }
}
