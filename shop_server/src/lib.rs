//! # Shop server
//! This module hosts the HTTP front end of the shop engine. It is responsible for:
//! * Identifying the caller from the headers set by the upstream gateway.
//! * Exposing the order lifecycle and the notification inbox as JSON endpoints.
//! * Streaming live notifications to connected sessions as Server-Sent Events.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/api/orders/...`: Checkout and the customer side of the order lifecycle.
//! * `/api/admin/...`: Shipping, delivery, the full order list and bulk notifications. Admins only.
//! * `/api/notifications/...`: The caller's notification inbox and live stream.

pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod live_stream;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
