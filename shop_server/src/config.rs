use std::{env, fmt::Display, str::FromStr};

use log::*;
use shop_common::helpers::parse_boolean_flag;

const DEFAULT_SHOP_HOST: &str = "127.0.0.1";
const DEFAULT_SHOP_PORT: u16 = 8360;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/shop_store.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 25;
const DEFAULT_LIVE_CHANNEL_CAPACITY: usize = 256;
const DEFAULT_EVENT_BUFFER_SIZE: usize = 64;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
    /// How many pushes each live session may fall behind before it starts skipping.
    pub live_channel_capacity: usize,
    /// How many events may be queued for each event hook.
    pub event_buffer_size: usize,
    /// If true, pending database migrations are applied on start-up.
    pub run_migrations: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SHOP_HOST.to_string(),
            port: DEFAULT_SHOP_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            live_channel_capacity: DEFAULT_LIVE_CHANNEL_CAPACITY,
            event_buffer_size: DEFAULT_EVENT_BUFFER_SIZE,
            run_migrations: true,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("SHOP_HOST").ok().unwrap_or_else(|| DEFAULT_SHOP_HOST.into());
        let port = parse_or_default("SHOP_PORT", env::var("SHOP_PORT").ok(), DEFAULT_SHOP_PORT);
        let database_url = env::var("SHOP_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ SHOP_DATABASE_URL is not set. Using {DEFAULT_DATABASE_URL}");
            DEFAULT_DATABASE_URL.into()
        });
        let max_connections = parse_or_default(
            "SHOP_DB_MAX_CONNECTIONS",
            env::var("SHOP_DB_MAX_CONNECTIONS").ok(),
            DEFAULT_MAX_CONNECTIONS,
        );
        let live_channel_capacity = parse_or_default(
            "SHOP_LIVE_CHANNEL_CAPACITY",
            env::var("SHOP_LIVE_CHANNEL_CAPACITY").ok(),
            DEFAULT_LIVE_CHANNEL_CAPACITY,
        );
        let event_buffer_size = parse_or_default(
            "SHOP_EVENT_BUFFER_SIZE",
            env::var("SHOP_EVENT_BUFFER_SIZE").ok(),
            DEFAULT_EVENT_BUFFER_SIZE,
        );
        let run_migrations = parse_boolean_flag(env::var("SHOP_RUN_MIGRATIONS").ok(), true);
        Self {
            host,
            port,
            database_url,
            max_connections,
            live_channel_capacity,
            event_buffer_size,
            run_migrations,
        }
    }
}

/// Parses an optional configuration value, falling back to `default` (with a log message) if it is missing or invalid.
fn parse_or_default<T>(name: &str, value: Option<String>, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match value {
        None => {
            info!("🪛️ {name} is not set. Using the default value of {default}.");
            default
        },
        Some(s) => s.trim().parse::<T>().unwrap_or_else(|e| {
            error!("🪛️ {s} is not a valid value for {name}. {e} Using the default, {default}, instead.");
            default
        }),
    }
}
