//! Database management and control.
//!
//! You should rarely need to reach into this module directly. The public APIs in [`crate::shop_api`] wrap the
//! backends and expose the order and notification flows.
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub mod traits;
