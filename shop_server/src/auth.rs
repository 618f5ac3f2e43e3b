//! Caller identity.
//!
//! Sign-in and session management happen upstream of this server. The gateway in front of it authenticates the user
//! and forwards their identity in two headers:
//! * `x-shop-user` - the user id. Required.
//! * `x-shop-role` - `ADMIN` or `CUSTOMER`. Defaults to `CUSTOMER` when absent.
use std::future::{ready, Ready};

use actix_web::{dev::Payload, FromRequest, HttpRequest};
use log::debug;
use shop_engine::db_types::{Order, Role, UserId};

use crate::errors::ServerError;

pub const USER_HEADER: &str = "x-shop-user";
pub const ROLE_HEADER: &str = "x-shop-role";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: UserId,
    pub role: Role,
}

impl Caller {
    pub fn new<U: Into<UserId>>(user_id: U, role: Role) -> Self {
        Self { user_id: user_id.into(), role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_admin(&self) -> Result<(), ServerError> {
        if self.is_admin() {
            Ok(())
        } else {
            debug!("💻️ {} tried to use an admin endpoint", self.user_id);
            Err(ServerError::InsufficientPermissions("This endpoint is for administrators only".into()))
        }
    }

    /// Owners and admins may view and act on an order.
    pub fn can_access(&self, order: &Order) -> bool {
        self.is_admin() || order.is_owned_by(&self.user_id)
    }

    fn from_headers(req: &HttpRequest) -> Result<Self, ServerError> {
        let user_id = req
            .headers()
            .get(USER_HEADER)
            .ok_or(ServerError::MissingIdentity)?
            .to_str()
            .map_err(|e| ServerError::InvalidIdentity(e.to_string()))?
            .trim();
        if user_id.is_empty() {
            return Err(ServerError::MissingIdentity);
        }
        let role = match req.headers().get(ROLE_HEADER) {
            None => Role::Customer,
            Some(v) => v
                .to_str()
                .map_err(|e| ServerError::InvalidIdentity(e.to_string()))?
                .parse::<Role>()
                .map_err(|e| ServerError::InvalidIdentity(e.to_string()))?,
        };
        Ok(Self::new(user_id, role))
    }
}

impl FromRequest for Caller {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Self::from_headers(req))
    }
}
