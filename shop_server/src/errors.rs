use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use shop_engine::{NotificationError, OrderFlowError, SqliteDatabaseError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Unspecified error. {0}")]
    Unspecified(String),
    #[error("No caller identity was provided")]
    MissingIdentity,
    #[error("The caller identity is not valid. {0}")]
    InvalidIdentity(String),
    #[error("Insufficient Permissions. {0}")]
    InsufficientPermissions(String),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("Invalid request. {0}")]
    InvalidRequest(String),
    #[error("{0}")]
    InvalidTransition(String),
    #[error("{0}")]
    OutOfStock(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::MissingIdentity => StatusCode::UNAUTHORIZED,
            Self::InvalidIdentity(_) => StatusCode::UNAUTHORIZED,
            Self::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::InvalidTransition(_) => StatusCode::CONFLICT,
            Self::OutOfStock(_) => StatusCode::CONFLICT,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

impl From<OrderFlowError> for ServerError {
    fn from(e: OrderFlowError) -> Self {
        match e {
            OrderFlowError::DatabaseError(s) => Self::BackendError(format!("Database error: {s}")),
            OrderFlowError::OrderNotFound(_) |
            OrderFlowError::OrderNumberNotFound(_) |
            OrderFlowError::ProductNotFound(_) |
            OrderFlowError::UserNotFound(_) => Self::NoRecordFound(e.to_string()),
            OrderFlowError::OutOfStock { .. } => Self::OutOfStock(e.to_string()),
            OrderFlowError::InvalidTransition { .. } => Self::InvalidTransition(e.to_string()),
            OrderFlowError::EmptyOrder | OrderFlowError::InvalidQuantity { .. } | OrderFlowError::PriceOverflow => {
                Self::InvalidRequest(e.to_string())
            },
            OrderFlowError::Notification(_) => Self::BackendError(e.to_string()),
        }
    }
}

impl From<NotificationError> for ServerError {
    fn from(e: NotificationError) -> Self {
        match e {
            NotificationError::DatabaseError(s) => Self::BackendError(format!("Database error: {s}")),
            NotificationError::NotificationNotFound(_) | NotificationError::RecipientNotFound(_) => {
                Self::NoRecordFound(e.to_string())
            },
        }
    }
}

impl From<SqliteDatabaseError> for ServerError {
    fn from(e: SqliteDatabaseError) -> Self {
        Self::InitializeError(e.to_string())
    }
}

#[cfg(test)]
mod test {
    use shop_engine::db_types::{OrderAction, OrderId, OrderStatusType, ProductId};

    use super::*;

    #[test]
    fn engine_errors_map_to_status_codes() {
        let e = ServerError::from(OrderFlowError::OrderNotFound(OrderId(1)));
        assert_eq!(e.status_code(), StatusCode::NOT_FOUND);
        let e = ServerError::from(OrderFlowError::OutOfStock { product_id: ProductId(1), requested: 5, available: 3 });
        assert_eq!(e.status_code(), StatusCode::CONFLICT);
        let e = ServerError::from(OrderFlowError::InvalidTransition {
            order_id: OrderId(1),
            status: OrderStatusType::Canceled,
            action: OrderAction::Cancel,
        });
        assert_eq!(e.status_code(), StatusCode::CONFLICT);
        assert_eq!(e.to_string(), "Cannot cancel order #1 because it is CANCELED");
        let e = ServerError::from(OrderFlowError::EmptyOrder);
        assert_eq!(e.status_code(), StatusCode::BAD_REQUEST);
        let e = ServerError::from(NotificationError::DatabaseError("disk full".into()));
        assert_eq!(e.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ServerError::MissingIdentity.status_code(), StatusCode::UNAUTHORIZED);
    }
}
