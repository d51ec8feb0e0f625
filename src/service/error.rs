use thiserror::Error;
use uuid::Uuid;

use crate::error::HttpError;
use axum::http::StatusCode;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Booking not found")]
    BookingNotFound(Uuid),

    #[error("Provider not found")]
    ProviderNotFound,

    #[error("Customer profile not found")]
    CustomerProfileNotFound,

    #[error("Provider profile not found")]
    ProviderProfileNotFound,

    #[error("{0}")]
    Forbidden(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Upstream collaborator failed: {0}")]
    Upstream(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<ServiceError> for HttpError {
    fn from(error: ServiceError) -> Self {
        match error {
            ServiceError::BookingNotFound(_)
            | ServiceError::ProviderNotFound
            | ServiceError::CustomerProfileNotFound
            | ServiceError::ProviderProfileNotFound => HttpError::not_found(error.to_string()),

            ServiceError::Forbidden(_) => HttpError::forbidden(error.to_string()),

            ServiceError::Validation(_) => HttpError::bad_request(error.to_string()),

            ServiceError::Conflict(_) => HttpError::conflict(error.to_string()),

            _ => HttpError::server_error(error.to_string()),
        }
    }
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::BookingNotFound(_)
            | ServiceError::ProviderNotFound
            | ServiceError::CustomerProfileNotFound
            | ServiceError::ProviderProfileNotFound => StatusCode::NOT_FOUND,

            ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,

            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,

            ServiceError::Conflict(_) => StatusCode::CONFLICT,

            ServiceError::Upstream(_) => StatusCode::BAD_GATEWAY,

            ServiceError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
