use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use services::services::{auth::AuthError, cart::CartError, order::OrderError};
use thiserror::Error;
use utils::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Cart(#[from] CartError),
    #[error(transparent)]
    Order(#[from] OrderError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("invalid or missing access token")]
    Unauthorized,
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Auth(AuthError::EmailTaken) => StatusCode::CONFLICT,
            ApiError::Auth(AuthError::InvalidCredentials | AuthError::Token(_))
            | ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Auth(AuthError::UserNotFound)
            | ApiError::Cart(CartError::ProductNotFound(_) | CartError::CartNotFound)
            | ApiError::Order(OrderError::OrderNotFound)
            | ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Order(OrderError::EmptyCart) | ApiError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Auth(_) | ApiError::Cart(_) | ApiError::Order(_) | ApiError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("request failed: {self}");
        }
        (status, Json(ApiResponse::<()>::error(self.to_string()))).into_response()
    }
}
