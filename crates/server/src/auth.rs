use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use utils::jwt;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// Authenticated caller, extracted from the `Authorization: Bearer`
/// header. Cart and order handlers take their user identity from here
/// only, never from the request body.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;
        let token = header_value
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthorized)?;
        let claims = jwt::decode_token(&state.config().jwt_secret, token)
            .map_err(|_| ApiError::Unauthorized)?;
        Ok(Self {
            id: claims.sub,
            email: claims.email,
        })
    }
}
