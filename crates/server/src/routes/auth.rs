//! Registration, login and the current-user endpoint.

use axum::{
    Router,
    extract::State,
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::user::UserInfo;
use serde::{Deserialize, Serialize};
use services::services::auth::{AuthService, Session};
use ts_rs::TS;
use utils::response::ApiResponse;

use crate::{AppState, auth::AuthUser, error::ApiError};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    fn validate(&self) -> Result<(), ApiError> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(ApiError::BadRequest(
                "Email and password are required".to_string(),
            ));
        }
        Ok(())
    }
}

/// POST /api/auth/register
pub async fn register(
    State(app): State<AppState>,
    axum::Json(payload): axum::Json<Credentials>,
) -> Result<ResponseJson<ApiResponse<Session>>, ApiError> {
    payload.validate()?;
    let session = AuthService::register(
        &app.db().pool,
        &app.config().jwt_secret,
        payload.email.trim(),
        &payload.password,
    )
    .await?;
    Ok(ResponseJson(ApiResponse::success_with_message(
        session,
        "User created successfully",
    )))
}

/// POST /api/auth/login
pub async fn login(
    State(app): State<AppState>,
    axum::Json(payload): axum::Json<Credentials>,
) -> Result<ResponseJson<ApiResponse<Session>>, ApiError> {
    payload.validate()?;
    let session = AuthService::login(
        &app.db().pool,
        &app.config().jwt_secret,
        payload.email.trim(),
        &payload.password,
    )
    .await?;
    Ok(ResponseJson(ApiResponse::success_with_message(
        session,
        "Login successful",
    )))
}

/// GET /api/auth/me
pub async fn me(
    State(app): State<AppState>,
    user: AuthUser,
) -> Result<ResponseJson<ApiResponse<UserInfo>>, ApiError> {
    let info = AuthService::get_user(&app.db().pool, user.id).await?;
    Ok(ResponseJson(ApiResponse::success(info)))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/auth",
        Router::new()
            .route("/register", post(register))
            .route("/login", post(login))
            .route("/me", get(me)),
    )
}
