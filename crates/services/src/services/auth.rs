//! Account registration, login and token issuance.

use db::models::user::{User, UserInfo};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;
use ts_rs::TS;
use utils::jwt::{self, TokenError};
use uuid::Uuid;

/// Same work factor the legacy backend used.
const BCRYPT_COST: u32 = 10;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("user already exists")]
    EmailTaken,
    // Unknown email and wrong password share one message.
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("user not found")]
    UserNotFound,
    #[error("password hash error: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error(transparent)]
    Token(#[from] TokenError),
}

/// Successful register/login payload.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user: UserInfo,
    pub token: String,
}

pub struct AuthService;

impl AuthService {
    pub async fn register(
        pool: &SqlitePool,
        jwt_secret: &str,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        if User::find_by_email(pool, email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = bcrypt::hash(password, BCRYPT_COST)?;
        let user = User::create(pool, Uuid::new_v4(), email, &password_hash).await?;
        let token = jwt::encode_token(jwt_secret, user.id, &user.email)?;

        info!(user_id = %user.id, "registered new user");
        Ok(Session {
            user: user.into(),
            token,
        })
    }

    pub async fn login(
        pool: &SqlitePool,
        jwt_secret: &str,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        let user = User::find_by_email(pool, email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        if !bcrypt::verify(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let token = jwt::encode_token(jwt_secret, user.id, &user.email)?;
        Ok(Session {
            user: user.into(),
            token,
        })
    }

    pub async fn get_user(pool: &SqlitePool, user_id: Uuid) -> Result<UserInfo, AuthError> {
        let user = User::find_by_id(pool, user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        Ok(user.into())
    }
}
