//! Login and registration; a successful call installs the bearer token
//! on the [`ApiClient`].

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::{ApiClient, ApiClientError};

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: Uuid,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user: UserInfo,
    pub token: String,
}

pub async fn register(
    api: &mut ApiClient,
    email: &str,
    password: &str,
) -> Result<Session, ApiClientError> {
    let session: Session = api
        .post("/api/auth/register", &Credentials { email, password })
        .await?;
    api.set_token(Some(session.token.clone()));
    Ok(session)
}

pub async fn login(
    api: &mut ApiClient,
    email: &str,
    password: &str,
) -> Result<Session, ApiClientError> {
    let session: Session = api
        .post("/api/auth/login", &Credentials { email, password })
        .await?;
    api.set_token(Some(session.token.clone()));
    Ok(session)
}

/// Drop the stored token (local logout).
pub fn logout(api: &mut ApiClient) {
    api.set_token(None);
}
