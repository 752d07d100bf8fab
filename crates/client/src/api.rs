//! HTTP plumbing shared by the typed client calls.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use utils::response::ApiResponse;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ApiClientError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("timeout")]
    Timeout,
    #[error("http {status}: {message}")]
    Http { status: u16, message: String },
    #[error("unauthorized")]
    Unauthorized,
    #[error("json error: {0}")]
    Serde(String),
    #[error("response envelope carried no data")]
    MissingData,
}

impl ApiClientError {
    /// Returns true if the error is transient and worth retrying.
    pub fn should_retry(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout => true,
            Self::Http { status, .. } => (500..=599).contains(status),
            _ => false,
        }
    }
}

/// Thin wrapper around reqwest carrying the base URL and, once the user
/// has logged in, the bearer token.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiClientError> {
        let http = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .user_agent(concat!("furniture-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiClientError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiClientError> {
        self.send(self.http.get(self.url(path))).await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiClientError> {
        self.send(self.http.post(self.url(path)).json(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiClientError> {
        self.send(self.http.delete(self.url(path))).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiClientError> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request.send().await.map_err(map_reqwest_error)?;

        match response.status() {
            status if status.is_success() => {
                let envelope: ApiResponse<T> = response
                    .json()
                    .await
                    .map_err(|e| ApiClientError::Serde(e.to_string()))?;
                envelope.data.ok_or(ApiClientError::MissingData)
            }
            StatusCode::UNAUTHORIZED => Err(ApiClientError::Unauthorized),
            status => {
                let message = response
                    .json::<ApiResponse<serde_json::Value>>()
                    .await
                    .ok()
                    .and_then(|envelope| envelope.message)
                    .unwrap_or_default();
                Err(ApiClientError::Http {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }
}

fn map_reqwest_error(e: reqwest::Error) -> ApiClientError {
    if e.is_timeout() {
        ApiClientError::Timeout
    } else {
        ApiClientError::Transport(e.to_string())
    }
}
