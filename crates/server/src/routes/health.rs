use axum::{Router, response::Json as ResponseJson, routing::get};
use utils::response::ApiResponse;

use crate::AppState;

/// GET /
/// Liveness probe.
pub async fn health() -> ResponseJson<ApiResponse<()>> {
    ResponseJson(ApiResponse::success_with_message((), "Furniture API is running"))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(health))
}
