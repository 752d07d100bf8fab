//! Cart endpoints. The caller's identity comes from the bearer token;
//! every response carries the authoritative `{items, total}` view.

use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{delete, get, post},
};
use db::models::cart::CartWithItems;
use serde::{Deserialize, Serialize};
use services::services::cart::CartService;
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, auth::AuthUser, error::ApiError};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CartMutation {
    pub product_id: Uuid,
    pub quantity: i64,
}

/// GET /api/cart
pub async fn get_cart(
    State(app): State<AppState>,
    user: AuthUser,
) -> Result<ResponseJson<ApiResponse<CartWithItems>>, ApiError> {
    let cart = CartService::get_cart(&app.db().pool, user.id).await?;
    Ok(ResponseJson(ApiResponse::success(cart)))
}

/// POST /api/cart/add
pub async fn add_item(
    State(app): State<AppState>,
    user: AuthUser,
    axum::Json(payload): axum::Json<CartMutation>,
) -> Result<ResponseJson<ApiResponse<CartWithItems>>, ApiError> {
    let cart =
        CartService::add_item(&app.db().pool, user.id, payload.product_id, payload.quantity)
            .await?;
    Ok(ResponseJson(ApiResponse::success(cart)))
}

/// POST /api/cart/update
/// A quantity of zero or below removes the line.
pub async fn update_item(
    State(app): State<AppState>,
    user: AuthUser,
    axum::Json(payload): axum::Json<CartMutation>,
) -> Result<ResponseJson<ApiResponse<CartWithItems>>, ApiError> {
    let cart = CartService::update_quantity(
        &app.db().pool,
        user.id,
        payload.product_id,
        payload.quantity,
    )
    .await?;
    Ok(ResponseJson(ApiResponse::success(cart)))
}

/// DELETE /api/cart/{product_id}
pub async fn remove_item(
    State(app): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<CartWithItems>>, ApiError> {
    let cart = CartService::remove_item(&app.db().pool, user.id, product_id).await?;
    Ok(ResponseJson(ApiResponse::success(cart)))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/cart",
        Router::new()
            .route("/", get(get_cart))
            .route("/add", post(add_item))
            .route("/update", post(update_item))
            .route("/{product_id}", delete(remove_item)),
    )
}
