//! Checkout and order history. Each response recomputes the derived
//! display status from the order's age.

use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::order::{CreateOrder, OrderDetails};
use services::services::order::OrderService;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, auth::AuthUser, error::ApiError};

/// POST /api/orders
/// Create an order from the caller's cart; fails when the cart is empty.
pub async fn create_order(
    State(app): State<AppState>,
    user: AuthUser,
    axum::Json(payload): axum::Json<CreateOrder>,
) -> Result<ResponseJson<ApiResponse<OrderDetails>>, ApiError> {
    let order = OrderService::create_order(&app.db().pool, user.id, payload).await?;
    Ok(ResponseJson(ApiResponse::success(order)))
}

/// GET /api/orders
pub async fn list_orders(
    State(app): State<AppState>,
    user: AuthUser,
) -> Result<ResponseJson<ApiResponse<Vec<OrderDetails>>>, ApiError> {
    let orders = OrderService::list_orders(&app.db().pool, user.id).await?;
    Ok(ResponseJson(ApiResponse::success(orders)))
}

/// GET /api/orders/{id}
pub async fn get_order(
    State(app): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<OrderDetails>>, ApiError> {
    let order = OrderService::get_order(&app.db().pool, user.id, id).await?;
    Ok(ResponseJson(ApiResponse::success(order)))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/orders",
        Router::new()
            .route("/", post(create_order).get(list_orders))
            .route("/{id}", get(get_order)),
    )
}
