//! Furniture catalog endpoints.

use axum::{
    Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::product::{CreateProduct, Product, ProductData};
use serde::Deserialize;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListQuery {
    pub merchant_id: Option<String>,
}

/// GET /api/furniture
/// Full catalog, or one merchant's products when `merchantId` is given.
pub async fn list_products(
    State(app): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<ProductData>>>, ApiError> {
    let products = match query.merchant_id {
        Some(merchant_id) => Product::find_by_merchant_id(&app.db().pool, &merchant_id).await?,
        None => Product::find_all(&app.db().pool).await?,
    };
    let data = products.into_iter().map(Product::into_data).collect();
    Ok(ResponseJson(ApiResponse::success(data)))
}

/// GET /api/furniture/{id}
pub async fn get_product(
    State(app): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<ProductData>>, ApiError> {
    let product = Product::find_by_id(&app.db().pool, id)
        .await?
        .ok_or(ApiError::NotFound("product"))?;
    Ok(ResponseJson(ApiResponse::success(product.into_data())))
}

/// POST /api/furniture
/// Merchant upload.
pub async fn create_product(
    State(app): State<AppState>,
    axum::Json(payload): axum::Json<CreateProduct>,
) -> Result<ResponseJson<ApiResponse<ProductData>>, ApiError> {
    let product = Product::create(&app.db().pool, Uuid::new_v4(), &payload).await?;
    Ok(ResponseJson(ApiResponse::success(product.into_data())))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/furniture",
        Router::new()
            .route("/", get(list_products).post(create_product))
            .route("/{id}", get(get_product)),
    )
}
