//! Typed checkout and order-history calls.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    api::{ApiClient, ApiClientError},
    cart::CartLine,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub full_name: String,
    pub address: String,
    pub city: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    pub postal_code: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// An order as the API returns it. `calculated_status` is derived from
/// the order's age by the server on every read.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub id: Uuid,
    pub items: Vec<CartLine>,
    pub total: f64,
    pub status: String,
    pub calculated_status: String,
    pub shipping_address: ShippingAddress,
    pub payment_details: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateOrderRequest<'a> {
    shipping_address: &'a ShippingAddress,
    payment_details: &'a serde_json::Value,
}

/// Create an order from the server-side cart (called when the user pays).
pub async fn create_order(
    api: &ApiClient,
    shipping_address: &ShippingAddress,
    payment_details: &serde_json::Value,
) -> Result<OrderRecord, ApiClientError> {
    api.post(
        "/api/orders",
        &CreateOrderRequest {
            shipping_address,
            payment_details,
        },
    )
    .await
}

/// All orders for the current user, newest first.
pub async fn get_orders(api: &ApiClient) -> Result<Vec<OrderRecord>, ApiClientError> {
    api.get("/api/orders").await
}

pub async fn get_order(api: &ApiClient, order_id: Uuid) -> Result<OrderRecord, ApiClientError> {
    api.get(&format!("/api/orders/{order_id}")).await
}
