//! Typed catalog calls.

use serde::Deserialize;
use uuid::Uuid;

use crate::{
    api::{ApiClient, ApiClientError},
    cart::de_price,
};

/// Catalog entry as the API returns it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub title: String,
    #[serde(deserialize_with = "de_price")]
    pub price: f64,
    pub image_url: String,
    pub merchant_id: String,
    pub merchant_name: Option<String>,
    #[serde(default)]
    pub description: String,
    pub dimensions: Option<String>,
    pub materials: Option<String>,
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub stock: i64,
    pub rating: Option<f64>,
    pub review_count: Option<i64>,
}

pub async fn get_products(api: &ApiClient) -> Result<Vec<Product>, ApiClientError> {
    api.get("/api/furniture").await
}

pub async fn get_merchant_products(
    api: &ApiClient,
    merchant_id: &str,
) -> Result<Vec<Product>, ApiClientError> {
    api.get(&format!("/api/furniture?merchantId={merchant_id}"))
        .await
}

pub async fn get_product(api: &ApiClient, id: Uuid) -> Result<Product, ApiClientError> {
    api.get(&format!("/api/furniture/{id}")).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_parses_legacy_string_price() {
        let product: Product = serde_json::from_value(serde_json::json!({
            "id": Uuid::new_v4(),
            "title": "STRANDMON",
            "price": "299",
            "imageUrl": "https://example.com/p.jpg",
            "merchantId": "merchant_1",
            "tags": ["Living Room", "Chair"]
        }))
        .unwrap();
        assert_eq!(product.price, 299.0);
        assert_eq!(product.stock, 0);
        assert_eq!(product.tags.unwrap().len(), 2);
    }
}
