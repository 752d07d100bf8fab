use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

/// Catalog row. `tags` holds a JSON-serialized array of strings; use
/// [`Product::parsed_tags`] or [`Product::into_data`] for the decoded form.
#[derive(Debug, Clone, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub title: String,
    pub price: f64,
    pub image_url: String,
    pub merchant_id: String,
    pub merchant_name: Option<String>,
    pub description: String,
    pub dimensions: Option<String>,
    pub materials: Option<String>,
    pub tags: Option<String>,
    pub stock: i64,
    pub rating: Option<f64>,
    pub review_count: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating a product (merchant upload).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CreateProduct {
    pub title: String,
    pub price: f64,
    pub image_url: String,
    pub merchant_id: String,
    pub merchant_name: Option<String>,
    pub description: Option<String>,
    pub dimensions: Option<String>,
    pub materials: Option<String>,
    pub tags: Option<Vec<String>>,
    pub stock: Option<i64>,
}

/// Wire form of a product, with tags decoded.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct ProductData {
    pub id: Uuid,
    pub title: String,
    pub price: f64,
    pub image_url: String,
    pub merchant_id: String,
    pub merchant_name: Option<String>,
    pub description: String,
    pub dimensions: Option<String>,
    pub materials: Option<String>,
    pub tags: Option<Vec<String>>,
    pub stock: i64,
    pub rating: Option<f64>,
    pub review_count: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Parse the tags JSON column into a list.
    pub fn parsed_tags(&self) -> Option<Vec<String>> {
        self.tags.as_ref().and_then(|json| serde_json::from_str(json).ok())
    }

    pub fn into_data(self) -> ProductData {
        let tags = self.parsed_tags();
        ProductData {
            id: self.id,
            title: self.title,
            price: self.price,
            image_url: self.image_url,
            merchant_id: self.merchant_id,
            merchant_name: self.merchant_name,
            description: self.description,
            dimensions: self.dimensions,
            materials: self.materials,
            tags,
            stock: self.stock,
            rating: self.rating,
            review_count: self.review_count,
            created_at: self.created_at,
        }
    }

    pub async fn create(
        pool: &SqlitePool,
        id: Uuid,
        data: &CreateProduct,
    ) -> Result<Self, sqlx::Error> {
        let tags_json = match &data.tags {
            Some(tags) => Some(
                serde_json::to_string(tags).map_err(|e| sqlx::Error::Protocol(e.to_string()))?,
            ),
            None => None,
        };
        sqlx::query_as::<_, Product>(
            r#"INSERT INTO products
                   (id, title, price, image_url, merchant_id, merchant_name,
                    description, dimensions, materials, tags, stock)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
               RETURNING id, title, price, image_url, merchant_id, merchant_name,
                         description, dimensions, materials, tags, stock,
                         rating, review_count, created_at, updated_at"#,
        )
        .bind(id)
        .bind(&data.title)
        .bind(data.price)
        .bind(&data.image_url)
        .bind(&data.merchant_id)
        .bind(&data.merchant_name)
        .bind(data.description.as_deref().unwrap_or_default())
        .bind(&data.dimensions)
        .bind(&data.materials)
        .bind(tags_json)
        .bind(data.stock.unwrap_or(0))
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Product>(
            r#"SELECT id, title, price, image_url, merchant_id, merchant_name,
                      description, dimensions, materials, tags, stock,
                      rating, review_count, created_at, updated_at
               FROM products
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Product>(
            r#"SELECT id, title, price, image_url, merchant_id, merchant_name,
                      description, dimensions, materials, tags, stock,
                      rating, review_count, created_at, updated_at
               FROM products
               ORDER BY created_at DESC"#,
        )
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_merchant_id(
        pool: &SqlitePool,
        merchant_id: &str,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Product>(
            r#"SELECT id, title, price, image_url, merchant_id, merchant_name,
                      description, dimensions, materials, tags, stock,
                      rating, review_count, created_at, updated_at
               FROM products
               WHERE merchant_id = $1
               ORDER BY created_at DESC"#,
        )
        .bind(merchant_id)
        .fetch_all(pool)
        .await
    }
}
