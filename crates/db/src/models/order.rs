use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteConnection, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

use super::cart::CartLineItem;

/// Stored lifecycle status, settable by fulfilment tooling. Distinct from
/// [`CalculatedStatus`], which is derived from the order's age on every
/// read.
#[derive(Debug, Clone, Type, Serialize, Deserialize, PartialEq, TS, EnumString, Display, Default)]
#[sqlx(type_name = "order_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Completed,
    Cancelled,
}

/// Display status computed from how long ago the order was placed.
/// Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, Display)]
pub enum CalculatedStatus {
    Processing,
    Shipping,
    Arrived,
}

impl CalculatedStatus {
    /// Under 24 hours the order is `Processing`, under 72 `Shipping`,
    /// after that `Arrived`. Both boundaries belong to the later stage.
    pub fn for_age(created_at: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let age = now.signed_duration_since(created_at);
        if age < Duration::hours(24) {
            Self::Processing
        } else if age < Duration::hours(72) {
            Self::Shipping
        } else {
            Self::Arrived
        }
    }
}

/// One line of an order's item snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineItem {
    pub product_id: Uuid,
    pub title: String,
    pub price: f64,
    pub image_url: String,
    pub quantity: i64,
}

impl From<&CartLineItem> for OrderLineItem {
    fn from(line: &CartLineItem) -> Self {
        Self {
            product_id: line.product_id,
            title: line.title.clone(),
            price: line.price,
            image_url: line.image_url.clone(),
            quantity: line.quantity,
        }
    }
}

/// Destination recorded with an order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub full_name: String,
    pub address: String,
    pub city: String,
    pub state: Option<String>,
    pub postal_code: String,
    pub phone: String,
    pub email: Option<String>,
}

/// Request body for checkout. Payment details are an opaque descriptor
/// persisted verbatim with the order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrder {
    pub shipping_address: ShippingAddress,
    pub payment_details: serde_json::Value,
}

/// Order row. `items`, `shipping_address` and `payment_details` are
/// JSON-serialized snapshots; see the `parsed_*` helpers.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: String,
    pub total: f64,
    pub shipping_address: String,
    pub payment_details: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Wire form of an order, with snapshots decoded and the display status
/// computed at response time.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetails {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Vec<OrderLineItem>,
    pub total: f64,
    pub status: OrderStatus,
    pub calculated_status: CalculatedStatus,
    pub shipping_address: ShippingAddress,
    pub payment_details: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const ORDER_COLUMNS: &str =
    "id, user_id, items, total, shipping_address, payment_details, status, created_at, updated_at";

impl Order {
    /// Decode the stored snapshots and attach the status derived at `now`.
    pub fn into_details(self, now: DateTime<Utc>) -> Result<OrderDetails, serde_json::Error> {
        Ok(OrderDetails {
            id: self.id,
            user_id: self.user_id,
            items: serde_json::from_str(&self.items)?,
            total: self.total,
            status: self.status,
            calculated_status: CalculatedStatus::for_age(self.created_at, now),
            shipping_address: serde_json::from_str(&self.shipping_address)?,
            payment_details: serde_json::from_str(&self.payment_details)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }

    pub async fn create(
        conn: &mut SqliteConnection,
        id: Uuid,
        user_id: Uuid,
        items_json: &str,
        total: f64,
        shipping_json: &str,
        payment_json: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Order>(&format!(
            r#"INSERT INTO orders (id, user_id, items, total, shipping_address, payment_details)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING {ORDER_COLUMNS}"#
        ))
        .bind(id)
        .bind(user_id)
        .bind(items_json)
        .bind(total)
        .bind(shipping_json)
        .bind(payment_json)
        .fetch_one(conn)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Order>(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All of a user's orders, newest first.
    pub async fn find_by_user_id(
        pool: &SqlitePool,
        user_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    pub async fn update_status(
        pool: &SqlitePool,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE orders SET status = $2, updated_at = datetime('now', 'subsec') WHERE id = $1",
        )
        .bind(id)
        .bind(status)
        .execute(pool)
        .await?;
        Ok(())
    }
}
