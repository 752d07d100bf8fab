use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqliteConnection};
use ts_rs::TS;
use uuid::Uuid;

use super::product::Product;

/// Per-user cart row. `total` is denormalized and must be refreshed with
/// [`Cart::recompute_total`] in the same transaction as any line change.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: Uuid,
    pub user_id: Uuid,
    pub total: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One product's line within a cart. Title, price and image are snapshots
/// taken when the line was first added.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    pub id: Uuid,
    pub cart_id: Uuid,
    pub product_id: Uuid,
    pub title: String,
    pub price: f64,
    pub image_url: String,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Wire form of a cart: its lines plus the stored total.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CartWithItems {
    pub items: Vec<CartLineItem>,
    pub total: f64,
}

const CART_COLUMNS: &str = "id, user_id, total, created_at, updated_at";
const LINE_COLUMNS: &str =
    "id, cart_id, product_id, title, price, image_url, quantity, created_at, updated_at";

impl Cart {
    pub async fn find_by_user_id<'e, E>(
        executor: E,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Cart>(&format!(
            "SELECT {CART_COLUMNS} FROM carts WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(executor)
        .await
    }

    /// Return the user's cart, creating an empty one on first access.
    pub async fn get_or_create(
        conn: &mut SqliteConnection,
        user_id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query("INSERT INTO carts (id, user_id) VALUES ($1, $2) ON CONFLICT(user_id) DO NOTHING")
            .bind(Uuid::new_v4())
            .bind(user_id)
            .execute(&mut *conn)
            .await?;
        sqlx::query_as::<_, Cart>(&format!(
            "SELECT {CART_COLUMNS} FROM carts WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_one(conn)
        .await
    }

    pub async fn items<'e, E>(executor: E, cart_id: Uuid) -> Result<Vec<CartLineItem>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, CartLineItem>(&format!(
            "SELECT {LINE_COLUMNS} FROM cart_items WHERE cart_id = $1 ORDER BY created_at ASC"
        ))
        .bind(cart_id)
        .fetch_all(executor)
        .await
    }

    /// Merge a product into the cart: increment the existing line's
    /// quantity, or append a new line snapshotting the product's current
    /// title/price/image. The (cart_id, product_id) uniqueness constraint
    /// makes the merge atomic.
    pub async fn upsert_item<'e, E>(
        executor: E,
        cart_id: Uuid,
        product: &Product,
        quantity: i64,
    ) -> Result<(), sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            r#"INSERT INTO cart_items (id, cart_id, product_id, title, price, image_url, quantity)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               ON CONFLICT(cart_id, product_id)
               DO UPDATE SET quantity = quantity + excluded.quantity,
                             updated_at = datetime('now', 'subsec')"#,
        )
        .bind(Uuid::new_v4())
        .bind(cart_id)
        .bind(product.id)
        .bind(&product.title)
        .bind(product.price)
        .bind(&product.image_url)
        .bind(quantity)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Overwrite a line's quantity. Returns the number of affected rows;
    /// zero means the cart has no line for this product.
    pub async fn set_item_quantity<'e, E>(
        executor: E,
        cart_id: Uuid,
        product_id: Uuid,
        quantity: i64,
    ) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            r#"UPDATE cart_items
               SET quantity = $3, updated_at = datetime('now', 'subsec')
               WHERE cart_id = $1 AND product_id = $2"#,
        )
        .bind(cart_id)
        .bind(product_id)
        .bind(quantity)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn remove_item<'e, E>(
        executor: E,
        cart_id: Uuid,
        product_id: Uuid,
    ) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM cart_items WHERE cart_id = $1 AND product_id = $2")
            .bind(cart_id)
            .bind(product_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn clear_items<'e, E>(executor: E, cart_id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
            .bind(cart_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    /// Refresh the stored total from the cart's own lines and return it.
    /// Must run inside the transaction that changed the lines, so items
    /// and total never diverge.
    pub async fn recompute_total<'e, E>(executor: E, cart_id: Uuid) -> Result<f64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_scalar::<_, f64>(
            r#"UPDATE carts
               SET total = COALESCE(
                       (SELECT SUM(price * quantity) FROM cart_items WHERE cart_id = $1),
                       0),
                   updated_at = datetime('now', 'subsec')
               WHERE id = $1
               RETURNING total"#,
        )
        .bind(cart_id)
        .fetch_one(executor)
        .await
    }
}
