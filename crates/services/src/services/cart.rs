//! Server-side cart authority.
//!
//! Every mutation runs its read-merge-recompute-write sequence inside a
//! single transaction, so the stored total always matches the cart's own
//! lines and a crash mid-call cannot leave them diverged.

use db::models::{
    cart::{Cart, CartWithItems},
    product::Product,
};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CartError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("product not found: {0}")]
    ProductNotFound(Uuid),
    #[error("no cart for user")]
    CartNotFound,
}

pub struct CartService;

impl CartService {
    /// The user's cart, created empty on first access.
    pub async fn get_cart(pool: &SqlitePool, user_id: Uuid) -> Result<CartWithItems, CartError> {
        let mut conn = pool.acquire().await?;
        let cart = Cart::get_or_create(&mut conn, user_id).await?;
        let items = Cart::items(&mut *conn, cart.id).await?;
        Ok(CartWithItems {
            items,
            total: cart.total,
        })
    }

    /// Merge `quantity` of a product into the cart. The product must
    /// exist; nothing is written otherwise.
    pub async fn add_item(
        pool: &SqlitePool,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i64,
    ) -> Result<CartWithItems, CartError> {
        let quantity = quantity.max(1);
        let product = Product::find_by_id(pool, product_id)
            .await?
            .ok_or(CartError::ProductNotFound(product_id))?;

        let mut tx = pool.begin().await?;
        let cart = Cart::get_or_create(&mut tx, user_id).await?;
        Cart::upsert_item(&mut *tx, cart.id, &product, quantity).await?;
        let total = Cart::recompute_total(&mut *tx, cart.id).await?;
        let items = Cart::items(&mut *tx, cart.id).await?;
        tx.commit().await?;

        debug!(%user_id, %product_id, quantity, total, "added to cart");
        Ok(CartWithItems { items, total })
    }

    /// Overwrite a line's quantity; zero or below removes the line. A
    /// positive quantity for a product that is not in the cart is a no-op.
    pub async fn update_quantity(
        pool: &SqlitePool,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i64,
    ) -> Result<CartWithItems, CartError> {
        let mut tx = pool.begin().await?;
        let cart = Cart::find_by_user_id(&mut *tx, user_id)
            .await?
            .ok_or(CartError::CartNotFound)?;
        if quantity <= 0 {
            Cart::remove_item(&mut *tx, cart.id, product_id).await?;
        } else {
            Cart::set_item_quantity(&mut *tx, cart.id, product_id, quantity).await?;
        }
        let total = Cart::recompute_total(&mut *tx, cart.id).await?;
        let items = Cart::items(&mut *tx, cart.id).await?;
        tx.commit().await?;

        debug!(%user_id, %product_id, quantity, total, "updated cart quantity");
        Ok(CartWithItems { items, total })
    }

    pub async fn remove_item(
        pool: &SqlitePool,
        user_id: Uuid,
        product_id: Uuid,
    ) -> Result<CartWithItems, CartError> {
        let mut tx = pool.begin().await?;
        let cart = Cart::find_by_user_id(&mut *tx, user_id)
            .await?
            .ok_or(CartError::CartNotFound)?;
        Cart::remove_item(&mut *tx, cart.id, product_id).await?;
        let total = Cart::recompute_total(&mut *tx, cart.id).await?;
        let items = Cart::items(&mut *tx, cart.id).await?;
        tx.commit().await?;

        debug!(%user_id, %product_id, total, "removed from cart");
        Ok(CartWithItems { items, total })
    }
}

#[cfg(test)]
mod tests {
    use db::{DBService, models::product::CreateProduct, models::user::User};

    use super::*;

    async fn test_db() -> DBService {
        DBService::new_in_memory().await.unwrap()
    }

    async fn seed_user(pool: &SqlitePool) -> Uuid {
        let id = Uuid::new_v4();
        User::create(pool, id, &format!("{id}@test.com"), "hash")
            .await
            .unwrap();
        id
    }

    async fn seed_product(pool: &SqlitePool, title: &str, price: f64) -> Uuid {
        let id = Uuid::new_v4();
        Product::create(
            pool,
            id,
            &CreateProduct {
                title: title.to_string(),
                price,
                image_url: "https://example.com/p.jpg".to_string(),
                merchant_id: "merchant_1".to_string(),
                merchant_name: None,
                description: None,
                dimensions: None,
                materials: None,
                tags: None,
                stock: Some(10),
            },
        )
        .await
        .unwrap();
        id
    }

    fn summed(cart: &CartWithItems) -> f64 {
        cart.items
            .iter()
            .map(|line| line.price * line.quantity as f64)
            .sum()
    }

    #[tokio::test]
    async fn test_add_twice_merges_into_one_line() {
        let db = test_db().await;
        let user = seed_user(&db.pool).await;
        let product = seed_product(&db.pool, "STRANDMON", 299.0).await;

        CartService::add_item(&db.pool, user, product, 1).await.unwrap();
        let cart = CartService::add_item(&db.pool, user, product, 1).await.unwrap();

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 2);
        assert_eq!(cart.total, 598.0);
    }

    #[tokio::test]
    async fn test_total_always_matches_lines() {
        let db = test_db().await;
        let user = seed_user(&db.pool).await;
        let chair = seed_product(&db.pool, "Rattan Chair", 159.0).await;
        let lamp = seed_product(&db.pool, "LUNAR Lamp", 89.0).await;
        let vase = seed_product(&db.pool, "Nordic Vase", 45.0).await;

        CartService::add_item(&db.pool, user, chair, 2).await.unwrap();
        CartService::add_item(&db.pool, user, lamp, 1).await.unwrap();
        CartService::update_quantity(&db.pool, user, chair, 5).await.unwrap();
        CartService::add_item(&db.pool, user, vase, 3).await.unwrap();
        CartService::remove_item(&db.pool, user, lamp).await.unwrap();
        let cart = CartService::update_quantity(&db.pool, user, vase, 1).await.unwrap();

        // Recomputed from the final state, not accumulated.
        assert_eq!(cart.total, summed(&cart));
        assert_eq!(cart.total, 5.0 * 159.0 + 45.0);
    }

    #[tokio::test]
    async fn test_set_quantity_zero_removes_line() {
        let db = test_db().await;
        let user = seed_user(&db.pool).await;
        let first = seed_product(&db.pool, "Velvet Sofa", 100.0).await;
        let second = seed_product(&db.pool, "Abstract Art", 50.0).await;

        CartService::add_item(&db.pool, user, first, 2).await.unwrap();
        let cart = CartService::add_item(&db.pool, user, second, 1).await.unwrap();
        assert_eq!(cart.total, 250.0);

        let cart = CartService::update_quantity(&db.pool, user, first, 0).await.unwrap();
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].product_id, second);
        assert_eq!(cart.total, 50.0);
    }

    #[tokio::test]
    async fn test_update_without_cart_fails() {
        let db = test_db().await;
        let user = seed_user(&db.pool).await;
        let product = seed_product(&db.pool, "Minimalist Desk", 249.0).await;

        let err = CartService::update_quantity(&db.pool, user, product, 2)
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::CartNotFound));
    }

    #[tokio::test]
    async fn test_update_missing_line_is_noop() {
        let db = test_db().await;
        let user = seed_user(&db.pool).await;
        let product = seed_product(&db.pool, "Eclipse Pendant", 399.0).await;
        let absent = seed_product(&db.pool, "Jute Rug", 299.0).await;

        CartService::add_item(&db.pool, user, product, 1).await.unwrap();
        let cart = CartService::update_quantity(&db.pool, user, absent, 4).await.unwrap();

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.total, 399.0);
    }

    #[tokio::test]
    async fn test_add_unknown_product_mutates_nothing() {
        let db = test_db().await;
        let user = seed_user(&db.pool).await;

        let err = CartService::add_item(&db.pool, user, Uuid::new_v4(), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::ProductNotFound(_)));

        // No cart row was created on the failed path.
        let cart = Cart::find_by_user_id(&db.pool, user).await.unwrap();
        assert!(cart.is_none());
    }

    #[tokio::test]
    async fn test_get_cart_is_lazily_created_and_idempotent() {
        let db = test_db().await;
        let user = seed_user(&db.pool).await;

        let first = CartService::get_cart(&db.pool, user).await.unwrap();
        assert!(first.items.is_empty());
        assert_eq!(first.total, 0.0);

        let second = CartService::get_cart(&db.pool, user).await.unwrap();
        assert!(second.items.is_empty());

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM carts WHERE user_id = $1")
            .bind(user)
            .fetch_one(&db.pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_add_quantity_floor_is_one() {
        let db = test_db().await;
        let user = seed_user(&db.pool).await;
        let product = seed_product(&db.pool, "Weave Chair", 459.0).await;

        let cart = CartService::add_item(&db.pool, user, product, 0).await.unwrap();
        assert_eq!(cart.items[0].quantity, 1);
        assert_eq!(cart.total, 459.0);
    }
}
