//! Checkout: turn a cart into an immutable order.
//!
//! Snapshotting the order and clearing the cart happen in one
//! transaction, so an order can never be recorded while the cart still
//! holds the already-ordered lines.

use chrono::Utc;
use db::models::{
    cart::Cart,
    order::{CreateOrder, Order, OrderDetails, OrderLineItem},
};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("cart is empty")]
    EmptyCart,
    #[error("order not found")]
    OrderNotFound,
    #[error("corrupt order snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
}

pub struct OrderService;

impl OrderService {
    /// Create an order from the caller's cart and leave the cart empty.
    pub async fn create_order(
        pool: &SqlitePool,
        user_id: Uuid,
        data: CreateOrder,
    ) -> Result<OrderDetails, OrderError> {
        let mut tx = pool.begin().await?;

        let cart = Cart::find_by_user_id(&mut *tx, user_id)
            .await?
            .ok_or(OrderError::EmptyCart)?;
        let lines = Cart::items(&mut *tx, cart.id).await?;
        if lines.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        let snapshot: Vec<OrderLineItem> = lines.iter().map(OrderLineItem::from).collect();
        let items_json = serde_json::to_string(&snapshot)?;
        let shipping_json = serde_json::to_string(&data.shipping_address)?;
        let payment_json = serde_json::to_string(&data.payment_details)?;

        let order = Order::create(
            &mut tx,
            Uuid::new_v4(),
            user_id,
            &items_json,
            cart.total,
            &shipping_json,
            &payment_json,
        )
        .await?;
        Cart::clear_items(&mut *tx, cart.id).await?;
        Cart::recompute_total(&mut *tx, cart.id).await?;

        tx.commit().await?;

        info!(order_id = %order.id, %user_id, total = order.total, "order created, cart cleared");
        Ok(order.into_details(Utc::now())?)
    }

    /// The caller's orders, newest first, with display status computed now.
    pub async fn list_orders(
        pool: &SqlitePool,
        user_id: Uuid,
    ) -> Result<Vec<OrderDetails>, OrderError> {
        let now = Utc::now();
        Order::find_by_user_id(pool, user_id)
            .await?
            .into_iter()
            .map(|order| order.into_details(now).map_err(OrderError::from))
            .collect()
    }

    pub async fn get_order(
        pool: &SqlitePool,
        user_id: Uuid,
        order_id: Uuid,
    ) -> Result<OrderDetails, OrderError> {
        let order = Order::find_by_id(pool, order_id)
            .await?
            .filter(|order| order.user_id == user_id)
            .ok_or(OrderError::OrderNotFound)?;
        Ok(order.into_details(Utc::now())?)
    }
}
