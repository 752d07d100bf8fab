//! Local cart mirror with optimistic replication.
//!
//! Mutations land in the in-memory [`CartMirror`] first so the UI stays
//! responsive, then replicate to the server. When a replication request
//! fails, local optimism is discarded and the mirror is replaced with
//! the server's cart.

use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::{
    api::{ApiClient, ApiClientError},
    products::Product,
};

/// Accepts a price encoded either as a JSON number or as a string;
/// legacy catalog rows stored prices as text.
pub(crate) fn de_price<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(f64),
        Text(String),
    }
    match Raw::deserialize(deserializer)? {
        Raw::Num(value) => Ok(value),
        Raw::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// One product's line in the local cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: Uuid,
    pub title: String,
    #[serde(deserialize_with = "de_price")]
    pub price: f64,
    pub image_url: String,
    pub quantity: i64,
}

/// The server's `{items, total}` cart payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCart {
    #[serde(default)]
    pub items: Vec<CartLine>,
    #[serde(default)]
    pub total: f64,
}

/// Pure in-memory cart state. All mutations go through this narrow API;
/// the total is recomputed from the lines on every read, never
/// accumulated.
#[derive(Debug, Clone, Default)]
pub struct CartMirror {
    lines: Vec<CartLine>,
}

impl CartMirror {
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.lines
            .iter()
            .map(|line| line.price * line.quantity as f64)
            .sum()
    }

    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// Merge one unit of a product: bump the existing line or append a
    /// new one at quantity 1.
    pub fn apply_add(&mut self, line: CartLine) {
        if let Some(existing) = self
            .lines
            .iter_mut()
            .find(|l| l.product_id == line.product_id)
        {
            existing.quantity += 1;
        } else {
            self.lines.push(CartLine { quantity: 1, ..line });
        }
    }

    /// Overwrite a line's quantity; below one removes the line.
    pub fn apply_set_quantity(&mut self, product_id: Uuid, quantity: i64) {
        if quantity < 1 {
            self.apply_remove(product_id);
            return;
        }
        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product_id) {
            line.quantity = quantity;
        }
    }

    pub fn apply_remove(&mut self, product_id: Uuid) {
        self.lines.retain(|line| line.product_id != product_id);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Drop all local state in favor of the server's view.
    pub fn replace(&mut self, cart: RemoteCart) {
        self.lines = cart.items;
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CartMutation {
    product_id: Uuid,
    quantity: i64,
}

/// The mirror plus its replication half.
#[derive(Debug)]
pub struct CartClient {
    api: ApiClient,
    mirror: CartMirror,
}

impl CartClient {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            mirror: CartMirror::default(),
        }
    }

    pub fn items(&self) -> &[CartLine] {
        self.mirror.lines()
    }

    pub fn total(&self) -> f64 {
        self.mirror.total()
    }

    pub fn item_count(&self) -> i64 {
        self.mirror.item_count()
    }

    /// Replace the mirror with the server's cart, retrying transient
    /// failures so the mirror converges back to server truth.
    pub async fn refresh(&mut self) -> Result<(), ApiClientError> {
        let api = &self.api;
        let fetch = || async { api.get::<RemoteCart>("/api/cart").await };
        let cart = fetch
            .retry(
                &ExponentialBuilder::default()
                    .with_min_delay(Duration::from_millis(250))
                    .with_max_delay(Duration::from_secs(5))
                    .with_max_times(3)
                    .with_jitter(),
            )
            .when(|e: &ApiClientError| e.should_retry())
            .notify(|e, dur| {
                warn!(
                    "cart refresh failed, retrying after {:.2}s: {}",
                    dur.as_secs_f64(),
                    e
                )
            })
            .await?;
        self.mirror.replace(cart);
        Ok(())
    }

    /// Add one unit of `product`, optimistically.
    pub async fn add_item(&mut self, product: &Product) -> Result<(), ApiClientError> {
        self.mirror.apply_add(CartLine {
            product_id: product.id,
            title: product.title.clone(),
            price: product.price,
            image_url: product.image_url.clone(),
            quantity: 1,
        });
        let body = CartMutation {
            product_id: product.id,
            quantity: 1,
        };
        match self.api.post::<_, RemoteCart>("/api/cart/add", &body).await {
            Ok(cart) => {
                self.mirror.replace(cart);
                Ok(())
            }
            Err(err) => self.rollback_by_refetch(err).await,
        }
    }

    /// Set a line's quantity; below one delegates to [`Self::remove_item`].
    pub async fn set_quantity(
        &mut self,
        product_id: Uuid,
        quantity: i64,
    ) -> Result<(), ApiClientError> {
        if quantity < 1 {
            return self.remove_item(product_id).await;
        }
        self.mirror.apply_set_quantity(product_id, quantity);
        let body = CartMutation {
            product_id,
            quantity,
        };
        match self
            .api
            .post::<_, RemoteCart>("/api/cart/update", &body)
            .await
        {
            Ok(cart) => {
                self.mirror.replace(cart);
                Ok(())
            }
            Err(err) => self.rollback_by_refetch(err).await,
        }
    }

    pub async fn remove_item(&mut self, product_id: Uuid) -> Result<(), ApiClientError> {
        self.mirror.apply_remove(product_id);
        match self
            .api
            .delete::<RemoteCart>(&format!("/api/cart/{product_id}"))
            .await
        {
            Ok(cart) => {
                self.mirror.replace(cart);
                Ok(())
            }
            Err(err) => self.rollback_by_refetch(err).await,
        }
    }

    /// Empty local state only; used after checkout, once the server has
    /// already cleared its copy.
    pub fn clear(&mut self) {
        self.mirror.clear();
    }

    /// A replication request failed: restore the mirror to server truth,
    /// then surface the original error.
    async fn rollback_by_refetch(&mut self, err: ApiClientError) -> Result<(), ApiClientError> {
        warn!("cart mutation failed, re-syncing from server: {err}");
        self.refresh().await?;
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(product_id: Uuid, price: f64, quantity: i64) -> CartLine {
        CartLine {
            product_id,
            title: "item".to_string(),
            price,
            image_url: "https://example.com/p.jpg".to_string(),
            quantity,
        }
    }

    #[test]
    fn test_add_twice_merges() {
        let id = Uuid::new_v4();
        let mut mirror = CartMirror::default();
        mirror.apply_add(line(id, 299.0, 1));
        mirror.apply_add(line(id, 299.0, 1));

        assert_eq!(mirror.lines().len(), 1);
        assert_eq!(mirror.lines()[0].quantity, 2);
        assert_eq!(mirror.total(), 598.0);
    }

    #[test]
    fn test_total_recomputed_from_lines() {
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let mut mirror = CartMirror::default();
        mirror.apply_add(line(first, 100.0, 1));
        mirror.apply_set_quantity(first, 2);
        mirror.apply_add(line(second, 50.0, 1));
        assert_eq!(mirror.total(), 250.0);
        assert_eq!(mirror.item_count(), 3);

        mirror.apply_set_quantity(first, 0);
        assert_eq!(mirror.lines().len(), 1);
        assert_eq!(mirror.total(), 50.0);
    }

    #[test]
    fn test_set_quantity_on_absent_line_is_noop() {
        let mut mirror = CartMirror::default();
        mirror.apply_set_quantity(Uuid::new_v4(), 3);
        assert!(mirror.is_empty());
        assert_eq!(mirror.total(), 0.0);
    }

    #[test]
    fn test_replace_discards_local_divergence() {
        let local = Uuid::new_v4();
        let remote = Uuid::new_v4();
        let mut mirror = CartMirror::default();
        mirror.apply_add(line(local, 10.0, 1));

        mirror.replace(RemoteCart {
            items: vec![line(remote, 45.0, 2)],
            total: 90.0,
        });
        assert_eq!(mirror.lines().len(), 1);
        assert_eq!(mirror.lines()[0].product_id, remote);
        assert_eq!(mirror.total(), 90.0);
    }

    #[test]
    fn test_price_parses_from_string_or_number() {
        let id = Uuid::new_v4();
        let from_number: CartLine = serde_json::from_value(serde_json::json!({
            "productId": id,
            "title": "STRANDMON",
            "price": 299.0,
            "imageUrl": "https://example.com/p.jpg",
            "quantity": 1
        }))
        .unwrap();
        assert_eq!(from_number.price, 299.0);

        let from_string: CartLine = serde_json::from_value(serde_json::json!({
            "productId": id,
            "title": "STRANDMON",
            "price": "299",
            "imageUrl": "https://example.com/p.jpg",
            "quantity": 1
        }))
        .unwrap();
        assert_eq!(from_string.price, 299.0);
    }

    #[test]
    fn test_remote_cart_tolerates_missing_fields() {
        let cart: RemoteCart = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(cart.items.is_empty());
        assert_eq!(cart.total, 0.0);
    }
}
