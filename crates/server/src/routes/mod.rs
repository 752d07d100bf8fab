pub mod auth;
pub mod cart;
pub mod health;
pub mod orders;
pub mod products;

use axum::Router;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(products::router())
        .merge(cart::router())
        .merge(orders::router())
}
