//! Client-side mirror of the shop API, as used by the mobile app.
//!
//! Reads flow server → mirror; writes apply to the mirror first and are
//! replicated in the background. Any replication failure resynchronizes
//! the whole mirror from the server.

pub mod api;
pub mod auth;
pub mod cart;
pub mod orders;
pub mod products;

pub use api::{ApiClient, ApiClientError};
pub use cart::{CartClient, CartLine, CartMirror};
