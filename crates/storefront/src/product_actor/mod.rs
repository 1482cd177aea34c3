//! # Product Actor
//!
//! The catalog collaborator of the checkout pipeline. It owns products, their prices, stock
//! and sample sizes, and answers price lookups for the pricing engine.
//!
//! ## Structure
//!
//! - [`entity`] - [`ActorEntity`](resource_actor::ActorEntity) implementation for [`Product`]
//! - [`error`] - [`ProductError`]
//! - [`actions`] - [`ProductAction::Quote`], a consistent price/availability snapshot
//!
//! ## Usage
//!
//! ```rust
//! use storefront::clients::ProductClient;
//! use storefront::model::{ProductCreate, ProductId};
//! use storefront::pricing::ProductCatalog;
//! use storefront::product_actor;
//! use rust_decimal::Decimal;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (actor, generic_client) = product_actor::new();
//!     let client = ProductClient::new(generic_client);
//!     tokio::spawn(actor.run(()));
//!
//!     let id = client
//!         .create_product(ProductCreate {
//!             name: "Rose Oud".to_string(),
//!             brand: "Maison".to_string(),
//!             price: Decimal::from(2400),
//!             stock: 12,
//!             samples: vec![],
//!         })
//!         .await?;
//!
//!     let quote = client.price_and_availability(id).await?.unwrap();
//!     assert!(quote.in_stock);
//!     assert!(client.price_and_availability(ProductId(99)).await?.is_none());
//!     Ok(())
//! }
//! ```

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::model::Product;
use resource_actor::{ResourceActor, ResourceClient};

/// Creates a new Product actor and its client.
pub fn new() -> (ResourceActor<Product>, ResourceClient<Product>) {
    ResourceActor::new(32)
}
