//! Catalog products.
//!
//! # Actor Framework
//! [`Product`] is managed by a [`ResourceActor`](resource_actor::ResourceActor); see
//! [`crate::product_actor`] for the entity hooks and the availability action.

use crate::model::Money;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Type-safe identifier for Products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProductId(pub u32);

impl From<u32> for ProductId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "product_{}", self.0)
    }
}

/// A trial size offered for a product, with its own price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleOption {
    pub size_ml: u32,
    pub price: Money,
}

/// A fragrance in the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub brand: String,
    pub price: Money,
    pub stock: u32,
    pub samples: Vec<SampleOption>,
}

impl Product {
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }

    pub fn sample(&self, size_ml: u32) -> Option<&SampleOption> {
        self.samples.iter().find(|s| s.size_ml == size_ml)
    }

    /// Current price and availability, as the pricing engine sees them.
    pub fn quote(&self) -> ProductQuote {
        ProductQuote {
            product_id: self.id,
            name: self.name.clone(),
            price: self.price,
            in_stock: self.in_stock(),
            samples: self.samples.clone(),
        }
    }
}

/// Snapshot returned by a catalog lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductQuote {
    pub product_id: ProductId,
    pub name: String,
    pub price: Money,
    pub in_stock: bool,
    pub samples: Vec<SampleOption>,
}

impl ProductQuote {
    pub fn sample_price(&self, size_ml: u32) -> Option<Money> {
        self.samples
            .iter()
            .find(|s| s.size_ml == size_ml)
            .map(|s| s.price)
    }
}

#[derive(Debug, Clone)]
pub struct ProductCreate {
    pub name: String,
    pub brand: String,
    pub price: Money,
    pub stock: u32,
    pub samples: Vec<SampleOption>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub price: Option<Money>,
    pub stock: Option<u32>,
    pub samples: Option<Vec<SampleOption>>,
}
