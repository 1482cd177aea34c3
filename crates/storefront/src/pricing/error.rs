//! Error types for checkout pricing.

use crate::model::ProductId;
use crate::product_actor::ProductError;
use std::fmt::Display;
use thiserror::Error;

/// Which address a validation failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressKind {
    Shipping,
    Billing,
}

impl Display for AddressKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AddressKind::Shipping => f.write_str("shipping"),
            AddressKind::Billing => f.write_str("billing"),
        }
    }
}

/// The cart or address cannot be priced as given. Surfaced to the shopper.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Cart is empty")]
    EmptyCart,

    #[error("The {address} address is missing {field}")]
    MissingAddressField {
        address: AddressKind,
        field: &'static str,
    },

    #[error("Invalid {address} postal code '{value}': expected 6 digits")]
    InvalidPostalCode { address: AddressKind, value: String },

    #[error("Quantity for {0} must be at least 1")]
    NonPositiveQuantity(ProductId),

    #[error("Unknown product: {0}")]
    UnknownProduct(ProductId),

    #[error("{0} is out of stock")]
    OutOfStock(ProductId),

    #[error("{product_id} has no {size_ml}ml sample")]
    UnknownSampleSize { product_id: ProductId, size_ml: u32 },
}

/// Failure of [`PricingEngine::compute_summary`](super::PricingEngine::compute_summary).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PricingError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The catalog could not be reached; the cart itself may be fine.
    #[error("Catalog unavailable: {0}")]
    Catalog(#[from] ProductError),
}
