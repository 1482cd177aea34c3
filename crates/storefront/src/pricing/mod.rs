//! # Checkout Pricing
//!
//! Turns cart lines and a shipping address into an [`OrderSummary`].
//!
//! Pricing runs in two steps:
//! 1. [`PricingEngine::compute_summary`] validates the addresses and resolves every line
//!    against the [`ProductCatalog`] (price, availability, sample sizes).
//! 2. [`price_lines`] does the arithmetic. It is a pure function of the resolved lines and
//!    the [`PricingConfig`], so identical inputs always give identical summaries.
//!
//! ## Rules
//!
//! | Component | Rule |
//! |-----------|------|
//! | regular subtotal | Σ unit price × quantity over full-size lines |
//! | samples | free when the regular subtotal reaches `free_sample_threshold` |
//! | shipping | free from `free_shipping_threshold`, flat fee otherwise, zero for an empty subtotal |
//! | tax | subtotal × rate for the shipping state |
//! | total | subtotal + shipping + tax |

pub mod error;
pub mod tax;

pub use error::*;
pub use tax::*;

use crate::model::{
    line_total, round_currency, Address, CartItem, LineKind, Money, OrderLine, OrderSummary,
    ProductId, ProductQuote, SampleLine,
};
use crate::product_actor::ProductError;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Price lookup consumed by the pricing engine.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// `None` when the product does not exist.
    async fn price_and_availability(
        &self,
        product_id: ProductId,
    ) -> Result<Option<ProductQuote>, ProductError>;
}

/// Thresholds, fees and tax rates. Read-only once the system is running.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingConfig {
    pub free_sample_threshold: Money,
    pub free_shipping_threshold: Money,
    pub flat_shipping_fee: Money,
    pub tax_rates: TaxRateTable,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            free_sample_threshold: Decimal::from(2000),
            free_shipping_threshold: Decimal::from(1000),
            flat_shipping_fee: Decimal::from(50),
            tax_rates: TaxRateTable::new(Decimal::new(12, 2))
                .with_rate("Delhi", Decimal::new(18, 2)),
        }
    }
}

/// A cart line after catalog resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedLine {
    Regular {
        product_id: ProductId,
        name: String,
        unit_price: Money,
        quantity: u32,
    },
    Sample {
        product_id: ProductId,
        size_ml: u32,
        price: Money,
        quantity: u32,
    },
}

#[derive(Clone)]
pub struct PricingEngine {
    catalog: Arc<dyn ProductCatalog>,
    config: PricingConfig,
}

impl PricingEngine {
    pub fn new(catalog: Arc<dyn ProductCatalog>, config: PricingConfig) -> Self {
        Self { catalog, config }
    }

    #[instrument(skip_all, fields(lines = items.len()))]
    pub async fn compute_summary(
        &self,
        items: &[CartItem],
        shipping_address: &Address,
        billing_address: Option<&Address>,
    ) -> Result<OrderSummary, PricingError> {
        validate_address(shipping_address, AddressKind::Shipping)?;
        if let Some(billing) = billing_address {
            validate_address(billing, AddressKind::Billing)?;
        }

        let resolved = self.resolve(items).await?;
        let summary = price_lines(
            &self.config,
            resolved,
            shipping_address.clone(),
            billing_address.cloned(),
        );
        debug!(subtotal = %summary.subtotal, total = %summary.total, "Priced checkout");
        Ok(summary)
    }

    async fn resolve(&self, items: &[CartItem]) -> Result<Vec<ResolvedLine>, PricingError> {
        if items.is_empty() {
            return Err(ValidationError::EmptyCart.into());
        }
        if let Some(item) = items.iter().find(|i| i.quantity == 0) {
            return Err(ValidationError::NonPositiveQuantity(item.product_id).into());
        }

        let mut resolved = Vec::with_capacity(items.len());
        for item in items {
            let quote = self
                .catalog
                .price_and_availability(item.product_id)
                .await?
                .ok_or(ValidationError::UnknownProduct(item.product_id))?;
            if !quote.in_stock {
                return Err(ValidationError::OutOfStock(item.product_id).into());
            }

            resolved.push(match item.kind {
                LineKind::Regular => ResolvedLine::Regular {
                    product_id: item.product_id,
                    name: quote.name.clone(),
                    unit_price: quote.price,
                    quantity: item.quantity,
                },
                LineKind::Sample { size_ml } => {
                    let price = quote.sample_price(size_ml).ok_or(
                        ValidationError::UnknownSampleSize {
                            product_id: item.product_id,
                            size_ml,
                        },
                    )?;
                    ResolvedLine::Sample {
                        product_id: item.product_id,
                        size_ml,
                        price,
                        quantity: item.quantity,
                    }
                }
            });
        }
        Ok(resolved)
    }
}

/// The pricing arithmetic. No I/O, no clock.
pub fn price_lines(
    config: &PricingConfig,
    resolved: Vec<ResolvedLine>,
    shipping_address: Address,
    billing_address: Option<Address>,
) -> OrderSummary {
    let mut lines = Vec::new();
    let mut sample_requests = Vec::new();

    for line in resolved {
        match line {
            ResolvedLine::Regular {
                product_id,
                name,
                unit_price,
                quantity,
            } => lines.push(OrderLine {
                product_id,
                name,
                quantity,
                unit_price,
                line_total: line_total(unit_price, quantity),
            }),
            ResolvedLine::Sample {
                product_id,
                size_ml,
                price,
                quantity,
            } => sample_requests.push((product_id, size_ml, price, quantity)),
        }
    }

    let regular_subtotal = round_currency(lines.iter().map(|l| l.line_total).sum());
    let samples_free = regular_subtotal >= config.free_sample_threshold;

    let samples: Vec<SampleLine> = sample_requests
        .into_iter()
        .map(|(product_id, size_ml, list_price, quantity)| SampleLine {
            product_id,
            size_ml,
            quantity,
            list_price,
            unit_price: if samples_free { Decimal::ZERO } else { list_price },
            is_free: samples_free,
        })
        .collect();
    let sample_subtotal = round_currency(
        samples
            .iter()
            .map(|s| line_total(s.unit_price, s.quantity))
            .sum(),
    );

    let subtotal = regular_subtotal + sample_subtotal;
    let shipping = if subtotal.is_zero() || subtotal >= config.free_shipping_threshold {
        Decimal::ZERO
    } else {
        round_currency(config.flat_shipping_fee)
    };
    let tax_rate = config.tax_rates.rate_for(&shipping_address.state);
    let tax = round_currency(subtotal * tax_rate);
    let total = subtotal + shipping + tax;

    OrderSummary {
        lines,
        samples,
        regular_subtotal,
        sample_subtotal,
        subtotal,
        shipping,
        tax_rate,
        tax,
        total,
        shipping_address,
        billing_address,
    }
}

/// Required fields present, state non-empty and a 6-digit postal code.
pub fn validate_address(address: &Address, kind: AddressKind) -> Result<(), ValidationError> {
    let required = [
        ("full name", &address.full_name),
        ("address line", &address.line1),
        ("city", &address.city),
        ("state", &address.state),
        ("postal code", &address.postal_code),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(ValidationError::MissingAddressField {
                address: kind,
                field,
            });
        }
    }

    let postal = address.postal_code.trim();
    if postal.len() != 6 || !postal.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidPostalCode {
            address: kind,
            value: address.postal_code.clone(),
        });
    }
    Ok(())
}
