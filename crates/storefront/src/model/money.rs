//! Currency arithmetic.
//!
//! Every amount is a [`Decimal`]; each computed component (subtotals, shipping, tax, total)
//! is rounded to two places, half away from zero, before it is stored or added to another.

use rust_decimal::{Decimal, RoundingStrategy};

pub type Money = Decimal;

const CURRENCY_PLACES: u32 = 2;

/// Round to currency precision.
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(CURRENCY_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// `unit_price × quantity`, rounded.
pub fn line_total(unit_price: Decimal, quantity: u32) -> Decimal {
    round_currency(unit_price * Decimal::from(quantity))
}
