//! Orders, their priced lines and the status lifecycle.
//!
//! # Actor Framework
//! [`Order`] is managed by a [`ResourceActor`](resource_actor::ResourceActor); status changes
//! go through [`crate::order_actor::OrderAction`] so they are checked and applied in one step.

use crate::model::{Address, Money, ProductId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Type-safe identifier for Orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderId(pub u32);

impl From<u32> for OrderId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "order_{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Statuses reachable in one step.
    pub fn next(self) -> &'static [OrderStatus] {
        use OrderStatus::*;
        match self {
            Pending => &[Confirmed, Cancelled],
            Confirmed => &[Processing, Cancelled],
            Processing => &[Shipped, Cancelled],
            Shipped => &[Delivered],
            Delivered | Cancelled => &[],
        }
    }

    pub fn can_transition_to(self, to: OrderStatus) -> bool {
        self.next().contains(&to)
    }

    pub fn is_terminal(self) -> bool {
        self.next().is_empty()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
    Upi,
    NetBanking,
    CashOnDelivery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
}

/// A full-size product line. `unit_price` is the catalog price at checkout and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Money,
    pub line_total: Money,
}

/// A trial-size line. `unit_price` is the effective price: zero when the order qualified
/// for free samples, in which case `list_price` keeps what it would have cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleLine {
    pub product_id: ProductId,
    pub size_ml: u32,
    pub quantity: u32,
    pub list_price: Money,
    pub unit_price: Money,
    pub is_free: bool,
}

/// Pricing breakdown computed at checkout, before an order exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub lines: Vec<OrderLine>,
    pub samples: Vec<SampleLine>,
    pub regular_subtotal: Money,
    pub sample_subtotal: Money,
    pub subtotal: Money,
    pub shipping: Money,
    pub tax_rate: Money,
    pub tax: Money,
    pub total: Money,
    pub shipping_address: Address,
    pub billing_address: Option<Address>,
}

impl OrderSummary {
    /// `total == regular_subtotal + sample_subtotal + shipping + tax`.
    pub fn is_balanced(&self) -> bool {
        self.total == self.regular_subtotal + self.sample_subtotal + self.shipping + self.tax
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub lines: Vec<OrderLine>,
    pub samples: Vec<SampleLine>,
    pub regular_subtotal: Money,
    pub sample_subtotal: Money,
    pub subtotal: Money,
    pub shipping: Money,
    pub tax: Money,
    pub total: Money,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub payment_id: Option<String>,
    pub tracking_number: Option<String>,
    pub shipping_address: Address,
    pub billing_address: Option<Address>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// A new `pending` order carrying the summary's frozen prices.
    ///
    /// Payment is `paid` when the gateway handed over a payment id, `pending` otherwise
    /// (cash on delivery).
    pub fn from_summary(id: OrderId, params: OrderCreate) -> Self {
        let OrderCreate {
            user_id,
            summary,
            payment_method,
            payment_id,
        } = params;
        let now = Utc::now();
        let payment_status = if payment_id.is_some() {
            PaymentStatus::Paid
        } else {
            PaymentStatus::Pending
        };

        Self {
            id,
            user_id,
            lines: summary.lines,
            samples: summary.samples,
            regular_subtotal: summary.regular_subtotal,
            sample_subtotal: summary.sample_subtotal,
            subtotal: summary.subtotal,
            shipping: summary.shipping,
            tax: summary.tax,
            total: summary.total,
            status: OrderStatus::Pending,
            payment_method,
            payment_status,
            payment_id,
            tracking_number: None,
            shipping_address: summary.shipping_address,
            billing_address: summary.billing_address,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Payload for creating a new order.
#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub user_id: UserId,
    pub summary: OrderSummary,
    pub payment_method: PaymentMethod,
    pub payment_id: Option<String>,
}

/// Orders are never edited directly; every change is an [`OrderAction`](crate::order_actor::OrderAction).
#[derive(Debug, Clone)]
pub enum OrderUpdate {}

#[cfg(test)]
mod tests {
    use super::*;
    use OrderStatus::*;

    #[test]
    fn transition_table() {
        let allowed = [
            (Pending, Confirmed),
            (Pending, Cancelled),
            (Confirmed, Processing),
            (Confirmed, Cancelled),
            (Processing, Shipped),
            (Processing, Cancelled),
            (Shipped, Delivered),
        ];
        let all = [Pending, Confirmed, Processing, Shipped, Delivered, Cancelled];

        for from in all {
            for to in all {
                assert_eq!(
                    from.can_transition_to(to),
                    allowed.contains(&(from, to)),
                    "{from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn delivered_and_cancelled_are_terminal() {
        assert!(Delivered.is_terminal());
        assert!(Cancelled.is_terminal());
        assert!(!Shipped.is_terminal());
        assert!(!Delivered.can_transition_to(Processing));
    }
}
